//! Core contracts and helpers for dbreflect.
//!
//! This crate defines the reconstructed schema model, the shared error and
//! import report types, and helpers used by the engine and the CLI.

pub mod constraints;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod properties;
pub mod redaction;
pub mod report;
pub mod schema;
pub mod types;
pub mod validation;

pub use constraints::{
    CheckConstraint, DefaultConstraint, FkAction, ForeignKey, Index, PrimaryKey, UniqueConstraint,
};
pub use error::{Error, Result};
pub use graph::{FkGraphReport, FkGraphSummary, build_fk_graph_report, resolve_reference};
pub use metrics::{
    ConstraintCounts, CoverageMetrics, FkGraphMetrics, SchemaCounts, SchemaMetrics,
    collect_schema_metrics,
};
pub use properties::{
    AddressLevel, DESCRIPTION_PROPERTY, ExtendedProperty, PropertyAddress, PropertyValue,
};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use report::{ImportFailure, ImportReport, ImportStage};
pub use schema::{
    Column, Database, DbObject, NamingConvention, ObjectKind, Parameter, ScalarFunction,
    StoredProcedure, Table, TableFunction, TypeMapping, View, qualified,
};
pub use types::{Identity, RowGuidCol};
pub use validation::validate_database;

/// Current contract version for `schema.json` artifacts.
pub const SCHEMA_VERSION: &str = "0.1";
