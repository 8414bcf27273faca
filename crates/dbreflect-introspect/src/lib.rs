//! SQL Server schema reconstruction.
//!
//! Turns the loosely-typed, multi-result-set output of catalog procedures
//! into the typed [`Database`] model. The engine only sees the collaborator
//! traits in [`adapter`]; [`mssql`] binds them to a live server.

pub mod adapter;
pub mod assemble;
pub mod classify;
pub mod materialize;
pub mod mssql;
pub mod options;
pub mod overlay;
pub mod resolve;
pub mod row;
pub mod walker;

pub use adapter::{Adapter, Catalog, Collaborators, Introspector, PropertySource};
pub use assemble::{ImportPlan, SchemaAssembler, plan_objects};
pub use classify::{RowKind, RowSignatures, ShapeVersion};
pub use mssql::{MssqlAdapter, introspect_mssql, introspect_mssql_with_options};
pub use options::ImportOptions;
pub use overlay::{Documented, OverlayMerger};
pub use resolve::{ConstraintDetail, FragmentKind, ResolvedConstraints};
pub use row::{ResultSet, Row};
pub use walker::{ObjectFragments, StageError};

pub use dbreflect_core::{Database, ImportReport};

/// Engine identifier stamped on every imported [`Database`].
pub const ENGINE: &str = "mssql";
