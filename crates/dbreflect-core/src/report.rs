use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::Database;

/// Pipeline stage in which an object import failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Catalog,
    Describe,
    Materialize,
    Resolve,
    Overlay,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImportStage::Catalog => "catalog",
            ImportStage::Describe => "describe",
            ImportStage::Materialize => "materialize",
            ImportStage::Resolve => "resolve",
            ImportStage::Overlay => "overlay",
        };
        f.write_str(label)
    }
}

/// One catalog object that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportFailure {
    /// Schema-qualified object name (`dbo.Orders`), or the database name for
    /// database-level failures.
    pub object: String,
    pub stage: ImportStage,
    pub message: String,
}

/// Outcome of one import pass.
///
/// `database` always holds every entity that was fully resolved, even when
/// some objects failed or the import was cancelled part way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImportReport {
    pub database: Database,
    pub failures: Vec<ImportFailure>,
    pub cancelled: bool,
}

impl ImportReport {
    /// Returns true when every requested object was imported.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}
