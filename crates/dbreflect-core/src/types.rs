use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity column definition (`IDENTITY(seed, increment)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Identity {
    pub column: String,
    pub seed: i64,
    pub increment: i64,
}

/// Column flagged as `ROWGUIDCOL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RowGuidCol {
    pub column: String,
}
