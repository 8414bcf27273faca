use thiserror::Error;

use crate::report::ImportStage;

/// Core error type shared across dbreflect crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or collaborator transport failure.
    #[error("database error: {0}")]
    Db(String),
    /// A classified row is missing a field its materializer requires.
    #[error("row contract violation: {0}")]
    Contract(String),
    /// A REFERENCES continuation row arrived with no open foreign key.
    #[error("REFERENCES fragment `{keys}` has no preceding foreign key")]
    UnmatchedReference { keys: String },
    /// Import aborted on one catalog object.
    #[error("import of {object} failed during {stage}: {message}")]
    Import {
        object: String,
        stage: ImportStage,
        message: String,
    },
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by dbreflect crates.
pub type Result<T> = std::result::Result<T, Error>;
