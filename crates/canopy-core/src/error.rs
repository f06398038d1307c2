//! Crate-wide error kinds (spec §7). Callers match on variants, never strings.

/// Errors surfaced across the extraction/resolution/query pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CanopyError {
    #[error("io error: {0}")]
    Io(String),

    #[error("unsupported language for extension: {0}")]
    UnsupportedLanguage(String),

    #[error("query compile error: {0}")]
    QueryCompileError(String),

    #[error("parse warning in {file}: source contained error nodes")]
    ParseWarning { file: String },

    #[error("extraction failed for {file}: {message}")]
    ExtractionFailure { file: String, message: String },

    #[error("resolution failed for language {language}: {message}")]
    ResolutionFailure { language: String, message: String },

    #[error("invalid query argument: {0}")]
    QueryInvalidArgument(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<std::io::Error> for CanopyError {
    fn from(e: std::io::Error) -> Self {
        CanopyError::Io(e.to_string())
    }
}

/// Store-layer errors (spec §4.2).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("schema migration required: v{from} -> v{to}")]
    SchemaMigration { from: u32, to: u32 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type CanopyResult<T> = Result<T, CanopyError>;
pub type StoreResult<T> = Result<T, StoreError>;
