//! Error types for the ORM system
//!
//! Every failure raised by the core is a [`ModelError`]. Errors are never
//! retried or swallowed inside the crate; callers decide how to map them
//! (for example onto HTTP status codes).

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for ORM operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Write to a guarded or non-fillable attribute
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Unknown connection, soft deletes on a model without them, bad config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No row matched a `*_or_fail` lookup
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Statement execution failed inside a driver adapter
    #[error("Database error: {message} (statement: {statement}, params: [{}])", .params.join(", "))]
    Backend {
        message: String,
        statement: String,
        params: Vec<String>,
    },

    /// Resource accessed before its initialization step ran
    #[error("Uninitialized resource: {0}")]
    Uninitialized(String),

    /// Operation requires a persisted model
    #[error("Primary key is missing on model '{0}'")]
    MissingPrimaryKey(String),

    /// Query could not be compiled
    #[error("Query error: {0}")]
    Query(String),

    /// Identifier or payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Pool creation or connection acquisition error
    #[error("Connection error: {0}")]
    Connection(String),
}

impl ModelError {
    /// Build a backend error carrying the offending statement and parameters
    pub fn backend<P: std::fmt::Debug>(message: impl Into<String>, statement: &str, params: &[P]) -> Self {
        ModelError::Backend {
            message: message.into(),
            statement: statement.to_string(),
            params: params.iter().map(|p| format!("{:?}", p)).collect(),
        }
    }

    /// Whether this error is a not-found signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound(_))
    }
}

// Convert from sqlx errors raised outside statement execution (pool setup)
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Connection(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for ModelError {
    fn from(err: mongodb::error::Error) -> Self {
        ModelError::Connection(err.to_string())
    }
}
