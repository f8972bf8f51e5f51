//! Error types for tagorm

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type alias for tagorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// A record definition is invalid (unknown table, duplicate column, missing tag, ...).
    ///
    /// These indicate a programming mistake in the record definition and are never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Row not found, or an update touched no rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// An operation was called with the wrong kind of target (e.g. a single record
    /// passed to a bulk operation). Detected before any statement is issued.
    #[error("Misuse: {0}")]
    Misuse(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("{context}: {source}")]
    Query {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// SQL template interpolation error
    #[error("Format error: {0}")]
    Format(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a misuse error
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a misuse error
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Prefix the error with the name of the operation that produced it.
    ///
    /// The error category is preserved, so `is_not_found()` and friends keep working
    /// on wrapped errors.
    pub fn context(self, op: &str) -> Self {
        match self {
            Self::Config(m) => Self::Config(format!("{op}: {m}")),
            Self::NotFound(m) => Self::NotFound(format!("{op}: {m}")),
            Self::Misuse(m) => Self::Misuse(format!("{op}: {m}")),
            Self::Connection(m) => Self::Connection(format!("{op}: {m}")),
            Self::Query { context, source } => Self::Query {
                context: format!("{op}: {context}"),
                source,
            },
            Self::UniqueViolation(m) => Self::UniqueViolation(format!("{op}: {m}")),
            Self::ForeignKeyViolation(m) => Self::ForeignKeyViolation(format!("{op}: {m}")),
            Self::CheckViolation(m) => Self::CheckViolation(format!("{op}: {m}")),
            Self::Decode { column, message } => Self::Decode {
                column,
                message: format!("{op}: {message}"),
            },
            Self::Format(m) => Self::Format(format!("{op}: {m}")),
            Self::Validation(m) => Self::Validation(format!("{op}: {m}")),
            Self::Other(m) => Self::Other(format!("{op}: {m}")),
        }
    }

    /// Parse a rusqlite error into a more specific OrmError
    pub fn from_db_error(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::QueryReturnedNoRows = err {
            return Self::NotFound("no rows in result set".to_string());
        }
        if let rusqlite::Error::SqliteFailure(ffi_err, message) = &err {
            if ffi_err.code == ErrorCode::ConstraintViolation {
                let message = message.clone().unwrap_or_else(|| ffi_err.to_string());
                match ffi_err.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::UniqueViolation(message);
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        return Self::ForeignKeyViolation(message);
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => {
                        return Self::CheckViolation(message);
                    }
                    _ => {}
                }
            }
        }
        Self::Query {
            context: "query failed".to_string(),
            source: err,
        }
    }
}

impl From<rusqlite::Error> for OrmError {
    fn from(err: rusqlite::Error) -> Self {
        Self::from_db_error(err)
    }
}

/// Emit a tolerated-misuse warning on the `tagorm` target.
pub(crate) fn orm_warn(message: &str) {
    tracing::warn!(target: "tagorm", "{message}");
}
