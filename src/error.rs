//! Unified error type for the clipsync server.
//!
//! Replaces scattered String-based error returns with a typed `AppError`
//! enum that maps cleanly onto the HTTP and WebSocket surfaces.

use std::fmt;

/// Unified application error type.
///
/// Variants are organized by failure domain. The web layer maps them onto
/// status codes in `infrastructure::web::response`; everything below the
/// web layer just propagates them with `?`.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Bad, expired or malformed credential; missing device association
    Auth(String),

    /// Malformed request fields, rejected before any persistence
    Validation(String),

    /// Declared content size exceeds the configured maximum
    SizeLimit(String),

    /// Requested row does not exist (or is not owned by the caller)
    NotFound(String),

    /// Database errors (SQLite, Diesel, connection pool)
    Storage(String),

    /// Live-connection errors (registration, delivery)
    Connection(String),

    /// Configuration errors (loading, parsing, validation)
    Config(String),

    /// Generic/internal errors that don't fit other categories
    Internal(String),
}

impl AppError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn size_limit(msg: impl Into<String>) -> Self {
        Self::SizeLimit(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error message as a string slice.
    pub fn message(&self) -> &str {
        match self {
            AppError::Auth(msg) => msg,
            AppError::Validation(msg) => msg,
            AppError::SizeLimit(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Storage(msg) => msg,
            AppError::Connection(msg) => msg,
            AppError::Config(msg) => msg,
            AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::SizeLimit(msg) => write!(f, "Size limit exceeded: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Connection(msg) => write!(f, "Connection error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Lets route handlers bubble an `AppError` through warp's rejection
/// machinery; `response::handle_rejection` turns it back into JSON.
impl warp::reject::Reject for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::storage("Record not found in database"),
            diesel::result::Error::DatabaseError(kind, info) => {
                AppError::storage(format!("Database error: {:?}: {}", kind, info.message()))
            }
            _ => AppError::storage(format!("Database error: {}", err)),
        }
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        AppError::storage(format!("Connection pool error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(format!("I/O error: {}", err))
    }
}

/// Type alias for Result with AppError.
pub type Result<T> = std::result::Result<T, AppError>;
