//! Common error types for paceline
//!
//! One enum covers the four error families the engine surfaces:
//! format errors (unparseable input), validation errors (missing or
//! invalid plan data), session-state errors (operation invalid for the
//! current phase), and persistence errors (passed through from the
//! storage backend unchanged).

use thiserror::Error;

/// Common result type for paceline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across paceline crates
#[derive(Error, Debug)]
pub enum Error {
    /// Plan JSON is malformed or cannot be parsed
    #[error("Invalid plan JSON: {0}")]
    InvalidJson(String),

    /// Required plan fields absent or empty (name, intervals, steps)
    #[error("Missing required fields: {0}")]
    MissingRequiredFields(String),

    /// An interval field is missing, non-numeric, or negative
    #[error("Invalid interval data: {0}")]
    InvalidIntervalData(String),

    /// A normalized plan failed a structural invariant
    #[error("Invalid plan data: {0}")]
    InvalidPlanData(String),

    /// A plan with this name already exists in storage
    #[error("A plan named '{0}' already exists")]
    DuplicatePlanName(String),

    /// Session control called before start()
    #[error("No active workout session")]
    WorkoutNotStarted,

    /// start() called while a session is already Active or Paused
    #[error("A workout is already in progress")]
    WorkoutAlreadyActive,

    /// Opaque failure from the storage backend
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested plan not found
    #[error("Not found: {0}")]
    NotFound(String),
}
