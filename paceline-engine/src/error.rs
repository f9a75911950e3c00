//! Error types for the session engine

use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum Error {
    /// Session control called before start()
    #[error("No active workout session")]
    WorkoutNotStarted,

    /// start() called while a session is already Active or Paused
    #[error("A workout is already in progress")]
    WorkoutAlreadyActive,

    /// Session is Completed or Stopped; a new session object is required
    #[error("Workout session has finished")]
    SessionFinished,

    /// Error from the common layer (ingestion, validation, storage)
    #[error(transparent)]
    Common(#[from] paceline_common::Error),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;
