//! # Paceline Session Engine
//!
//! Drives a live workout session against a validated plan:
//! - [`clock::SessionClock`] — elapsed-time state machine with
//!   suspension drift correction
//! - [`scheduler`] — maps elapsed time to active/upcoming intervals
//!   and produces at-most-once transition events
//! - [`session::WorkoutSession`] — phase machine and tick loop that
//!   ties clock, scheduler, and event bus together
//! - [`seed`] — first-run import of bundled plans

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod seed;
pub mod session;

pub use error::{Error, Result};
pub use session::WorkoutSession;
