//! # Paceline Common Library
//!
//! Shared code for the paceline workout engine including:
//! - Canonical plan/interval data model
//! - Plan ingestion (format detection, normalization, validation)
//! - Event types (SessionEvent enum) and EventBus
//! - Plan storage trait and backends
//! - Configuration loading
//! - Time formatting utilities

pub mod config;
pub mod error;
pub mod events;
pub mod ingest;
pub mod model;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use model::{Interval, Plan, SessionPhase};
