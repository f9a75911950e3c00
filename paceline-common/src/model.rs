//! Canonical workout plan data model
//!
//! A `Plan` is constructed and validated exactly once by the ingestion
//! pipeline ([`crate::ingest`]); after that it is immutable. The clock
//! and scheduler only ever read it, so plans are safe to share between
//! any number of sessions behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversion factor from km/h to mph
pub const KMH_TO_MPH: f64 = 0.621371;

/// Conversion factor from mph to km/h
pub const MPH_TO_KMH: f64 = 1.60934;

/// A single training interval within a plan
///
/// The interval begins at `timestamp_secs` and implicitly runs until
/// the next interval's timestamp (or the end of the plan).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Start time within the plan (seconds from workout start)
    pub timestamp_secs: f64,

    /// Target speed in km/h (canonical unit regardless of input unit)
    pub speed_kmh: f64,

    /// Target incline in percent
    pub incline_percent: f64,
}

impl Interval {
    /// Target speed converted to mph for display
    pub fn speed_mph(&self) -> f64 {
        self.speed_kmh * KMH_TO_MPH
    }
}

/// A validated, immutable workout plan
///
/// Invariants (enforced once by [`crate::ingest::validate`], never
/// re-checked downstream):
/// - `name` is non-empty
/// - `intervals` is non-empty, sorted by timestamp non-decreasing,
///   and starts at timestamp 0
/// - every interval field is >= 0
/// - `total_duration_secs` > 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier
    pub id: Uuid,

    /// Plan display name (unique within a store)
    pub name: String,

    /// Total workout duration in seconds
    pub total_duration_secs: f64,

    /// Intervals sorted by `timestamp_secs` ascending
    pub intervals: Vec<Interval>,

    /// When the plan was imported
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Build a plan with a fresh id and creation timestamp
    pub fn new(name: String, total_duration_secs: f64, intervals: Vec<Interval>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            total_duration_secs,
            intervals,
            created_at: Utc::now(),
        }
    }
}

/// Coarse lifecycle state of a workout session
///
/// `Completed` and `Stopped` are terminal; starting another workout
/// requires a new session object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    NotStarted,
    Active,
    Paused,
    Completed,
    Stopped,
}

impl SessionPhase {
    /// Whether the session can never leave this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Stopped)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::NotStarted => write!(f, "notstarted"),
            SessionPhase::Active => write!(f, "active"),
            SessionPhase::Paused => write!(f, "paused"),
            SessionPhase::Completed => write!(f, "completed"),
            SessionPhase::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_mph_conversion() {
        let interval = Interval {
            timestamp_secs: 0.0,
            speed_kmh: 10.0,
            incline_percent: 1.5,
        };
        assert!((interval.speed_mph() - 6.21371).abs() < 1e-9);
    }

    #[test]
    fn test_plan_new_assigns_id_and_timestamp() {
        let plan = Plan::new(
            "Morning Walk".to_string(),
            600.0,
            vec![Interval {
                timestamp_secs: 0.0,
                speed_kmh: 5.0,
                incline_percent: 0.0,
            }],
        );
        assert!(!plan.id.is_nil());
        assert_eq!(plan.name, "Morning Walk");
        assert_eq!(plan.intervals.len(), 1);
    }

    #[test]
    fn test_plan_roundtrips_through_json() {
        let plan = Plan::new(
            "Roundtrip".to_string(),
            300.0,
            vec![
                Interval {
                    timestamp_secs: 0.0,
                    speed_kmh: 5.0,
                    incline_percent: 0.0,
                },
                Interval {
                    timestamp_secs: 120.0,
                    speed_kmh: 8.0,
                    incline_percent: 2.0,
                },
            ],
        );
        let json = serde_json::to_string(&plan).unwrap();
        let restored: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, plan);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(SessionPhase::Completed.is_terminal());
        assert!(SessionPhase::Stopped.is_terminal());
        assert!(!SessionPhase::NotStarted.is_terminal());
        assert!(!SessionPhase::Active.is_terminal());
        assert!(!SessionPhase::Paused.is_terminal());
    }
}
