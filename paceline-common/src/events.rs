//! Event types for the paceline session engine
//!
//! The scheduler produces a discrete list of [`SessionEvent`]s per
//! tick; the owning session publishes them on an [`EventBus`] for
//! consumers (notifier, UI, logging) to subscribe to. There is no
//! implicit change observation — every externally visible transition
//! is an explicit event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::{Interval, SessionPhase};

/// Paceline session event types
///
/// Events are broadcast via [`EventBus`] and can be serialized for
/// external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Elapsed time crossed into a new interval
    ///
    /// Emitted exactly once per interval entry, including the first
    /// interval at workout start.
    IntervalChanged {
        /// Plan being executed
        plan_id: Uuid,
        /// Index of the interval now active
        index: usize,
        /// The interval now active
        interval: Interval,
        /// Elapsed session time when the change was detected (seconds)
        position_secs: f64,
        /// When the change was detected
        timestamp: DateTime<Utc>,
    },

    /// An interval change is coming up within the warning window
    ///
    /// Emitted exactly once per upcoming interval, even though the
    /// interval remains "upcoming" across many ticks.
    UpcomingWarning {
        /// Plan being executed
        plan_id: Uuid,
        /// Index of the approaching interval
        index: usize,
        /// The approaching interval
        interval: Interval,
        /// Seconds until the interval begins
        starts_in_secs: f64,
        /// When the warning was raised
        timestamp: DateTime<Utc>,
    },

    /// Elapsed time reached the plan's total duration
    ///
    /// Terminal: the session phase is Completed when subscribers
    /// observe this event and no further ticks are processed.
    WorkoutCompleted {
        /// Plan that completed
        plan_id: Uuid,
        /// Total elapsed time at completion (seconds)
        duration_secs: f64,
        /// When the workout completed
        timestamp: DateTime<Utc>,
    },

    /// Session lifecycle phase changed (start/pause/resume/stop)
    PhaseChanged {
        /// Phase before the transition
        old_phase: SessionPhase,
        /// Phase after the transition
        new_phase: SessionPhase,
        /// When the phase changed
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Event type name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::IntervalChanged { .. } => "IntervalChanged",
            SessionEvent::UpcomingWarning { .. } => "UpcomingWarning",
            SessionEvent::WorkoutCompleted { .. } => "WorkoutCompleted",
            SessionEvent::PhaseChanged { .. } => "PhaseChanged",
        }
    }
}

/// Central event distribution bus for session events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the tick loop)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// A send error means no subscribers are currently listening,
    /// which is not a failure for the session engine.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
