//! Session elapsed-time clock
//!
//! A finite-state timer abstracting "how much session time has
//! elapsed", decoupled from the tick mechanism that samples it. The
//! owning session reads [`SessionClock::elapsed`] on every tick; the
//! clock itself never fires anything.
//!
//! Host suspension (the process stops receiving ticks for a while) is
//! reported explicitly via [`SessionClock::report_suspension_gap`]
//! rather than observed through platform lifecycle hooks, so the clock
//! is fully testable without a host runtime.

use std::time::{Duration, Instant};

use tracing::debug;

/// Internal clock state
///
/// `Running` keeps an origin instant plus a base offset; elapsed time
/// is `base + (now - origin)`. Resume and gap correction only ever
/// adjust `base`, which avoids arithmetic that would move an `Instant`
/// before process start.
#[derive(Debug, Clone, Copy)]
enum ClockState {
    Idle,
    Running { origin: Instant, base: Duration },
    Paused { frozen: Duration },
}

/// Elapsed-time clock for one workout session
///
/// States: `Idle -> Running <-> Paused`, any state -> `Idle` on stop.
#[derive(Debug)]
pub struct SessionClock {
    state: ClockState,
}

impl SessionClock {
    /// Create a clock in the Idle state
    pub fn new() -> Self {
        Self {
            state: ClockState::Idle,
        }
    }

    /// Start measuring from zero
    ///
    /// Resets any previous elapsed value; the origin instant is now.
    pub fn start(&mut self) {
        self.state = ClockState::Running {
            origin: Instant::now(),
            base: Duration::ZERO,
        };
    }

    /// Freeze the current elapsed value
    ///
    /// No-op unless Running.
    pub fn pause(&mut self) {
        if let ClockState::Running { .. } = self.state {
            self.state = ClockState::Paused {
                frozen: self.elapsed(),
            };
        }
    }

    /// Continue seamlessly from the frozen value
    ///
    /// No-op unless Paused.
    pub fn resume(&mut self) {
        if let ClockState::Paused { frozen } = self.state {
            self.state = ClockState::Running {
                origin: Instant::now(),
                base: frozen,
            };
        }
    }

    /// Return to Idle, clearing elapsed time and origin
    pub fn stop(&mut self) {
        self.state = ClockState::Idle;
    }

    /// Elapsed session time
    ///
    /// Running: wall-clock time since start, continuous across
    /// pause/resume and reported gaps. Paused: the frozen value.
    /// Idle: zero.
    pub fn elapsed(&self) -> Duration {
        match self.state {
            ClockState::Idle => Duration::ZERO,
            ClockState::Running { origin, base } => base + origin.elapsed(),
            ClockState::Paused { frozen } => frozen,
        }
    }

    /// Account for a host suspension of duration `gap`
    ///
    /// While Running, shifts the effective origin earlier by `gap` so
    /// the next `elapsed()` matches what true wall-clock time would
    /// have produced had ticking never stopped. This is drift
    /// correction, not a pause: progress during the gap is kept, not
    /// discarded. Ignored in other states — Paused already holds a
    /// frozen value and Idle has nothing to correct.
    pub fn report_suspension_gap(&mut self, gap: Duration) {
        match &mut self.state {
            ClockState::Running { base, .. } => {
                *base += gap;
            }
            _ => debug!(gap_ms = gap.as_millis() as u64, "suspension gap ignored, clock not running"),
        }
    }

    /// Whether the clock is currently advancing
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
