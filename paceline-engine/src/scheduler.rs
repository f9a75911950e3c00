//! Interval scheduling: elapsed time -> active/upcoming intervals
//!
//! Pure lookup functions over an immutable [`Plan`] plus a small
//! per-session memory ([`SchedulerState`]) that guarantees each
//! transition, warning, and completion is signaled at most once even
//! though the tick loop samples many times per second.
//!
//! The scheduler never mutates the plan and owns no clock; the caller
//! feeds it elapsed seconds on every tick and receives back the
//! discrete list of events that tick produced.

use paceline_common::events::SessionEvent;
use paceline_common::model::{Interval, Plan};
use paceline_common::time;

/// Find the interval active at elapsed time `t`
///
/// Returns the last interval whose timestamp is <= `t`. Plans are
/// validated to start at timestamp 0, so every `t >= 0` lands in some
/// interval; if `t` somehow precedes the first interval the first is
/// returned defensively.
pub fn current_interval(plan: &Plan, t: f64) -> (usize, &Interval) {
    let mut current = (0, &plan.intervals[0]);
    for (i, interval) in plan.intervals.iter().enumerate() {
        if interval.timestamp_secs <= t {
            current = (i, interval);
        } else {
            break;
        }
    }
    current
}

/// Find the next interval beginning within the warning window
///
/// Returns the first interval with `t < timestamp <= t + window`, or
/// None when no change is that close. An interval whose timestamp has
/// already passed is never "upcoming", even within the window.
pub fn upcoming_interval(plan: &Plan, t: f64, window: f64) -> Option<(usize, &Interval)> {
    let horizon = t + window;
    plan.intervals
        .iter()
        .enumerate()
        .find(|(_, interval)| interval.timestamp_secs > t && interval.timestamp_secs <= horizon)
}

/// Per-session scheduler memory for at-most-once event emission
#[derive(Debug)]
pub struct SchedulerState {
    /// Index of the interval last announced via IntervalChanged
    last_signaled_index: Option<usize>,

    /// Index of the upcoming interval a warning has fired for
    warning_fired_for_index: Option<usize>,

    /// Whether WorkoutCompleted has been emitted
    completed: bool,

    /// Lookahead window for upcoming warnings (seconds)
    warning_window_secs: f64,
}

impl SchedulerState {
    pub fn new(warning_window_secs: f64) -> Self {
        Self {
            last_signaled_index: None,
            warning_fired_for_index: None,
            completed: false,
            warning_window_secs,
        }
    }

    /// Whether completion has already been signaled
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Process one clock sample, returning the events it produced
    ///
    /// Per tick:
    /// 1. Active interval differs from the last signaled one ->
    ///    `IntervalChanged` (and the warning memory resets, so the
    ///    next upcoming interval gets its own warning).
    /// 2. An interval begins within the warning window and has not
    ///    been warned about -> `UpcomingWarning`.
    /// 3. Elapsed time reached the plan's total duration ->
    ///    `WorkoutCompleted`, exactly once; later ticks produce
    ///    nothing.
    pub fn on_tick(&mut self, plan: &Plan, t: f64) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if self.completed {
            return events;
        }

        let (index, interval) = current_interval(plan, t);
        if self.last_signaled_index != Some(index) {
            self.last_signaled_index = Some(index);
            self.warning_fired_for_index = None;
            events.push(SessionEvent::IntervalChanged {
                plan_id: plan.id,
                index,
                interval: *interval,
                position_secs: t,
                timestamp: time::now(),
            });
        }

        if let Some((upcoming_index, upcoming)) =
            upcoming_interval(plan, t, self.warning_window_secs)
        {
            if self.warning_fired_for_index != Some(upcoming_index) {
                self.warning_fired_for_index = Some(upcoming_index);
                events.push(SessionEvent::UpcomingWarning {
                    plan_id: plan.id,
                    index: upcoming_index,
                    interval: *upcoming,
                    starts_in_secs: upcoming.timestamp_secs - t,
                    timestamp: time::now(),
                });
            }
        }

        if t >= plan.total_duration_secs {
            self.completed = true;
            events.push(SessionEvent::WorkoutCompleted {
                plan_id: plan.id,
                duration_secs: t,
                timestamp: time::now(),
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Intervals at 0, 300, 600 with a 900s total
    fn three_interval_plan() -> Plan {
        Plan::new(
            "Three Stages".to_string(),
            900.0,
            vec![
                Interval {
                    timestamp_secs: 0.0,
                    speed_kmh: 5.0,
                    incline_percent: 0.0,
                },
                Interval {
                    timestamp_secs: 300.0,
                    speed_kmh: 8.0,
                    incline_percent: 2.0,
                },
                Interval {
                    timestamp_secs: 600.0,
                    speed_kmh: 6.0,
                    incline_percent: 1.0,
                },
            ],
        )
    }

    #[test]
    fn test_current_interval_lookup() {
        let plan = three_interval_plan();

        let (index, interval) = current_interval(&plan, 0.0);
        assert_eq!(index, 0);
        assert_eq!(interval.timestamp_secs, 0.0);

        let (index, interval) = current_interval(&plan, 350.0);
        assert_eq!(index, 1);
        assert_eq!(interval.timestamp_secs, 300.0);

        // Exactly on a boundary the new interval is active
        let (index, _) = current_interval(&plan, 600.0);
        assert_eq!(index, 2);

        // Past the last interval the last stays active
        let (index, _) = current_interval(&plan, 10_000.0);
        assert_eq!(index, 2);
    }

    #[test]
    fn test_upcoming_interval_window_bounds() {
        let plan = three_interval_plan();

        let (index, interval) = upcoming_interval(&plan, 296.0, 5.0).unwrap();
        assert_eq!(index, 1);
        assert_eq!(interval.timestamp_secs, 300.0);

        // Window boundary is inclusive
        assert!(upcoming_interval(&plan, 295.0, 5.0).is_some());

        // Already passed, even though still within 5s after
        assert!(upcoming_interval(&plan, 301.0, 5.0).is_none());

        // Too far out
        assert!(upcoming_interval(&plan, 100.0, 5.0).is_none());

        // Exactly at the boundary the interval is current, not upcoming
        assert!(upcoming_interval(&plan, 300.0, 5.0).is_none());
    }

    #[test]
    fn test_first_tick_signals_first_interval() {
        let plan = three_interval_plan();
        let mut state = SchedulerState::new(5.0);

        let events = state.on_tick(&plan, 0.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SessionEvent::IntervalChanged { index: 0, .. }
        ));
    }

    #[test]
    fn test_warning_fires_exactly_once_across_repeated_ticks() {
        let plan = three_interval_plan();
        let mut state = SchedulerState::new(5.0);
        state.on_tick(&plan, 0.0);

        let mut warnings = 0;
        for tenths in 2960..3000 {
            let t = tenths as f64 / 10.0;
            for event in state.on_tick(&plan, t) {
                if matches!(event, SessionEvent::UpcomingWarning { .. }) {
                    warnings += 1;
                }
            }
        }
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_interval_change_fires_exactly_once_at_boundary() {
        let plan = three_interval_plan();
        let mut state = SchedulerState::new(5.0);
        state.on_tick(&plan, 0.0);

        let mut changes = Vec::new();
        for tenths in 2990..3020 {
            let t = tenths as f64 / 10.0;
            for event in state.on_tick(&plan, t) {
                if let SessionEvent::IntervalChanged { index, .. } = event {
                    changes.push((t, index));
                }
            }
        }
        assert_eq!(changes.len(), 1);
        // Fired at the first tick where t reached 300
        assert_eq!(changes[0], (300.0, 1));
    }

    #[test]
    fn test_warning_memory_resets_after_interval_change() {
        let plan = three_interval_plan();
        let mut state = SchedulerState::new(5.0);

        state.on_tick(&plan, 0.0);
        // Warning for interval 1, then cross into it
        assert!(state
            .on_tick(&plan, 296.0)
            .iter()
            .any(|e| matches!(e, SessionEvent::UpcomingWarning { index: 1, .. })));
        state.on_tick(&plan, 300.0);

        // The next interval still gets its own warning
        assert!(state
            .on_tick(&plan, 596.0)
            .iter()
            .any(|e| matches!(e, SessionEvent::UpcomingWarning { index: 2, .. })));
    }

    #[test]
    fn test_completion_fires_once_and_silences_later_ticks() {
        let plan = three_interval_plan();
        let mut state = SchedulerState::new(5.0);
        state.on_tick(&plan, 0.0);
        state.on_tick(&plan, 650.0);

        let events = state.on_tick(&plan, 900.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::WorkoutCompleted { .. })));
        assert!(state.is_completed());

        assert!(state.on_tick(&plan, 900.1).is_empty());
        assert!(state.on_tick(&plan, 950.0).is_empty());
    }

    #[test]
    fn test_single_interval_plan_only_completes() {
        let plan = Plan::new(
            "Steady".to_string(),
            120.0,
            vec![Interval {
                timestamp_secs: 0.0,
                speed_kmh: 5.0,
                incline_percent: 0.0,
            }],
        );
        let mut state = SchedulerState::new(5.0);

        let events = state.on_tick(&plan, 0.0);
        assert_eq!(events.len(), 1); // IntervalChanged only, nothing upcoming

        assert!(state.on_tick(&plan, 60.0).is_empty());

        let events = state.on_tick(&plan, 120.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SessionEvent::WorkoutCompleted { .. }));
    }
}
