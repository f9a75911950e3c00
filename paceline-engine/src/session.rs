//! Workout session: phase machine + tick loop
//!
//! One `WorkoutSession` drives one workout against one immutable plan.
//! `start()` spawns a periodic tick task — the only source of re-entry
//! into the scheduler. Every tick locks the session state, samples the
//! clock, runs the scheduler, and publishes the resulting events on
//! the bus. Control methods (`pause`, `resume`, `stop`) take the same
//! lock, so no tick ever overlaps a control transition.
//!
//! `Completed` and `Stopped` are terminal: the tick task exits and a
//! new workout requires a new session object.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, info};

use paceline_common::config::SessionConfig;
use paceline_common::events::{EventBus, SessionEvent};
use paceline_common::model::{Plan, SessionPhase};
use paceline_common::time;

use crate::clock::SessionClock;
use crate::error::{Error, Result};
use crate::scheduler::SchedulerState;

struct SessionInner {
    phase: SessionPhase,
    clock: SessionClock,
    scheduler: SchedulerState,
}

/// A live workout session over a validated plan
pub struct WorkoutSession {
    plan: Arc<Plan>,
    bus: EventBus,
    inner: Arc<Mutex<SessionInner>>,
    tick_interval: Duration,
}

impl WorkoutSession {
    /// Create a session in the NotStarted phase
    pub fn new(plan: Arc<Plan>, bus: EventBus, config: &SessionConfig) -> Self {
        Self {
            plan,
            bus,
            inner: Arc::new(Mutex::new(SessionInner {
                phase: SessionPhase::NotStarted,
                clock: SessionClock::new(),
                scheduler: SchedulerState::new(config.warning_window_secs),
            })),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }

    /// The plan this session executes
    pub fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }

    /// Subscribe to this session's event stream
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase
    }

    /// Elapsed session time in seconds
    pub async fn elapsed_secs(&self) -> f64 {
        self.inner.lock().await.clock.elapsed().as_secs_f64()
    }

    /// Start the workout and spawn the tick loop
    ///
    /// Fails with [`Error::WorkoutAlreadyActive`] if already started,
    /// or [`Error::SessionFinished`] on a terminal session.
    pub async fn start(&self) -> Result<()> {
        {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                SessionPhase::NotStarted => {}
                SessionPhase::Active | SessionPhase::Paused => {
                    return Err(Error::WorkoutAlreadyActive)
                }
                SessionPhase::Completed | SessionPhase::Stopped => {
                    return Err(Error::SessionFinished)
                }
            }
            inner.clock.start();
            inner.phase = SessionPhase::Active;
        }
        self.emit_phase_change(SessionPhase::NotStarted, SessionPhase::Active);
        info!(plan = %self.plan.name, "workout started");

        self.spawn_tick_loop();
        Ok(())
    }

    /// Pause the workout, freezing elapsed time
    ///
    /// No-op if already Paused.
    pub async fn pause(&self) -> Result<()> {
        let changed = {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                SessionPhase::NotStarted => return Err(Error::WorkoutNotStarted),
                SessionPhase::Completed | SessionPhase::Stopped => {
                    return Err(Error::SessionFinished)
                }
                SessionPhase::Paused => false,
                SessionPhase::Active => {
                    inner.clock.pause();
                    inner.phase = SessionPhase::Paused;
                    true
                }
            }
        };
        if changed {
            self.emit_phase_change(SessionPhase::Active, SessionPhase::Paused);
            info!(plan = %self.plan.name, "workout paused");
        }
        Ok(())
    }

    /// Resume a paused workout from its frozen elapsed time
    ///
    /// No-op if already Active.
    pub async fn resume(&self) -> Result<()> {
        let changed = {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                SessionPhase::NotStarted => return Err(Error::WorkoutNotStarted),
                SessionPhase::Completed | SessionPhase::Stopped => {
                    return Err(Error::SessionFinished)
                }
                SessionPhase::Active => false,
                SessionPhase::Paused => {
                    inner.clock.resume();
                    inner.phase = SessionPhase::Active;
                    true
                }
            }
        };
        if changed {
            self.emit_phase_change(SessionPhase::Paused, SessionPhase::Active);
            info!(plan = %self.plan.name, "workout resumed");
        }
        Ok(())
    }

    /// Stop the workout; idempotent, halts further tick processing
    pub async fn stop(&self) -> Result<()> {
        let old_phase = {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                SessionPhase::NotStarted => return Err(Error::WorkoutNotStarted),
                // Already terminal: nothing left to do
                SessionPhase::Completed | SessionPhase::Stopped => return Ok(()),
                phase => {
                    inner.clock.stop();
                    inner.phase = SessionPhase::Stopped;
                    phase
                }
            }
        };
        self.emit_phase_change(old_phase, SessionPhase::Stopped);
        info!(plan = %self.plan.name, "workout stopped");
        Ok(())
    }

    /// Report a host suspension gap to the session clock
    ///
    /// Called by the embedding host when it detects the tick source
    /// was suspended for `gap` of wall-clock time.
    pub async fn report_suspension_gap(&self, gap: Duration) {
        let mut inner = self.inner.lock().await;
        inner.clock.report_suspension_gap(gap);
    }

    fn emit_phase_change(&self, old_phase: SessionPhase, new_phase: SessionPhase) {
        self.bus.emit(SessionEvent::PhaseChanged {
            old_phase,
            new_phase,
            timestamp: time::now(),
        });
    }

    /// Spawn the periodic tick task
    ///
    /// The task is the single consumer of clock samples; it exits when
    /// the session reaches a terminal phase. Ticks while Paused are
    /// skipped without touching the scheduler.
    fn spawn_tick_loop(&self) {
        let plan = Arc::clone(&self.plan);
        let inner = Arc::clone(&self.inner);
        let bus = self.bus.clone();
        let tick_interval = self.tick_interval;

        tokio::spawn(async move {
            let mut ticker = interval(tick_interval);
            loop {
                ticker.tick().await;

                let mut events = Vec::new();
                let mut completed_at = None;
                {
                    let mut guard = inner.lock().await;
                    match guard.phase {
                        SessionPhase::Active => {
                            let t = guard.clock.elapsed().as_secs_f64();
                            events = guard.scheduler.on_tick(&plan, t);
                            if guard.scheduler.is_completed() {
                                guard.clock.stop();
                                guard.phase = SessionPhase::Completed;
                                completed_at = Some(t);
                            }
                        }
                        SessionPhase::Paused => continue,
                        SessionPhase::NotStarted
                        | SessionPhase::Completed
                        | SessionPhase::Stopped => break,
                    }
                }

                for event in events {
                    debug!(event = event.event_type(), "session event");
                    bus.emit(event);
                }

                if let Some(t) = completed_at {
                    bus.emit(SessionEvent::PhaseChanged {
                        old_phase: SessionPhase::Active,
                        new_phase: SessionPhase::Completed,
                        timestamp: time::now(),
                    });
                    info!(plan = %plan.name, elapsed_secs = t, "workout completed");
                    break;
                }
            }
        });
    }
}
