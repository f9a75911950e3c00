//! End-to-end session tests: tick loop, event stream, drift correction
//!
//! Uses sub-second plans against the real clock so each test finishes
//! quickly without faking time.

use std::sync::Arc;
use std::time::Duration;

use paceline_common::config::SessionConfig;
use paceline_common::events::{EventBus, SessionEvent};
use paceline_common::model::{Interval, Plan, SessionPhase};
use paceline_engine::WorkoutSession;

fn fast_config() -> SessionConfig {
    SessionConfig {
        tick_interval_ms: 20,
        warning_window_secs: 5.0,
    }
}

fn two_interval_plan(total_secs: f64, second_at: f64) -> Arc<Plan> {
    Arc::new(Plan::new(
        "Sprint".to_string(),
        total_secs,
        vec![
            Interval {
                timestamp_secs: 0.0,
                speed_kmh: 5.0,
                incline_percent: 0.0,
            },
            Interval {
                timestamp_secs: second_at,
                speed_kmh: 9.0,
                incline_percent: 3.0,
            },
        ],
    ))
}

/// Collect events until WorkoutCompleted arrives (with a safety timeout)
async fn collect_until_completed(
    rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event stream closed");
            let done = matches!(event, SessionEvent::WorkoutCompleted { .. });
            events.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("session did not complete in time");
    events
}

#[tokio::test]
async fn test_full_session_emits_each_event_once() {
    let plan = two_interval_plan(0.6, 0.3);
    let session = WorkoutSession::new(Arc::clone(&plan), EventBus::new(256), &fast_config());
    let mut rx = session.subscribe();

    session.start().await.unwrap();
    let events = collect_until_completed(&mut rx).await;

    let changed_indices: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::IntervalChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(changed_indices, vec![0, 1]);

    let warnings: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::UpcomingWarning { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(warnings, vec![1]);

    let completions = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::WorkoutCompleted { .. }))
        .count();
    assert_eq!(completions, 1);

    assert_eq!(session.phase().await, SessionPhase::Completed);
}

#[tokio::test]
async fn test_completion_transitions_phase_and_stops_ticking() {
    let plan = two_interval_plan(0.3, 0.1);
    let session = WorkoutSession::new(plan, EventBus::new(256), &fast_config());
    let mut rx = session.subscribe();

    session.start().await.unwrap();
    collect_until_completed(&mut rx).await;

    assert_eq!(session.phase().await, SessionPhase::Completed);
    // Clock stopped as a side effect of completion
    assert_eq!(session.elapsed_secs().await, 0.0);

    // No further events after completion besides the final PhaseChanged
    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut extra = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::PhaseChanged {
                new_phase: SessionPhase::Completed,
                ..
            } => {}
            _ => extra += 1,
        }
    }
    assert_eq!(extra, 0);
}

#[tokio::test]
async fn test_pause_suspends_progress_and_resume_finishes() {
    let plan = two_interval_plan(0.5, 0.2);
    let session = WorkoutSession::new(plan, EventBus::new(256), &fast_config());
    let mut rx = session.subscribe();

    session.start().await.unwrap();
    session.pause().await.unwrap();
    let frozen = session.elapsed_secs().await;

    // Longer than the whole plan; a paused session must not complete
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(session.phase().await, SessionPhase::Paused);
    assert_eq!(session.elapsed_secs().await, frozen);

    session.resume().await.unwrap();
    let events = collect_until_completed(&mut rx).await;
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::WorkoutCompleted { .. })));
}

#[tokio::test]
async fn test_suspension_gap_fast_forwards_completion() {
    // 30 second plan completes almost immediately once the reported
    // gap covers the remaining time
    let plan = two_interval_plan(30.0, 10.0);
    let session = WorkoutSession::new(plan, EventBus::new(256), &fast_config());
    let mut rx = session.subscribe();

    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.report_suspension_gap(Duration::from_secs(30)).await;

    let events = collect_until_completed(&mut rx).await;
    // The gap jumped straight past interval 1's start
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::IntervalChanged { index: 1, .. })));
    assert_eq!(session.phase().await, SessionPhase::Completed);
}

#[tokio::test]
async fn test_stopped_session_emits_no_further_events() {
    let plan = two_interval_plan(30.0, 10.0);
    let session = WorkoutSession::new(plan, EventBus::new(256), &fast_config());
    let mut rx = session.subscribe();

    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    session.stop().await.unwrap();

    // Drain whatever was emitted up to the stop
    tokio::time::sleep(Duration::from_millis(100)).await;
    while rx.try_recv().is_ok() {}

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(session.phase().await, SessionPhase::Stopped);
}
