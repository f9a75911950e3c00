//! Paceline - workout session engine entry point
//!
//! Imports interval-training plans (two accepted JSON schemas) into
//! the plan store and drives a live session, printing the event stream
//! that a notifier/UI would otherwise consume.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paceline_common::config;
use paceline_common::events::{EventBus, SessionEvent};
use paceline_common::ingest::parse_plan_file;
use paceline_common::model::SessionPhase;
use paceline_common::store::{import_plan, FsPlanStore, PlanStore};
use paceline_common::time::format_clock;
use paceline_engine::seed::{import_prebuilt_plans, ImportMarker};
use paceline_engine::WorkoutSession;

/// Command-line arguments for paceline
#[derive(Parser, Debug)]
#[command(name = "paceline")]
#[command(about = "Interval-training plan engine")]
#[command(version)]
struct Args {
    /// Root folder for plan storage
    #[arg(short, long, env = "PACELINE_ROOT")]
    root_folder: Option<PathBuf>,

    /// Directory of bundled plans to import on first run
    #[arg(long)]
    bundle_dir: Option<PathBuf>,

    /// Import a plan JSON file (simple or step format)
    #[arg(long)]
    import: Option<PathBuf>,

    /// List stored plans
    #[arg(long)]
    list: bool,

    /// Run a workout session for the named plan
    #[arg(long)]
    run: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paceline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let root = config::resolve_root_folder(args.root_folder.as_deref());
    info!("Root folder: {}", root.display());

    let store = FsPlanStore::open(root.join("plans")).context("Failed to open plan store")?;

    if let Some(bundle_dir) = &args.bundle_dir {
        let marker = ImportMarker::new(&root);
        let imported = import_prebuilt_plans(&store, &marker, bundle_dir)
            .context("Failed to import bundled plans")?;
        if imported > 0 {
            info!("Imported {imported} bundled plans");
        }
    }

    if let Some(path) = &args.import {
        let plan = parse_plan_file(path)
            .with_context(|| format!("Failed to parse plan {}", path.display()))?;
        let plan = import_plan(&store, plan).context("Failed to import plan")?;
        println!("Imported '{}' ({:.0}s, {} intervals)", plan.name,
            plan.total_duration_secs, plan.intervals.len());
    }

    if args.list {
        let mut plans = store.load_all().context("Failed to load plans")?;
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if plans.is_empty() {
            println!("No plans stored.");
        }
        for plan in plans {
            println!(
                "{}  {}  ({} intervals, {})",
                plan.id,
                plan.name,
                plan.intervals.len(),
                format_clock(plan.total_duration_secs)
            );
        }
    }

    if let Some(name) = &args.run {
        run_session(&store, name).await?;
    }

    Ok(())
}

/// Run a workout session for the named plan, printing its events
async fn run_session(store: &dyn PlanStore, name: &str) -> Result<()> {
    let plan = store
        .load_all()
        .context("Failed to load plans")?
        .into_iter()
        .find(|p| p.name == name);

    let Some(plan) = plan else {
        bail!("no stored plan named '{name}'");
    };

    let plan = Arc::new(plan);
    let session_config = config::load_session_config();
    let session = WorkoutSession::new(Arc::clone(&plan), EventBus::new(256), &session_config);
    let mut events = session.subscribe();

    session.start().await.context("Failed to start workout")?;
    println!(
        "Running '{}' ({})",
        plan.name,
        format_clock(plan.total_duration_secs)
    );

    loop {
        let event = events.recv().await.context("Event stream closed")?;
        match event {
            SessionEvent::IntervalChanged {
                interval,
                position_secs,
                ..
            } => {
                println!(
                    "[{}] interval: {:.1} km/h at {:.1}% incline",
                    format_clock(position_secs),
                    interval.speed_kmh,
                    interval.incline_percent
                );
            }
            SessionEvent::UpcomingWarning {
                interval,
                starts_in_secs,
                ..
            } => {
                println!(
                    "  coming up in {starts_in_secs:.0}s: {:.1} km/h at {:.1}%",
                    interval.speed_kmh, interval.incline_percent
                );
            }
            SessionEvent::WorkoutCompleted { duration_secs, .. } => {
                println!("Workout complete in {}", format_clock(duration_secs));
            }
            SessionEvent::PhaseChanged { new_phase, .. } => {
                if new_phase == SessionPhase::Completed {
                    break;
                }
            }
        }
    }

    Ok(())
}
