//! First-run import of bundled workout plans
//!
//! On the first launch the plans shipped with the application are
//! imported into the store. The "has this run before" gate is an
//! explicit [`ImportMarker`] file rather than an ambient process-wide
//! flag, so the lifecycle is visible and testable:
//!
//! - **init**: the marker does not exist; the importer runs.
//! - **read**: [`ImportMarker::is_set`] before importing.
//! - **write**: [`ImportMarker::set`] after a completed scan, recording
//!   when the import happened.
//!
//! Each plan file is all-or-nothing; a file that fails to parse or
//! collides with an existing name is logged and skipped without
//! aborting the batch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use paceline_common::ingest::parse_plan_file;
use paceline_common::store::{import_plan, PlanStore};
use paceline_common::{Error, Result};

/// Persisted first-run gate for the prebuilt import
pub struct ImportMarker {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct MarkerRecord {
    imported_at: DateTime<Utc>,
    imported_count: usize,
}

impl ImportMarker {
    /// Marker file lives next to the plan records in the root folder
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join("prebuilt_import.json"),
        }
    }

    /// Whether the import has already run
    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Record a completed import
    pub fn set(&self, imported_count: usize) -> Result<()> {
        let record = MarkerRecord {
            imported_at: Utc::now(),
            imported_count,
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| Error::Storage(format!("failed to encode import marker: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Import bundled plan JSON files on first run
///
/// Returns the number of plans imported. A set marker short-circuits
/// to zero; a missing bundle directory imports nothing and leaves the
/// marker unset so a later run can pick the bundle up.
pub fn import_prebuilt_plans(
    store: &dyn PlanStore,
    marker: &ImportMarker,
    bundle_dir: &Path,
) -> Result<usize> {
    if marker.is_set() {
        debug!("prebuilt plans already imported, skipping");
        return Ok(0);
    }

    if !bundle_dir.is_dir() {
        warn!("bundled plans directory {} not found", bundle_dir.display());
        return Ok(0);
    }

    let mut imported = 0;
    for entry in std::fs::read_dir(bundle_dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json") != Some(true) {
            continue;
        }

        match parse_plan_file(&path) {
            Ok(plan) => {
                let name = plan.name.clone();
                match import_plan(store, plan) {
                    Ok(_) => {
                        info!(plan = %name, "imported prebuilt plan");
                        imported += 1;
                    }
                    Err(Error::DuplicatePlanName(_)) => {
                        debug!(plan = %name, "prebuilt plan already exists, skipping");
                    }
                    Err(e) => {
                        warn!(plan = %name, "failed to store prebuilt plan: {e}");
                    }
                }
            }
            Err(e) => {
                warn!("failed to parse prebuilt plan {}: {e}", path.display());
            }
        }
    }

    marker.set(imported)?;
    Ok(imported)
}
