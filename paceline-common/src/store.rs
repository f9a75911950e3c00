//! Plan storage trait and backends
//!
//! The engine only ever talks to [`PlanStore`]; the persistence format
//! is the serialized plan record itself, one JSON file per plan for
//! the filesystem backend. Storage failures surface as opaque
//! [`Error::Storage`] values — the core does not attempt recovery.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::Plan;

/// Storage collaborator interface for validated plans
pub trait PlanStore: Send + Sync {
    /// Persist a plan record (overwrites an existing record with the same id)
    fn save(&self, plan: &Plan) -> Result<()>;

    /// Load every stored plan
    fn load_all(&self) -> Result<Vec<Plan>>;

    /// Load one plan by id
    fn load(&self, id: Uuid) -> Result<Option<Plan>>;

    /// Delete a plan by id
    fn delete(&self, id: Uuid) -> Result<()>;

    /// Whether a plan with this name is already stored
    fn exists(&self, name: &str) -> Result<bool>;
}

/// Import a plan, rejecting duplicate names
///
/// Each import is all-or-nothing: a duplicate name or a storage
/// failure leaves the store unchanged.
pub fn import_plan(store: &dyn PlanStore, plan: Plan) -> Result<Plan> {
    if store.exists(&plan.name)? {
        return Err(Error::DuplicatePlanName(plan.name));
    }
    store.save(&plan)?;
    debug!(plan = %plan.name, id = %plan.id, "imported plan");
    Ok(plan)
}

/// Filesystem-backed plan store: one `<uuid>.json` file per plan
pub struct FsPlanStore {
    dir: PathBuf,
}

impl FsPlanStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn plan_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl PlanStore for FsPlanStore {
    fn save(&self, plan: &Plan) -> Result<()> {
        let json = serde_json::to_string_pretty(plan)
            .map_err(|e| Error::Storage(format!("failed to encode plan: {e}")))?;
        std::fs::write(self.plan_path(plan.id), json)
            .map_err(|e| Error::Storage(format!("failed to write plan file: {e}")))
    }

    fn load_all(&self) -> Result<Vec<Plan>> {
        let mut plans = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| Error::Storage(format!("failed to read plan directory: {e}")))?;

        for entry in entries {
            let path = entry
                .map_err(|e| Error::Storage(format!("failed to read plan directory: {e}")))?
                .path();
            if path.extension().map(|e| e == "json") != Some(true) {
                continue;
            }
            // Unreadable records are skipped, not fatal for the batch
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<Plan>(&content) {
                    Ok(plan) => plans.push(plan),
                    Err(e) => warn!("skipping unreadable plan record {}: {e}", path.display()),
                },
                Err(e) => warn!("skipping unreadable plan file {}: {e}", path.display()),
            }
        }
        Ok(plans)
    }

    fn load(&self, id: Uuid) -> Result<Option<Plan>> {
        let path = self.plan_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("failed to read plan file: {e}")))?;
        let plan = serde_json::from_str(&content)
            .map_err(|e| Error::Storage(format!("corrupt plan record {}: {e}", path.display())))?;
        Ok(Some(plan))
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.plan_path(id);
        if !path.exists() {
            return Err(Error::NotFound(format!("plan {id}")));
        }
        std::fs::remove_file(&path)
            .map_err(|e| Error::Storage(format!("failed to delete plan file: {e}")))
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.load_all()?.iter().any(|p| p.name == name))
    }
}

/// In-memory plan store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryPlanStore {
    plans: RwLock<HashMap<Uuid, Plan>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryPlanStore {
    fn save(&self, plan: &Plan) -> Result<()> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| Error::Storage("plan map lock poisoned".to_string()))?;
        plans.insert(plan.id, plan.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Plan>> {
        let plans = self
            .plans
            .read()
            .map_err(|_| Error::Storage("plan map lock poisoned".to_string()))?;
        Ok(plans.values().cloned().collect())
    }

    fn load(&self, id: Uuid) -> Result<Option<Plan>> {
        let plans = self
            .plans
            .read()
            .map_err(|_| Error::Storage("plan map lock poisoned".to_string()))?;
        Ok(plans.get(&id).cloned())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| Error::Storage("plan map lock poisoned".to_string()))?;
        plans
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("plan {id}")))
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let plans = self
            .plans
            .read()
            .map_err(|_| Error::Storage("plan map lock poisoned".to_string()))?;
        Ok(plans.values().any(|p| p.name == name))
    }
}
