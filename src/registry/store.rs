//! In-memory module registry
//!
//! A single lock covers the whole map. Every mutation (including implicit
//! creation) happens inside one write section, so a reader never observes a
//! module with half of an update applied.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::models::{InfoUpdate, Module, ModuleId, ModuleSummary, StatsUpdate};
use crate::error::{Result, SupervisorError};

#[derive(Debug, Default)]
struct RegistryInner {
    modules: HashMap<ModuleId, Module>,
    /// Ids in order of first appearance
    order: Vec<ModuleId>,
}

impl RegistryInner {
    fn entry(&mut self, id: ModuleId) -> &mut Module {
        if !self.modules.contains_key(&id) {
            tracing::info!(module_id = id, "Unseen module, creating registry entry");
            self.order.push(id);
        }
        self.modules.entry(id).or_insert_with(|| Module::new(id))
    }
}

/// Registry of every module seen since the process started
///
/// Modules are never removed; a module that stopped announcing itself keeps
/// its last-known state and an old `last_seen`.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    inner: RwLock<RegistryInner>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the module with `id`, inserting a zero-valued one if unseen
    pub async fn get_or_create(&self, id: ModuleId) -> Module {
        let mut inner = self.inner.write().await;
        inner.entry(id).clone()
    }

    /// Apply an identity/configuration announcement
    ///
    /// Only the pin at `update.pin_index` is replaced; other pins and the
    /// stats block are left alone.
    pub async fn apply_info(&self, update: InfoUpdate) -> Module {
        let now = now_millis();
        let mut inner = self.inner.write().await;
        let module = inner.entry(update.id);

        module.name = update.name;
        if let Some(thumbnail_url) = update.thumbnail_url {
            module.thumbnail_url = thumbnail_url;
        }
        module.control_port = update.control_port;
        module.start_time = update.start_time;
        module.pins.insert(update.pin_index, update.pin);
        module.ip = update.ip;
        module.last_seen = now;

        module.clone()
    }

    /// Apply a statistics announcement
    pub async fn apply_stats(&self, update: StatsUpdate) -> Module {
        let now = now_millis();
        let mut inner = self.inner.write().await;
        let module = inner.entry(update.id);

        module.stats = update.stats;
        module.last_seen = now;

        module.clone()
    }

    /// `{id, name}` of every module, in order of first appearance
    pub async fn list(&self) -> Vec<ModuleSummary> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.modules.get(id))
            .map(Module::summary)
            .collect()
    }

    pub async fn get(&self, id: ModuleId) -> Result<Module> {
        let inner = self.inner.read().await;
        inner
            .modules
            .get(&id)
            .cloned()
            .ok_or(SupervisorError::UnknownModule(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.modules.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
