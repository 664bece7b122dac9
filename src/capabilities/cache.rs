//! Single-flight capability cache.
//!
//! Each identifier owns one [`OnceCell`]. Concurrent first references to the
//! same identifier all wait on that cell, so the initializer runs once. A
//! failed initializer leaves the cell empty and the next caller retries.
//! Initialized entries are never evicted or replaced.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

use crate::capabilities::capability::Capability;

type Slot = Arc<OnceCell<Arc<dyn Capability>>>;

/// Capability identifier → resolved instance.
#[derive(Default)]
pub struct CapabilityCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a resolved capability without triggering initialization.
    pub async fn get(&self, id: &str) -> Option<Arc<dyn Capability>> {
        self.slots.read().await.get(id)?.get().cloned()
    }

    /// Return the cached capability, or run `init` to produce it. At most one
    /// `init` runs per identifier at a time, and none once a value is stored.
    pub async fn get_or_try_init<F, Fut, E>(&self, id: &str, init: F) -> Result<Arc<dyn Capability>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn Capability>, E>>,
    {
        let slot = self.slot(id).await;
        slot.get_or_try_init(init).await.cloned()
    }

    async fn slot(&self, id: &str) -> Slot {
        if let Some(slot) = self.slots.read().await.get(id) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(id.to_string()).or_default())
    }

    /// Whether a resolved capability is cached under `id`.
    pub async fn contains(&self, id: &str) -> bool {
        self.get(id).await.is_some()
    }

    /// Number of resolved capabilities.
    pub async fn len(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Identifiers of all resolved capabilities.
    pub async fn ids(&self) -> Vec<String> {
        self.slots
            .read()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl std::fmt::Debug for CapabilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityCache").finish_non_exhaustive()
    }
}
