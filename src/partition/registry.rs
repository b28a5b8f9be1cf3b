//! Shard Registry
//!
//! Maps shard locators from the manifest (e.g. `"solo_multi/solo"`) to the executor
//! serving that shard. Locators stay plain strings so a manifest can be loaded before
//! any shard exists.

use crate::search::engine::SearchExecutor;

use dashmap::DashMap;
use std::sync::Arc;

pub struct ShardRegistry {
    executors: DashMap<String, Arc<SearchExecutor>>,
}

impl ShardRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers (or replaces) the executor behind `locator`.
    pub fn register(&self, locator: &str, executor: SearchExecutor) {
        self.executors
            .insert(locator.to_string(), Arc::new(executor));
        tracing::info!("Registered shard: {}", locator);
    }

    pub fn deregister(&self, locator: &str) -> bool {
        let removed = self.executors.remove(locator).is_some();
        if removed {
            tracing::info!("Deregistered shard: {}", locator);
        }
        removed
    }

    pub fn get(&self, locator: &str) -> Option<Arc<SearchExecutor>> {
        self.executors
            .get(locator)
            .map(|entry| entry.value().clone())
    }

    pub fn has_shard(&self, locator: &str) -> bool {
        self.executors.contains_key(locator)
    }

    /// Registered locators, sorted.
    pub fn list_shards(&self) -> Vec<String> {
        let mut locators: Vec<String> = self
            .executors
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        locators.sort();
        locators
    }

    pub fn shard_count(&self) -> usize {
        self.executors.len()
    }
}

impl Default for ShardRegistry {
    fn default() -> Self {
        Self {
            executors: DashMap::new(),
        }
    }
}
