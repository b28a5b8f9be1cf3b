//! Corpus Partitioner
//!
//! Classifies every item against a manifest and builds one in-memory index per
//! partition.

use super::registry::ShardRegistry;
use super::strategy::PartitionStrategy;
use super::types::{PartitionManifest, PartitionStats};
use crate::axes::registry::AxisRegistry;
use crate::query::normalize::normalize_tags;
use crate::search::engine::SearchExecutor;
use crate::search::index::InMemoryIndex;
use crate::search::types::ItemRecord;

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Offline split of the full tag relation into per-partition indexes.
pub struct CorpusPartitioner {
    manifest: PartitionManifest,
}

/// Output of one partitioning run.
pub struct PartitionedCorpus {
    pub manifest: PartitionManifest,
    /// Partition name -> shard-local index.
    pub shards: BTreeMap<String, Arc<InMemoryIndex>>,
    pub stats: PartitionStats,
}

impl CorpusPartitioner {
    pub fn new(manifest: PartitionManifest) -> Self {
        Self { manifest }
    }

    pub fn from_strategy(strategy: PartitionStrategy, registry: &AxisRegistry) -> Result<Self> {
        Ok(Self::new(strategy.manifest(registry)?))
    }

    pub fn manifest(&self) -> &PartitionManifest {
        &self.manifest
    }

    pub fn partition(&self, records: impl IntoIterator<Item = ItemRecord>) -> PartitionedCorpus {
        let shards: BTreeMap<String, Arc<InMemoryIndex>> = self
            .manifest
            .partitions
            .iter()
            .map(|entry| (entry.name.clone(), Arc::new(InMemoryIndex::new())))
            .collect();

        let mut stats = PartitionStats {
            per_partition: shards.keys().map(|name| (name.clone(), 0)).collect(),
            ..PartitionStats::default()
        };

        for record in records {
            stats.total_items += 1;
            let tags = normalize_tags(record.tags.iter().map(|assignment| &assignment.tag));

            let Some(entry) = self.manifest.classify(&tags) else {
                tracing::warn!("Item {} matches no partition, skipping", record.id);
                stats.unassigned += 1;
                continue;
            };

            if let Some(shard) = shards.get(&entry.name) {
                shard.insert_item(record);
                *stats.per_partition.entry(entry.name.clone()).or_default() += 1;
            }
        }

        tracing::info!(
            "Partitioned {} items with strategy '{}' ({} unassigned)",
            stats.total_items,
            self.manifest.strategy,
            stats.unassigned
        );
        for (name, count) in &stats.per_partition {
            tracing::info!(
                "  {}: {} items ({:.1}%)",
                name,
                count,
                stats.share(name) * 100.0
            );
        }

        PartitionedCorpus {
            manifest: self.manifest.clone(),
            shards,
            stats,
        }
    }
}

impl PartitionedCorpus {
    /// Registers one executor per partition under its shard locator.
    pub fn shard_registry(&self, deadline: Option<Duration>) -> Arc<ShardRegistry> {
        let registry = ShardRegistry::new();
        for entry in &self.manifest.partitions {
            if let Some(index) = self.shards.get(&entry.name) {
                let executor = SearchExecutor::named(&entry.shard_locator, index.clone())
                    .with_deadline(deadline);
                registry.register(&entry.shard_locator, executor);
            }
        }
        registry
    }
}
