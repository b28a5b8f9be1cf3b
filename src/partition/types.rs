use crate::search::types::SearchHit;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Which items belong to a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tags")]
pub enum Membership {
    /// Items carrying every listed tag.
    HasAll(Vec<String>),
    /// Every item no earlier partition claimed.
    Residual,
}

impl Membership {
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Membership::HasAll(required) => required.iter().all(|tag| tags.contains(tag)),
            Membership::Residual => true,
        }
    }
}

/// Facet predicate of one partition, evaluable against a tag set alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateDescriptor {
    pub membership: Membership,
    /// Tag groups that pin a compiled query to this partition: if every tag of one group
    /// is positive, no other partition can hold a match.
    #[serde(default)]
    pub route_when: Vec<Vec<String>>,
}

impl PredicateDescriptor {
    pub fn decides(&self, positive: &BTreeSet<String>) -> bool {
        self.route_when
            .iter()
            .any(|group| !group.is_empty() && group.iter().all(|tag| positive.contains(tag)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionEntry {
    pub name: String,
    pub predicate: PredicateDescriptor,
    pub shard_locator: String,
}

/// Ordered partition list produced offline and loaded read-only by the router.
///
/// Order matters twice: an item belongs to the first entry whose membership matches,
/// and a query routes to the first entry whose predicate decides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionManifest {
    pub strategy: String,
    pub partitions: Vec<PartitionEntry>,
}

impl PartitionManifest {
    pub fn classify(&self, tags: &BTreeSet<String>) -> Option<&PartitionEntry> {
        self.partitions
            .iter()
            .find(|entry| entry.predicate.membership.matches(tags))
    }

    pub fn route_target(&self, positive: &BTreeSet<String>) -> Option<&PartitionEntry> {
        self.partitions
            .iter()
            .find(|entry| entry.predicate.decides(positive))
    }

    pub fn entry(&self, name: &str) -> Option<&PartitionEntry> {
        self.partitions.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.partitions.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        tracing::info!(
            "Saved manifest '{}' with {} partitions to {}",
            self.strategy,
            self.partitions.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid manifest JSON in {}", path.display()))?;
        if manifest.partitions.is_empty() {
            return Err(anyhow::anyhow!(
                "Manifest {} has no partitions",
                path.display()
            ));
        }
        Ok(manifest)
    }
}

/// Item counts per partition after an offline split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub total_items: usize,
    pub per_partition: BTreeMap<String, usize>,
    /// Items no partition claimed (only possible without a residual entry).
    pub unassigned: usize,
}

impl PartitionStats {
    pub fn share(&self, partition: &str) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        let count = self.per_partition.get(partition).copied().unwrap_or(0);
        count as f64 / self.total_items as f64
    }
}

/// Merged router output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedResults {
    pub hits: Vec<SearchHit>,
    /// Set when at least one dispatched partition failed under the lenient policy.
    pub partial: bool,
    pub missing_partitions: Vec<String>,
    pub partitions_queried: Vec<String>,
}
