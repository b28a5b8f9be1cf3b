//! Partitioning Strategies
//!
//! Both shipped strategies are disjoint and exhaustive: every item lands in exactly one
//! partition, decided by manifest order.

use super::types::{Membership, PartitionEntry, PartitionManifest, PredicateDescriptor};
use crate::axes::registry::AxisRegistry;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

const SOLO: &str = "solo";
const ONE_GIRL: &str = "1girl";
const ONE_BOY: &str = "1boy";

/// Range start from which an axis tag implies a multi-subject scene.
const MULTI_MIN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// `solo` and everything else.
    SoloMulti,
    /// `girl_solo`, `boy_solo`, `couple` (1boy and 1girl), then `others`.
    Detailed,
}

impl PartitionStrategy {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "solo_multi" | "binary" => Ok(Self::SoloMulti),
            "detailed" => Ok(Self::Detailed),
            other => Err(anyhow::anyhow!("Unknown partition strategy: {}", other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SoloMulti => "solo_multi",
            Self::Detailed => "detailed",
        }
    }

    /// Builds the manifest for this strategy.
    ///
    /// The residual partition is routed to by every axis tag starting at two or more
    /// subjects, which is why the registry is needed here. Fails if the registry lacks a
    /// tag the strategy splits on.
    pub fn manifest(&self, registry: &AxisRegistry) -> Result<PartitionManifest> {
        let required: &[&str] = match self {
            Self::SoloMulti => &[SOLO],
            Self::Detailed => &[SOLO, ONE_GIRL, ONE_BOY],
        };
        if let Some(missing) = required.iter().find(|tag| !registry.contains(tag)) {
            return Err(anyhow::anyhow!(
                "Strategy '{}' needs axis tag '{}' in the registry",
                self.name(),
                missing
            ));
        }

        let residual_routes: Vec<Vec<String>> = registry
            .tags_with_min_at_least(MULTI_MIN)
            .into_iter()
            .map(|tag| vec![tag])
            .collect();

        let partitions = match self {
            Self::SoloMulti => vec![
                self.has_all("solo", &[SOLO]),
                self.residual("multi", residual_routes),
            ],
            Self::Detailed => vec![
                self.has_all("girl_solo", &[ONE_GIRL, SOLO]),
                self.has_all("boy_solo", &[ONE_BOY, SOLO]),
                self.has_all("couple", &[ONE_BOY, ONE_GIRL]),
                self.residual("others", residual_routes),
            ],
        };

        Ok(PartitionManifest {
            strategy: self.name().to_string(),
            partitions,
        })
    }

    fn has_all(&self, name: &str, tags: &[&str]) -> PartitionEntry {
        let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
        PartitionEntry {
            name: name.to_string(),
            predicate: PredicateDescriptor {
                membership: Membership::HasAll(tags.clone()),
                route_when: vec![tags],
            },
            shard_locator: self.locator(name),
        }
    }

    fn residual(&self, name: &str, route_when: Vec<Vec<String>>) -> PartitionEntry {
        PartitionEntry {
            name: name.to_string(),
            predicate: PredicateDescriptor {
                membership: Membership::Residual,
                route_when,
            },
            shard_locator: self.locator(name),
        }
    }

    fn locator(&self, partition: &str) -> String {
        format!("{}/{}", self.name(), partition)
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
