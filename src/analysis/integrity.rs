use crate::axes::registry::AxisRegistry;
use crate::search::index::InMemoryIndex;
use crate::search::types::ItemId;

use serde::{Deserialize, Serialize};

/// An item tagged with two tags of one axis that cannot both be true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConflict {
    pub item_id: ItemId,
    pub axis: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagsPerItem {
    pub average: f64,
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub item_count: usize,
    pub tag_count: usize,
    pub relation_count: usize,
    /// Known tags no item carries any more.
    pub orphan_tags: Vec<String>,
    pub untagged_items: Vec<ItemId>,
    pub axis_conflicts: Vec<AxisConflict>,
    /// `None` for an empty index.
    pub tags_per_item: Option<TagsPerItem>,
}

impl IntegrityReport {
    pub fn check(registry: &AxisRegistry, index: &InMemoryIndex) -> Self {
        let stats = index.stats(0);
        let orphan_tags: Vec<String> = index
            .tag_usage()
            .into_iter()
            .filter(|usage| usage.count == 0)
            .map(|usage| usage.tag)
            .collect();

        let mut untagged_items = Vec::new();
        let mut axis_conflicts = Vec::new();
        let mut tag_counts = Vec::new();

        for record in index.records() {
            tag_counts.push(record.tags.len());
            if record.tags.is_empty() {
                untagged_items.push(record.id);
                continue;
            }

            for axis in registry.axes() {
                let carried: Vec<&str> = axis
                    .tag_names()
                    .filter(|tag| record.has_tag(tag))
                    .collect();
                let conflicting = carried.iter().enumerate().any(|(i, left)| {
                    carried[i + 1..].iter().any(|right| {
                        match (axis.range_of(left), axis.range_of(right)) {
                            (Some(a), Some(b)) => !a.overlaps(&b),
                            _ => false,
                        }
                    })
                });
                if conflicting {
                    axis_conflicts.push(AxisConflict {
                        item_id: record.id,
                        axis: axis.name.clone(),
                        tags: carried.iter().map(|tag| tag.to_string()).collect(),
                    });
                }
            }
        }

        let tags_per_item = match (tag_counts.iter().min(), tag_counts.iter().max()) {
            (Some(min), Some(max)) => Some(TagsPerItem {
                average: stats.relation_count as f64 / tag_counts.len() as f64,
                min: *min,
                max: *max,
            }),
            _ => None,
        };

        let report = Self {
            item_count: stats.item_count,
            tag_count: stats.tag_count,
            relation_count: stats.relation_count,
            orphan_tags,
            untagged_items,
            axis_conflicts,
            tags_per_item,
        };

        if report.is_clean() {
            tracing::info!("Integrity check passed for {} items", report.item_count);
        } else {
            tracing::warn!(
                "Integrity check: {} orphan tags, {} untagged items, {} axis conflicts",
                report.orphan_tags.len(),
                report.untagged_items.len(),
                report.axis_conflicts.len()
            );
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        self.orphan_tags.is_empty()
            && self.untagged_items.is_empty()
            && self.axis_conflicts.is_empty()
    }
}
