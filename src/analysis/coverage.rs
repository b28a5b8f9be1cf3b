use crate::axes::registry::AxisRegistry;
use crate::query::normalize::normalize_tags;
use crate::search::types::ItemRecord;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket for items carrying no tag of an axis.
pub const NONE_BUCKET: &str = "none";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCoverage {
    pub item_count: usize,
    /// axis -> tag (or `none`) -> items
    pub per_axis: BTreeMap<String, BTreeMap<String, usize>>,
    /// `"boys:1boy | girls:1girl+2girls | solo:none"` -> items
    pub combinations: BTreeMap<String, usize>,
}

impl AxisCoverage {
    pub fn compute<'a>(
        registry: &AxisRegistry,
        records: impl IntoIterator<Item = &'a ItemRecord>,
    ) -> Self {
        let mut coverage = Self::default();
        let mut axis_order: Vec<&str> = registry.axes().iter().map(|a| a.name.as_str()).collect();
        axis_order.sort_unstable();

        for record in records {
            coverage.item_count += 1;
            let tags = normalize_tags(record.tags.iter().map(|assignment| &assignment.tag));

            let mut key_parts = Vec::with_capacity(axis_order.len());
            for axis_name in &axis_order {
                let Some(axis) = registry.axis(axis_name) else {
                    continue;
                };
                let mut present: Vec<&str> =
                    axis.tag_names().filter(|tag| tags.contains(*tag)).collect();
                present.sort_unstable();

                let histogram = coverage.per_axis.entry(axis.name.clone()).or_default();
                if present.is_empty() {
                    *histogram.entry(NONE_BUCKET.to_string()).or_default() += 1;
                    key_parts.push(format!("{}:{}", axis.name, NONE_BUCKET));
                } else {
                    for tag in &present {
                        *histogram.entry(tag.to_string()).or_default() += 1;
                    }
                    key_parts.push(format!("{}:{}", axis.name, present.join("+")));
                }
            }

            *coverage
                .combinations
                .entry(key_parts.join(" | "))
                .or_default() += 1;
        }

        tracing::debug!(
            "Axis coverage over {} items: {} distinct combinations",
            coverage.item_count,
            coverage.combinations.len()
        );
        coverage
    }

    /// Items with no tag of `axis`.
    pub fn none_count(&self, axis: &str) -> usize {
        self.per_axis
            .get(axis)
            .and_then(|histogram| histogram.get(NONE_BUCKET))
            .copied()
            .unwrap_or(0)
    }

    /// Most frequent combinations first; equal counts keep key order.
    pub fn top_combinations(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .combinations
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
