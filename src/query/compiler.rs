use super::normalize::normalize_tags;
use super::types::Query;
use crate::axes::registry::AxisRegistry;
use crate::axes::types::{Axis, Range};
use crate::error::{SearchError, SearchResult};

use std::collections::BTreeSet;
use std::sync::Arc;

/// Compiles positive tag selections against an injected axis registry.
///
/// Pure in-memory set and range arithmetic; it never touches storage.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    registry: Arc<AxisRegistry>,
    reject_contradictions: bool,
}

impl QueryCompiler {
    pub fn new(registry: Arc<AxisRegistry>) -> Self {
        Self {
            registry,
            reject_contradictions: false,
        }
    }

    /// When enabled, two chosen tags of one axis with disjoint ranges (e.g. `1girl` and
    /// `3girls`) fail with `InvalidQuery` instead of being unioned.
    pub fn with_contradiction_check(mut self, enabled: bool) -> Self {
        self.reject_contradictions = enabled;
        self
    }

    pub fn registry(&self) -> &Arc<AxisRegistry> {
        &self.registry
    }

    pub fn compile<I, S>(&self, raw_positive: I) -> SearchResult<Query>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.compile_with_negatives(raw_positive, std::iter::empty::<&str>())
    }

    /// Compiles the positive selection and unions caller-supplied negatives into the
    /// inferred ones. A tag present on both sides stays positive.
    pub fn compile_with_negatives<I, S, J, T>(
        &self,
        raw_positive: I,
        raw_negative: J,
    ) -> SearchResult<Query>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        J: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let positive = normalize_tags(raw_positive);
        if positive.is_empty() {
            return Err(SearchError::invalid(
                "at least one positive tag is required",
            ));
        }

        let mut negative = self.infer_negatives(&positive)?;
        negative.extend(normalize_tags(raw_negative));

        let query = Query::new(positive, negative);
        tracing::debug!(
            "Compiled query: positive={:?} negative={:?}",
            query.positive(),
            query.negative()
        );
        Ok(query)
    }

    /// Axis-driven inference over an already normalized positive set.
    ///
    /// Each axis is handled independently:
    /// - chosen tags present: negate every axis tag overlapping none of the chosen ranges;
    /// - no chosen tags: the axis is read as "zero / not applicable" and negated entirely.
    ///
    /// Positive tags are removed from the result.
    pub fn infer_negatives(&self, positive: &BTreeSet<String>) -> SearchResult<BTreeSet<String>> {
        let mut negative = BTreeSet::new();

        for axis in self.registry.axes() {
            let allow: Vec<Range> = axis
                .tags
                .iter()
                .filter(|(tag, _)| positive.contains(tag))
                .map(|(_, range)| *range)
                .collect();

            if allow.is_empty() {
                negative.extend(axis.tag_names().map(str::to_string));
                continue;
            }

            if self.reject_contradictions {
                check_consistent(axis, positive, &allow)?;
            }

            for (tag, range) in &axis.tags {
                if !allow.iter().any(|allowed| range.overlaps(allowed)) {
                    negative.insert(tag.clone());
                }
            }
        }

        negative.retain(|tag| !positive.contains(tag));
        Ok(negative)
    }
}

fn check_consistent(axis: &Axis, positive: &BTreeSet<String>, allow: &[Range]) -> SearchResult<()> {
    for (i, left) in allow.iter().enumerate() {
        for right in &allow[i + 1..] {
            if !left.overlaps(right) {
                let chosen: Vec<&str> = axis
                    .tag_names()
                    .filter(|tag| positive.contains(*tag))
                    .collect();
                return Err(SearchError::invalid(format!(
                    "contradictory selection on axis '{}': {}",
                    axis.name,
                    chosen.join(", ")
                )));
            }
        }
    }
    Ok(())
}
