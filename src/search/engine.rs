//! Query Executor
//!
//! Evaluates a compiled positive/negative query against one tag index: AND over the
//! positive postings, NOT over the negative ones, then ranking and truncation. Every
//! posting read is bounded by the request deadline when one is set.

use super::index::{PostingList, TagIndex};
use super::types::{Deadline, ItemId, SearchHit, rank_hits};
use crate::error::{SearchError, SearchResult};
use crate::query::types::Query;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Evaluates compiled queries against one `TagIndex`.
///
/// Positive postings are intersected first, smallest list outward; negative postings
/// are only consulted for items that survived the intersection.
#[derive(Clone)]
pub struct SearchExecutor {
    index: Arc<dyn TagIndex>,
    shard: String,
    deadline: Option<Duration>,
}

impl SearchExecutor {
    pub fn new(index: Arc<dyn TagIndex>) -> Self {
        Self::named("local", index)
    }

    /// Executor for a named shard. The name shows up in logs and in
    /// `IndexUnavailable` errors.
    pub fn named(shard: &str, index: Arc<dyn TagIndex>) -> Self {
        Self {
            index,
            shard: shard.to_string(),
            deadline: None,
        }
    }

    /// Default budget applied when a call does not carry its own deadline.
    pub fn with_deadline(mut self, budget: Option<Duration>) -> Self {
        self.deadline = budget;
        self
    }

    pub fn shard(&self) -> &str {
        &self.shard
    }

    pub async fn search(
        &self,
        positive: &BTreeSet<String>,
        negative: &BTreeSet<String>,
        limit: i64,
    ) -> SearchResult<Vec<SearchHit>> {
        let deadline = self.deadline.map(Deadline::after);
        self.search_until(positive, negative, limit, deadline).await
    }

    pub async fn search_query(&self, query: &Query, limit: i64) -> SearchResult<Vec<SearchHit>> {
        self.search(query.positive(), query.negative(), limit).await
    }

    /// Runs the query, abandoning posting-list reads once `deadline` passes.
    ///
    /// An expired deadline yields `Timeout`, never a truncated result.
    pub async fn search_until(
        &self,
        positive: &BTreeSet<String>,
        negative: &BTreeSet<String>,
        limit: i64,
        deadline: Option<Deadline>,
    ) -> SearchResult<Vec<SearchHit>> {
        if positive.is_empty() {
            return Err(SearchError::invalid(
                "at least one positive tag is required",
            ));
        }
        if limit <= 0 {
            return Err(SearchError::invalid(format!(
                "limit must be positive, got {}",
                limit
            )));
        }
        let limit = limit as usize;

        let mut lists = Vec::with_capacity(positive.len());
        for tag in positive {
            let postings = self.read_postings(tag, deadline).await?;
            if postings.is_empty() {
                tracing::debug!(
                    "[{}] Positive tag '{}' has no postings, result is empty",
                    self.shard,
                    tag
                );
                return Ok(Vec::new());
            }
            lists.push(postings);
        }

        let mut candidates = intersect(&mut lists);

        for tag in negative {
            if candidates.is_empty() {
                break;
            }
            let postings = self.read_postings(tag, deadline).await?;
            candidates.retain(|item_id, _| !postings.contains(*item_id));
        }

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .map(|(item_id, match_count)| SearchHit {
                item_id,
                match_count,
            })
            .collect();
        rank_hits(&mut hits);
        hits.truncate(limit);

        tracing::debug!(
            "[{}] Search {:?} -{:?} returned {} hits",
            self.shard,
            positive,
            negative,
            hits.len()
        );
        Ok(hits)
    }

    async fn read_postings(
        &self,
        tag: &str,
        deadline: Option<Deadline>,
    ) -> SearchResult<Arc<PostingList>> {
        let Some(deadline) = deadline else {
            return self.index.postings(tag).await;
        };

        match tokio::time::timeout_at(deadline.at(), self.index.postings(tag)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "[{}] Deadline of {} ms expired while reading '{}'",
                    self.shard,
                    deadline.budget_ms(),
                    tag
                );
                Err(SearchError::Timeout {
                    deadline_ms: deadline.budget_ms(),
                })
            }
        }
    }
}

/// Items present in every list, each mapped to the number of lists it was found in.
fn intersect(lists: &mut [Arc<PostingList>]) -> HashMap<ItemId, usize> {
    lists.sort_by_key(|list| list.len());
    let matched = lists.len();
    let Some((smallest, rest)) = lists.split_first() else {
        return HashMap::new();
    };

    smallest
        .item_ids()
        .filter(|item_id| rest.iter().all(|list| list.contains(*item_id)))
        .map(|item_id| (item_id, matched))
        .collect()
}
