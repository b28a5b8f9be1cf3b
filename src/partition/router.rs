//! Partition Router
//!
//! Sends a query to the one partition that can hold its matches, or fans it out to all
//! of them and merges the shard results. Shard failures follow the configured
//! `FailurePolicy`.

use super::registry::ShardRegistry;
use super::types::{PartitionEntry, PartitionManifest, RoutedResults};
use crate::config::{FailurePolicy, LimitPolicy};
use crate::error::{SearchError, SearchResult};
use crate::query::types::Query;
use crate::search::types::{Deadline, ItemId, SearchHit, rank_hits};

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Dispatches compiled queries to partition shards and merges what comes back.
///
/// Routing only looks at the positive set. A query that pins one partition goes there
/// alone; anything else fans out to every partition concurrently.
pub struct PartitionRouter {
    manifest: Arc<PartitionManifest>,
    shards: Arc<ShardRegistry>,
    failure_policy: FailurePolicy,
    limit_policy: LimitPolicy,
    deadline: Option<Duration>,
}

type ShardOutcome = (String, SearchResult<Vec<SearchHit>>);

impl PartitionRouter {
    pub fn new(manifest: Arc<PartitionManifest>, shards: Arc<ShardRegistry>) -> Self {
        Self {
            manifest,
            shards,
            failure_policy: FailurePolicy::default(),
            limit_policy: LimitPolicy::default(),
            deadline: None,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_limit_policy(mut self, policy: LimitPolicy) -> Self {
        self.limit_policy = policy;
        self
    }

    pub fn with_deadline(mut self, budget: Option<Duration>) -> Self {
        self.deadline = budget;
        self
    }

    pub fn manifest(&self) -> &PartitionManifest {
        &self.manifest
    }

    /// Partitions a query would be sent to.
    pub fn targets(&self, query: &Query) -> Vec<&PartitionEntry> {
        match self.manifest.route_target(query.positive()) {
            Some(entry) => vec![entry],
            None => self.manifest.partitions.iter().collect(),
        }
    }

    pub async fn route(&self, query: &Query, limit: i64) -> SearchResult<RoutedResults> {
        let deadline = self.deadline.map(Deadline::after);
        self.route_until(query, limit, deadline).await
    }

    /// Routes the query with one deadline shared by every dispatched shard.
    pub async fn route_until(
        &self,
        query: &Query,
        limit: i64,
        deadline: Option<Deadline>,
    ) -> SearchResult<RoutedResults> {
        if query.positive().is_empty() {
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

        let targets = self.targets(query);
        let shard_limit = self.shard_limit(limit, targets.len());
        if targets.len() == 1 {
            tracing::debug!(
                "Routing {:?} exclusively to partition '{}'",
                query.positive(),
                targets[0].name
            );
        } else {
            tracing::debug!(
                "Fanning {:?} out to {} partitions (limit {} each)",
                query.positive(),
                targets.len(),
                shard_limit
            );
        }

        let query = Arc::new(query.clone());
        let mut pending: BTreeSet<String> = BTreeSet::new();
        let mut join_set: JoinSet<ShardOutcome> = JoinSet::new();

        for entry in &targets {
            pending.insert(entry.name.clone());
            let name = entry.name.clone();
            let locator = entry.shard_locator.clone();
            let executor = self.shards.get(&locator);
            let query = query.clone();

            join_set.spawn(async move {
                let Some(executor) = executor else {
                    let err = SearchError::unavailable(locator, "no executor registered");
                    return (name, Err(err));
                };
                let result = match deadline {
                    Some(deadline) => {
                        executor
                            .search_until(
                                query.positive(),
                                query.negative(),
                                shard_limit,
                                Some(deadline),
                            )
                            .await
                    }
                    None => executor.search_query(&query, shard_limit).await,
                };
                (name, result)
            });
        }

        let mut merged: HashMap<ItemId, usize> = HashMap::new();
        let mut missing = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            let Ok((name, result)) = joined else {
                // A panicked task cannot report its name; it stays in `pending`.
                continue;
            };
            pending.remove(&name);

            match result {
                Ok(hits) => {
                    for hit in hits {
                        let count = merged.entry(hit.item_id).or_default();
                        *count = (*count).max(hit.match_count);
                    }
                }
                Err(err) => self.on_shard_failure(&name, err, &mut missing)?,
            }
        }

        for name in std::mem::take(&mut pending) {
            let err = SearchError::unavailable(name.clone(), "shard task aborted");
            self.on_shard_failure(&name, err, &mut missing)?;
        }

        let mut hits: Vec<SearchHit> = merged
            .into_iter()
            .map(|(item_id, match_count)| SearchHit {
                item_id,
                match_count,
            })
            .collect();
        rank_hits(&mut hits);
        hits.truncate(limit as usize);

        missing.sort();
        Ok(RoutedResults {
            hits,
            partial: !missing.is_empty(),
            missing_partitions: missing,
            partitions_queried: targets.iter().map(|entry| entry.name.clone()).collect(),
        })
    }

    /// Strict mode turns the failure into the query's error; lenient mode records the
    /// partition as missing and carries on.
    fn on_shard_failure(
        &self,
        partition: &str,
        err: SearchError,
        missing: &mut Vec<String>,
    ) -> SearchResult<()> {
        match self.failure_policy {
            FailurePolicy::Strict => {
                tracing::error!("Partition '{}' failed: {}", partition, err);
                Err(err)
            }
            FailurePolicy::Lenient => {
                tracing::warn!(
                    "Partition '{}' failed, returning partial results: {}",
                    partition,
                    err
                );
                missing.push(partition.to_string());
                Ok(())
            }
        }
    }

    fn shard_limit(&self, limit: i64, shard_count: usize) -> i64 {
        match self.limit_policy {
            LimitPolicy::Full => limit,
            LimitPolicy::Even => {
                let shards = shard_count.max(1) as i64;
                (limit + shards - 1) / shards
            }
        }
    }
}
