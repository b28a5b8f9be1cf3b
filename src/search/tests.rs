//! Search Module Tests
//!
//! Validates posting-list evaluation, ranking and the index's auxiliary surface.
//!
//! ## Test Scopes
//! - **Evaluation**: AND over positives, NOT over negatives, unknown tags.
//! - **Ranking**: match count first, newest item id on ties, limit truncation.
//! - **Failures**: invalid input, deadline expiry and unreachable storage.
//! - **Index**: normalization, suggestions, statistics and snapshot reads.

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, SearchError, SearchResult};
    use crate::search::engine::SearchExecutor;
    use crate::search::index::{InMemoryIndex, PostingList, TagIndex};
    use crate::search::types::{Deadline, ItemId, ItemRecord, SearchHit, TagAssignment, rank_hits};
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    fn executor(records: Vec<ItemRecord>) -> SearchExecutor {
        SearchExecutor::new(Arc::new(InMemoryIndex::from_records(records)))
    }

    fn ids(hits: &[SearchHit]) -> Vec<u64> {
        hits.iter().map(|hit| hit.item_id.0).collect()
    }

    /// Answers every lookup only after `delay`.
    struct SlowIndex {
        inner: InMemoryIndex,
        delay: Duration,
    }

    #[async_trait]
    impl TagIndex for SlowIndex {
        async fn postings(&self, tag: &str) -> SearchResult<Arc<PostingList>> {
            tokio::time::sleep(self.delay).await;
            self.inner.postings(tag).await
        }
    }

    struct UnavailableIndex;

    #[async_trait]
    impl TagIndex for UnavailableIndex {
        async fn postings(&self, _tag: &str) -> SearchResult<Arc<PostingList>> {
            Err(SearchError::unavailable("disk-0", "connection refused"))
        }
    }

    // ============================================================
    // EVALUATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_negative_tag_excludes_item() {
        // ARRANGE
        let executor = executor(vec![
            ItemRecord::new(1, &["1girl"]),
            ItemRecord::new(2, &["1girl", "solo"]),
        ]);

        // ACT
        let hits = executor
            .search(&set(&["1girl"]), &set(&["solo"]), 10)
            .await
            .unwrap();

        // ASSERT
        assert_eq!(
            hits,
            vec![SearchHit {
                item_id: ItemId(1),
                match_count: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_every_positive_tag_is_required() {
        let executor = executor(vec![
            ItemRecord::new(1, &["2girls", "1boy", "hands"]),
            ItemRecord::new(2, &["2girls"]),
            ItemRecord::new(3, &["1boy", "hands"]),
        ]);

        let hits = executor
            .search(&set(&["2girls", "1boy"]), &BTreeSet::new(), 10)
            .await
            .unwrap();

        assert_eq!(ids(&hits), vec![1]);
        assert_eq!(hits[0].match_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_positive_tag_yields_empty_result() {
        let executor = executor(vec![ItemRecord::new(1, &["1girl"])]);

        let hits = executor
            .search(&set(&["1girl", "no_such_tag"]), &BTreeSet::new(), 10)
            .await
            .unwrap();

        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_negative_tag_is_ignored() {
        let executor = executor(vec![ItemRecord::new(1, &["1girl"])]);

        let hits = executor
            .search(&set(&["1girl"]), &set(&["no_such_tag"]), 10)
            .await
            .unwrap();

        assert_eq!(ids(&hits), vec![1]);
    }

    #[tokio::test]
    async fn test_search_query_uses_compiled_sets() {
        use crate::axes::registry::AxisRegistry;
        use crate::query::compiler::QueryCompiler;

        let compiler = QueryCompiler::new(Arc::new(AxisRegistry::reference()));
        let query = compiler.compile(["2girls", "1boy"]).unwrap();
        let executor = executor(vec![
            ItemRecord::new(1, &["2girls", "1boy"]),
            ItemRecord::new(2, &["2girls", "1boy", "multiple_girls"]),
            ItemRecord::new(3, &["2girls", "1boy", "solo"]),
            ItemRecord::new(4, &["2girls", "1boy", "2boys"]),
        ]);

        let hits = executor.search_query(&query, 10).await.unwrap();

        // multiple_girls is range-compatible and stays allowed.
        assert_eq!(ids(&hits), vec![2, 1]);
    }

    // ============================================================
    // RANKING TESTS
    // ============================================================

    #[tokio::test]
    async fn test_ties_are_broken_by_newest_id() {
        let executor = executor(vec![
            ItemRecord::new(3, &["hands"]),
            ItemRecord::new(10, &["hands"]),
            ItemRecord::new(7, &["hands"]),
        ]);

        let hits = executor
            .search(&set(&["hands"]), &BTreeSet::new(), 10)
            .await
            .unwrap();

        assert_eq!(ids(&hits), vec![10, 7, 3]);
    }

    #[tokio::test]
    async fn test_limit_truncates_after_ranking() {
        let records = (1..=20).map(|id| ItemRecord::new(id, &["smile"])).collect();
        let executor = executor(records);

        let hits = executor
            .search(&set(&["smile"]), &BTreeSet::new(), 3)
            .await
            .unwrap();

        assert_eq!(ids(&hits), vec![20, 19, 18]);
    }

    #[test]
    fn test_rank_hits_orders_by_match_count_then_id() {
        let mut hits = vec![
            SearchHit {
                item_id: ItemId(9),
                match_count: 1,
            },
            SearchHit {
                item_id: ItemId(2),
                match_count: 3,
            },
            SearchHit {
                item_id: ItemId(5),
                match_count: 3,
            },
        ];

        rank_hits(&mut hits);

        assert_eq!(ids(&hits), vec![5, 2, 9]);
    }

    // ============================================================
    // FAILURE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_empty_positive_set_is_invalid() {
        let executor = executor(vec![ItemRecord::new(1, &["1girl"])]);

        let err = executor
            .search(&BTreeSet::new(), &set(&["solo"]), 10)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[tokio::test]
    async fn test_non_positive_limit_is_invalid() {
        let executor = executor(vec![ItemRecord::new(1, &["1girl"])]);

        for limit in [0, -5] {
            let err = executor
                .search(&set(&["1girl"]), &BTreeSet::new(), limit)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidQuery);
        }
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_a_timeout() {
        // ARRANGE
        let index = SlowIndex {
            inner: InMemoryIndex::from_records(vec![ItemRecord::new(1, &["1girl"])]),
            delay: Duration::from_millis(500),
        };
        let executor = SearchExecutor::named("slow", Arc::new(index));

        // ACT
        let err = executor
            .search_until(
                &set(&["1girl"]),
                &BTreeSet::new(),
                10,
                Some(Deadline::after(Duration::from_millis(20))),
            )
            .await
            .unwrap_err();

        // ASSERT
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());
        assert!(matches!(err, SearchError::Timeout { deadline_ms: 20 }));
    }

    #[tokio::test]
    async fn test_default_deadline_applies_to_plain_search() {
        let index = SlowIndex {
            inner: InMemoryIndex::new(),
            delay: Duration::from_millis(500),
        };
        let executor = SearchExecutor::new(Arc::new(index))
            .with_deadline(Some(Duration::from_millis(10)));

        let err = executor
            .search(&set(&["1girl"]), &BTreeSet::new(), 10)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_generous_deadline_completes() {
        let index = SlowIndex {
            inner: InMemoryIndex::from_records(vec![ItemRecord::new(4, &["1girl"])]),
            delay: Duration::from_millis(5),
        };
        let executor = SearchExecutor::new(Arc::new(index));

        let hits = executor
            .search_until(
                &set(&["1girl"]),
                &set(&["solo"]),
                10,
                Some(Deadline::after(Duration::from_secs(5))),
            )
            .await
            .unwrap();

        assert_eq!(ids(&hits), vec![4]);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_unchanged() {
        let executor = SearchExecutor::named("disk-0", Arc::new(UnavailableIndex));

        let err = executor
            .search(&set(&["1girl"]), &BTreeSet::new(), 10)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IndexUnavailable);
        assert!(err.to_string().contains("disk-0"));
    }

    // ============================================================
    // INDEX TESTS
    // ============================================================

    #[test]
    fn test_insert_item_normalizes_and_dedupes() {
        let index = InMemoryIndex::new();

        let added = index.insert_item(ItemRecord {
            id: ItemId(1),
            tags: vec![
                TagAssignment::with_confidence(" Solo ", 0.9),
                TagAssignment::with_confidence("solo", 0.2),
                TagAssignment::with_confidence("hands", 7.0),
                TagAssignment::new("  "),
            ],
        });

        assert_eq!(added, 2);
        let tags = index.item_tags(ItemId(1)).unwrap();
        assert_eq!(tags[0].tag, "hands");
        assert_eq!(tags[0].confidence, 1.0);
        assert_eq!(tags[1].tag, "solo");
        assert!((tags[1].confidence - 0.9).abs() < f32::EPSILON);

        let solo = index.posting_snapshot("solo");
        assert_eq!(solo.len(), 1);
        assert_eq!(solo.confidence_of(ItemId(1)), Some(0.9));
        assert_eq!(solo.confidence_of(ItemId(2)), None);
        assert_eq!(index.posting_snapshot("hands").confidence_of(ItemId(1)), Some(1.0));
    }

    #[test]
    fn test_posting_lists_stay_sorted() {
        let index = InMemoryIndex::from_records(vec![
            ItemRecord::new(30, &["hands"]),
            ItemRecord::new(10, &["hands"]),
            ItemRecord::new(20, &["hands"]),
        ]);

        let postings = index.posting_snapshot("hands");

        let ordered: Vec<u64> = postings.item_ids().map(|id| id.0).collect();
        assert_eq!(ordered, vec![10, 20, 30]);
    }

    #[test]
    fn test_remove_item_keeps_empty_tag_entry() {
        let index = InMemoryIndex::from_records(vec![ItemRecord::new(1, &["rare", "hands"])]);

        assert!(index.remove_item(ItemId(1)));
        assert!(!index.remove_item(ItemId(1)));

        assert!(!index.contains_item(ItemId(1)));
        assert_eq!(index.tag_count(), 2);
        assert!(index.posting_snapshot("rare").is_empty());
    }

    #[test]
    fn test_snapshot_survives_concurrent_write() {
        let index = InMemoryIndex::from_records(vec![ItemRecord::new(1, &["hands"])]);
        let before = index.posting_snapshot("hands");

        index.insert_item(ItemRecord::new(2, &["hands"]));

        assert_eq!(before.len(), 1);
        assert_eq!(index.posting_snapshot("hands").len(), 2);
    }

    #[test]
    fn test_suggest_orders_by_usage_then_name() {
        let index = InMemoryIndex::from_records(vec![
            ItemRecord::new(1, &["2girls", "multiple_girls"]),
            ItemRecord::new(2, &["2girls", "1girl"]),
            ItemRecord::new(3, &["1girl"]),
            ItemRecord::new(4, &["hands"]),
        ]);

        let suggestions = index.suggest("GIRL", 2);

        let names: Vec<&str> = suggestions.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(names, vec!["1girl", "2girls"]);
        assert_eq!(suggestions[0].count, 2);
    }

    #[test]
    fn test_stats_counts_relations() {
        let index = InMemoryIndex::from_records(vec![
            ItemRecord::new(1, &["solo", "1girl"]),
            ItemRecord::new(2, &["1girl"]),
        ]);

        let stats = index.stats(1);

        assert_eq!(stats.item_count, 2);
        assert_eq!(stats.tag_count, 2);
        assert_eq!(stats.relation_count, 3);
        assert_eq!(stats.popular_tags.len(), 1);
        assert_eq!(stats.popular_tags[0].tag, "1girl");
    }

    #[test]
    fn test_records_are_ordered_by_id() {
        let index = InMemoryIndex::from_records(vec![
            ItemRecord::new(5, &["a"]),
            ItemRecord::new(2, &["b"]),
        ]);

        let records = index.records();

        assert_eq!(records[0].id, ItemId(2));
        assert!(records[1].has_tag("a"));
    }

    #[test]
    fn test_tag_assignment_confidence_defaults_to_one() {
        let assignment: TagAssignment = serde_json::from_str(r#"{"tag": "solo"}"#).unwrap();

        assert_eq!(assignment.confidence, 1.0);
    }
}
