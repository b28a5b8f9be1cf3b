//! Service Boundary Tests
//!
//! ## Test Scopes
//! - **Limits**: default, clamping and rejection at the boundary.
//! - **Compilation**: inferred and caller-supplied negatives in the response.
//! - **Backends**: single index and partitioned corpus, including partial results.
//! - **Errors**: structured bodies callers can branch on.

#[cfg(test)]
mod tests {
    use crate::axes::registry::AxisRegistry;
    use crate::config::{EngineConfig, FailurePolicy};
    use crate::error::{ErrorBody, ErrorKind, SearchResult};
    use crate::partition::partitioner::CorpusPartitioner;
    use crate::partition::router::PartitionRouter;
    use crate::partition::strategy::PartitionStrategy;
    use crate::search::engine::SearchExecutor;
    use crate::search::index::{InMemoryIndex, PostingList, TagIndex};
    use crate::search::types::ItemRecord;
    use crate::service::protocol::{SearchRequest, SearchResponse};
    use crate::service::service::FacetSearchService;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn records() -> Vec<ItemRecord> {
        let mut records: Vec<ItemRecord> = (1..=120)
            .map(|id| ItemRecord::new(id, &["hands"]))
            .collect();
        records.push(ItemRecord::new(200, &["1girl", "solo", "smile"]));
        records.push(ItemRecord::new(201, &["1girl", "smile"]));
        records.push(ItemRecord::new(202, &["1girl", "solo", "monochrome"]));
        records
    }

    fn service(config: EngineConfig) -> FacetSearchService {
        FacetSearchService::single(
            config,
            Arc::new(AxisRegistry::reference()),
            Arc::new(InMemoryIndex::from_records(records())),
        )
    }

    fn result_ids(response: &SearchResponse) -> Vec<u64> {
        response.results.iter().map(|hit| hit.item_id.0).collect()
    }

    // ============================================================
    // LIMIT TESTS
    // ============================================================

    #[tokio::test]
    async fn test_missing_limit_uses_default() {
        let service = service(EngineConfig::default());

        let response = service.handle(SearchRequest::new(&["hands"])).await.unwrap();

        assert_eq!(response.count, 50);
        assert_eq!(response.results.len(), 50);
        assert_eq!(response.results[0].item_id.0, 120);
    }

    #[tokio::test]
    async fn test_oversized_limit_is_clamped() {
        let config = EngineConfig {
            max_limit: 100,
            ..EngineConfig::default()
        };
        let service = service(config);

        let response = service
            .handle(SearchRequest::new(&["hands"]).with_limit(10_000))
            .await
            .unwrap();

        assert_eq!(response.count, 100);
    }

    #[tokio::test]
    async fn test_non_positive_limit_is_rejected() {
        let service = service(EngineConfig::default());

        let err = service
            .handle(SearchRequest::new(&["hands"]).with_limit(0))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    // ============================================================
    // COMPILATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_response_carries_compiled_sets() {
        // ARRANGE
        init_tracing();
        let service = service(EngineConfig::default());

        // ACT
        let response = service
            .handle(SearchRequest::new(&["Solo", " 1girl "]))
            .await
            .unwrap();

        // ASSERT
        assert_eq!(response.positive_tags, vec!["1girl", "solo"]);
        assert!(response.negative_tags.contains(&"2girls".to_string()));
        assert!(response.negative_tags.contains(&"1boy".to_string()));
        assert_eq!(result_ids(&response), vec![202, 200]);
        assert!(!response.partial);
        assert!(uuid::Uuid::parse_str(&response.query_id).is_ok());
    }

    #[tokio::test]
    async fn test_caller_negatives_are_applied() {
        let service = service(EngineConfig::default());

        let response = service
            .handle(SearchRequest::new(&["solo", "1girl"]).with_negative(&["monochrome", "solo"]))
            .await
            .unwrap();

        assert_eq!(result_ids(&response), vec![200]);
        assert!(response.positive_tags.contains(&"solo".to_string()));
        assert!(!response.negative_tags.contains(&"solo".to_string()));
    }

    #[tokio::test]
    async fn test_contradiction_rejection_follows_config() {
        let config = EngineConfig {
            reject_contradictions: true,
            ..EngineConfig::default()
        };
        let service = service(config);

        let err = service
            .handle(SearchRequest::new(&["1girl", "3girls"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    // ============================================================
    // BACKEND TESTS
    // ============================================================

    struct DownIndex;

    #[async_trait]
    impl TagIndex for DownIndex {
        async fn postings(&self, _tag: &str) -> SearchResult<Arc<PostingList>> {
            Err(crate::error::SearchError::unavailable("multi", "unreachable"))
        }
    }

    fn partitioned_service(config: EngineConfig) -> FacetSearchService {
        let registry = Arc::new(AxisRegistry::reference());
        let partitioned = CorpusPartitioner::from_strategy(PartitionStrategy::SoloMulti, &registry)
            .unwrap()
            .partition(records());
        let shards = partitioned.shard_registry(None);
        shards.register(
            "solo_multi/multi",
            SearchExecutor::named("solo_multi/multi", Arc::new(DownIndex)),
        );
        let router = PartitionRouter::new(Arc::new(partitioned.manifest), shards);
        FacetSearchService::partitioned(config, registry, router)
    }

    #[tokio::test]
    async fn test_partitioned_lenient_response_is_labeled_partial() {
        let config = EngineConfig {
            failure_policy: FailurePolicy::Lenient,
            ..EngineConfig::default()
        };
        let service = partitioned_service(config);

        let response = service
            .handle(SearchRequest::new(&["smile"]).with_limit(5))
            .await
            .unwrap();

        assert!(response.partial);
        assert_eq!(response.missing_partitions, vec!["multi"]);
        assert_eq!(result_ids(&response), Vec::<u64>::new());
    }

    #[tokio::test]
    async fn test_partitioned_strict_is_the_default() {
        let service = partitioned_service(EngineConfig::default());

        let err = service
            .handle(SearchRequest::new(&["smile"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IndexUnavailable);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_partitioned_exclusive_route_avoids_broken_shard() {
        let service = partitioned_service(EngineConfig::default());

        let response = service
            .handle(SearchRequest::new(&["solo", "1girl"]))
            .await
            .unwrap();

        assert_eq!(result_ids(&response), vec![202, 200]);
        assert!(!response.partial);
    }

    #[test]
    fn test_load_registry_from_axes_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"axis": "cats", "tag": "1cat", "min": 1, "max": 1}}]"#
        )
        .unwrap();
        let config = EngineConfig {
            axes_path: Some(file.path().to_path_buf()),
            ..EngineConfig::default()
        };

        let registry = FacetSearchService::load_registry(&config).unwrap();

        assert!(registry.contains("1cat"));
        assert!(!registry.contains("solo"));
        assert_eq!(
            FacetSearchService::load_registry(&EngineConfig::default())
                .unwrap()
                .tag_count(),
            15
        );
    }

    // ============================================================
    // ERROR BODY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_empty_request_maps_to_structured_error() {
        let service = service(EngineConfig::default());

        let err = service
            .handle(SearchRequest::new(&["  ", ""]))
            .await
            .unwrap_err();
        let body = FacetSearchService::error_body(&err);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(body.kind, ErrorKind::InvalidQuery);
        assert_eq!(json["kind"], "invalid_query");
        assert!(json["message"].as_str().unwrap().contains("positive tag"));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"positive_tags": ["solo"]}"#).unwrap();

        assert!(request.negative_tags.is_empty());
        assert!(request.limit.is_none());
    }

    #[test]
    fn test_error_body_round_trips() {
        let body = ErrorBody {
            kind: ErrorKind::Timeout,
            message: "deadline of 5 ms exceeded".to_string(),
        };

        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains("\"timeout\""));
        assert_eq!(serde_json::from_str::<ErrorBody>(&json).unwrap(), body);
    }
}
