use super::protocol::{SearchRequest, SearchResponse};
use crate::axes::registry::AxisRegistry;
use crate::config::EngineConfig;
use crate::error::{ErrorBody, SearchError, SearchResult};
use crate::partition::router::PartitionRouter;
use crate::partition::types::RoutedResults;
use crate::query::compiler::QueryCompiler;
use crate::search::engine::SearchExecutor;
use crate::search::index::TagIndex;

use std::sync::Arc;

enum Backend {
    Single(SearchExecutor),
    Partitioned(PartitionRouter),
}

/// Compiles requests and runs them against one index or a partitioned corpus.
pub struct FacetSearchService {
    config: EngineConfig,
    compiler: QueryCompiler,
    backend: Backend,
}

impl FacetSearchService {
    /// Service over a single, unpartitioned index.
    pub fn single(
        config: EngineConfig,
        registry: Arc<AxisRegistry>,
        index: Arc<dyn TagIndex>,
    ) -> Self {
        let executor = SearchExecutor::new(index).with_deadline(config.deadline());
        Self::with_backend(config, registry, Backend::Single(executor))
    }

    /// Service over a partitioned corpus. The router picks up the configured failure
    /// policy, limit policy and deadline.
    pub fn partitioned(
        config: EngineConfig,
        registry: Arc<AxisRegistry>,
        router: PartitionRouter,
    ) -> Self {
        let router = router
            .with_failure_policy(config.failure_policy)
            .with_limit_policy(config.limit_policy)
            .with_deadline(config.deadline());
        Self::with_backend(config, registry, Backend::Partitioned(router))
    }

    fn with_backend(config: EngineConfig, registry: Arc<AxisRegistry>, backend: Backend) -> Self {
        let compiler =
            QueryCompiler::new(registry).with_contradiction_check(config.reject_contradictions);
        Self {
            config,
            compiler,
            backend,
        }
    }

    /// Axis registry named by `axes_path`, or the reference one.
    pub fn load_registry(config: &EngineConfig) -> anyhow::Result<Arc<AxisRegistry>> {
        let registry = match &config.axes_path {
            Some(path) => AxisRegistry::from_json_file(path)?,
            None => AxisRegistry::reference(),
        };
        Ok(Arc::new(registry))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn handle(&self, request: SearchRequest) -> SearchResult<SearchResponse> {
        let limit = self.resolve_limit(request.limit)?;
        let query = self
            .compiler
            .compile_with_negatives(&request.positive_tags, &request.negative_tags)?;

        let routed = match &self.backend {
            Backend::Single(executor) => RoutedResults {
                hits: executor.search_query(&query, limit).await?,
                ..RoutedResults::default()
            },
            Backend::Partitioned(router) => router.route(&query, limit).await?,
        };

        let response = SearchResponse {
            query_id: uuid::Uuid::new_v4().to_string(),
            positive_tags: query.positive().iter().cloned().collect(),
            negative_tags: query.negative().iter().cloned().collect(),
            count: routed.hits.len(),
            results: routed.hits,
            partial: routed.partial,
            missing_partitions: routed.missing_partitions,
        };

        tracing::info!(
            "Query {} {:?} returned {} results{}",
            response.query_id,
            response.positive_tags,
            response.count,
            if response.partial { " (partial)" } else { "" }
        );
        Ok(response)
    }

    /// Structured form of a failed request.
    pub fn error_body(error: &SearchError) -> ErrorBody {
        ErrorBody::from(error)
    }

    fn resolve_limit(&self, requested: Option<i64>) -> SearchResult<i64> {
        let max = self.config.max_limit as i64;
        match requested {
            None => Ok(self.config.default_limit as i64),
            Some(limit) if limit <= 0 => Err(SearchError::invalid(format!(
                "limit must be positive, got {}",
                limit
            ))),
            Some(limit) if limit > max => {
                tracing::debug!("Clamping limit {} to {}", limit, max);
                Ok(max)
            }
            Some(limit) => Ok(limit),
        }
    }
}
