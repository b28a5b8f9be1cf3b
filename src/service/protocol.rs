use crate::search::types::SearchHit;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub positive_tags: Vec<String>,
    /// Merged into the inferred negatives; never overrides a positive tag.
    #[serde(default)]
    pub negative_tags: Vec<String>,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchRequest {
    pub fn new(positive_tags: &[&str]) -> Self {
        Self {
            positive_tags: positive_tags.iter().map(|tag| tag.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_negative(mut self, negative_tags: &[&str]) -> Self {
        self.negative_tags = negative_tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query_id: String,
    /// The compiled sets the results were computed from.
    pub positive_tags: Vec<String>,
    pub negative_tags: Vec<String>,
    pub results: Vec<SearchHit>,
    pub count: usize,
    pub partial: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_partitions: Vec<String>,
}
