use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A compiled query: tags that must all be present and tags that must all be absent.
///
/// The two sets are disjoint by construction; `Query::new` drops any negative tag that
/// is also positive, so positive always wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    positive: BTreeSet<String>,
    negative: BTreeSet<String>,
}

impl Query {
    pub fn new(positive: BTreeSet<String>, negative: BTreeSet<String>) -> Self {
        let negative = negative
            .into_iter()
            .filter(|tag| !positive.contains(tag))
            .collect();
        Self { positive, negative }
    }

    pub fn positive(&self) -> &BTreeSet<String> {
        &self.positive
    }

    pub fn negative(&self) -> &BTreeSet<String> {
        &self.negative
    }
}
