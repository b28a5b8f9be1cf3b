use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::{Duration, Instant};

/// Stable item identifier. Larger ids are newer, which is what the tie-break relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tag assigned to an item, with the tagger's confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAssignment {
    pub tag: String,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

impl TagAssignment {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            confidence: default_confidence(),
        }
    }

    pub fn with_confidence(tag: &str, confidence: f32) -> Self {
        Self {
            tag: tag.to_string(),
            confidence,
        }
    }
}

fn default_confidence() -> f32 {
    1.0
}

/// An item together with every tag assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub tags: Vec<TagAssignment>,
}

impl ItemRecord {
    pub fn new(id: u64, tags: &[&str]) -> Self {
        Self {
            id: ItemId(id),
            tags: tags.iter().map(|tag| TagAssignment::new(tag)).collect(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|assignment| assignment.tag == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    pub item_id: ItemId,
    pub match_count: usize,
}

/// Orders hits by `match_count` descending, then item id descending (newest first).
pub fn rank_hits(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| {
        b.match_count
            .cmp(&a.match_count)
            .then_with(|| b.item_id.cmp(&a.item_id))
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub item_count: usize,
    pub tag_count: usize,
    pub relation_count: usize,
    pub popular_tags: Vec<TagCount>,
}

/// Absolute point in time after which posting-list reads are abandoned.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn budget_ms(&self) -> u64 {
        self.budget.as_millis() as u64
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}
