//! Inverted Tag Index
//!
//! The storage engine proper is an external collaborator; the executor only needs a
//! key -> posting-list lookup, expressed by the `TagIndex` trait.
//!
//! `InMemoryIndex` is the in-process implementation used for shards and tests. Posting
//! lists live behind `Arc` and are updated copy-on-write, so a reader that already holds
//! a list keeps a consistent snapshot while ingestion keeps writing.

use super::types::{CorpusStats, ItemId, ItemRecord, TagAssignment, TagCount};
use crate::error::SearchResult;

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub item_id: ItemId,
    pub confidence: f32,
}

/// Item ids carrying one tag, kept sorted by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingList {
    entries: Vec<Posting>,
}

impl PostingList {
    pub fn from_entries(mut entries: Vec<Posting>) -> Self {
        entries.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        entries.dedup_by(|a, b| a.item_id == b.item_id);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.position(item_id).is_ok()
    }

    pub fn confidence_of(&self, item_id: ItemId) -> Option<f32> {
        self.position(item_id)
            .ok()
            .map(|idx| self.entries[idx].confidence)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|posting| posting.item_id)
    }

    /// Returns `false` when the item was already present (the first assignment wins).
    pub fn insert(&mut self, item_id: ItemId, confidence: f32) -> bool {
        match self.position(item_id) {
            Ok(_) => false,
            Err(idx) => {
                self.entries.insert(
                    idx,
                    Posting {
                        item_id,
                        confidence,
                    },
                );
                true
            }
        }
    }

    pub fn remove(&mut self, item_id: ItemId) -> bool {
        match self.position(item_id) {
            Ok(idx) => {
                self.entries.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    fn position(&self, item_id: ItemId) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|posting| posting.item_id.cmp(&item_id))
    }
}

#[async_trait]
pub trait TagIndex: Send + Sync {
    /// Posting list for `tag`. Unknown tags yield an empty list, not an error.
    async fn postings(&self, tag: &str) -> SearchResult<Arc<PostingList>>;
}

pub struct InMemoryIndex {
    postings: DashMap<String, Arc<PostingList>>,
    items: DashMap<ItemId, Vec<TagAssignment>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            postings: DashMap::new(),
            items: DashMap::new(),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let index = Self::new();
        for record in records {
            index.insert_item(record);
        }
        index
    }

    /// Adds an item's tags. Tags are trimmed and lower-cased, empty ones dropped,
    /// confidence is clamped to `[0, 1]`, and a tag the item already carries is ignored.
    ///
    /// Returns the number of new assignments.
    pub fn insert_item(&self, record: ItemRecord) -> usize {
        let mut added = Vec::new();
        {
            let mut assigned = self.items.entry(record.id).or_default();
            for assignment in record.tags {
                let tag = assignment.tag.trim().to_lowercase();
                if tag.is_empty() || assigned.iter().any(|existing| existing.tag == tag) {
                    continue;
                }
                let confidence = sanitize_confidence(assignment.confidence);
                assigned.push(TagAssignment {
                    tag: tag.clone(),
                    confidence,
                });
                added.push((tag, confidence));
            }
        }

        for (tag, confidence) in &added {
            let mut posting = self.postings.entry(tag.clone()).or_default();
            Arc::make_mut(posting.value_mut()).insert(record.id, *confidence);
        }

        tracing::trace!("Indexed item {} with {} new tags", record.id, added.len());
        added.len()
    }

    /// Drops an item and its postings. Tag entries stay registered even when their
    /// posting list becomes empty.
    pub fn remove_item(&self, item_id: ItemId) -> bool {
        let Some((_, assigned)) = self.items.remove(&item_id) else {
            return false;
        };
        for assignment in assigned {
            if let Some(mut posting) = self.postings.get_mut(&assignment.tag) {
                Arc::make_mut(posting.value_mut()).remove(item_id);
            }
        }
        true
    }

    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.items.contains_key(&item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn tag_count(&self) -> usize {
        self.postings.len()
    }

    /// Tags of one item, highest confidence first.
    pub fn item_tags(&self, item_id: ItemId) -> Option<Vec<TagAssignment>> {
        let mut tags = self.items.get(&item_id)?.value().clone();
        tags.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.tag.cmp(&b.tag))
        });
        Some(tags)
    }

    pub fn posting_snapshot(&self, tag: &str) -> Arc<PostingList> {
        self.postings
            .get(tag)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Tags containing `fragment`, most used first, then alphabetically.
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<TagCount> {
        let needle = fragment.trim().to_lowercase();
        let mut matches: Vec<TagCount> = self
            .postings
            .iter()
            .filter(|entry| entry.key().contains(&needle))
            .map(|entry| TagCount {
                tag: entry.key().clone(),
                count: entry.value().len(),
            })
            .collect();
        sort_tag_counts(&mut matches);
        matches.truncate(limit);
        matches
    }

    pub fn stats(&self, top_n: usize) -> CorpusStats {
        let mut popular = self.tag_usage();
        let relation_count = popular.iter().map(|tag| tag.count).sum();
        popular.truncate(top_n);

        CorpusStats {
            item_count: self.items.len(),
            tag_count: self.postings.len(),
            relation_count,
            popular_tags: popular,
        }
    }

    /// Tag counts for every known tag, including tags whose posting list is empty.
    pub fn tag_usage(&self) -> Vec<TagCount> {
        let mut usage: Vec<TagCount> = self
            .postings
            .iter()
            .map(|entry| TagCount {
                tag: entry.key().clone(),
                count: entry.value().len(),
            })
            .collect();
        sort_tag_counts(&mut usage);
        usage
    }

    /// The full tag relation, ordered by item id.
    pub fn records(&self) -> Vec<ItemRecord> {
        let mut records: Vec<ItemRecord> = self
            .items
            .iter()
            .map(|entry| ItemRecord {
                id: *entry.key(),
                tags: entry.value().clone(),
            })
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagIndex for InMemoryIndex {
    async fn postings(&self, tag: &str) -> SearchResult<Arc<PostingList>> {
        Ok(self.posting_snapshot(tag))
    }
}

fn sanitize_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        return 1.0;
    }
    confidence.clamp(0.0, 1.0)
}

fn sort_tag_counts(counts: &mut [TagCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
}
