use super::types::{ImageRef, IngestReport};
use crate::search::index::InMemoryIndex;
use crate::search::types::{ItemId, ItemRecord, TagAssignment};

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.35;

/// External tagging oracle: one tag list per input image, in input order.
#[async_trait]
pub trait Tagger: Send + Sync {
    async fn tag(&self, batch: &[ImageRef]) -> Result<Vec<Vec<TagAssignment>>>;
}

pub struct IngestionPipeline {
    tagger: Arc<dyn Tagger>,
    index: Arc<InMemoryIndex>,
    batch_size: usize,
    min_confidence: f32,
}

impl IngestionPipeline {
    pub fn new(tagger: Arc<dyn Tagger>, index: Arc<InMemoryIndex>) -> Self {
        Self {
            tagger,
            index,
            batch_size: DEFAULT_BATCH_SIZE,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Assignments scoring below `min_confidence` are not indexed.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub async fn run(&self, images: Vec<ImageRef>) -> IngestReport {
        let mut report = IngestReport::default();
        let mut seen: HashSet<ItemId> = HashSet::new();

        let pending: Vec<ImageRef> = images
            .into_iter()
            .filter(|image| {
                let fresh = !self.index.contains_item(image.id) && seen.insert(image.id);
                if !fresh {
                    report.skipped_existing += 1;
                }
                fresh
            })
            .collect();

        let total_batches = pending.len().div_ceil(self.batch_size);
        tracing::info!(
            "Ingesting {} images in {} batches ({} already indexed)",
            pending.len(),
            total_batches,
            report.skipped_existing
        );

        for (batch_no, batch) in pending.chunks(self.batch_size).enumerate() {
            tracing::debug!("Tagging batch {}/{}", batch_no + 1, total_batches);

            let tag_lists = match self.tagger.tag(batch).await {
                Ok(tag_lists) if tag_lists.len() == batch.len() => tag_lists,
                Ok(tag_lists) => {
                    tracing::error!(
                        "Tagger returned {} results for a batch of {}, skipping batch",
                        tag_lists.len(),
                        batch.len()
                    );
                    report.failed.extend(batch.iter().map(|image| image.id));
                    continue;
                }
                Err(err) => {
                    tracing::error!("Failed to tag batch {}: {:#}", batch_no + 1, err);
                    report.failed.extend(batch.iter().map(|image| image.id));
                    continue;
                }
            };

            for (image, tags) in batch.iter().zip(tag_lists) {
                let kept: Vec<TagAssignment> = tags
                    .into_iter()
                    .filter(|assignment| assignment.confidence >= self.min_confidence)
                    .collect();
                self.index.insert_item(ItemRecord {
                    id: image.id,
                    tags: kept,
                });
                report.processed += 1;
            }
        }

        tracing::info!(
            "Ingestion finished: {} processed, {} skipped, {} failed",
            report.processed,
            report.skipped_existing,
            report.failed.len()
        );
        report
    }
}
