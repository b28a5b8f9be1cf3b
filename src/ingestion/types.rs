//! Ingestion Data Types

use crate::search::types::ItemId;

use serde::{Deserialize, Serialize};

/// An image handed to the tagger. The core never decodes it; `location` is whatever the
/// tagger needs to find the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: ItemId,
    pub location: String,
}

impl ImageRef {
    pub fn new(id: u64, location: &str) -> Self {
        Self {
            id: ItemId(id),
            location: location.to_string(),
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Images whose tags were written to the index.
    pub processed: usize,
    pub skipped_existing: usize,
    /// Images in batches the tagger failed on.
    pub failed: Vec<ItemId>,
}
