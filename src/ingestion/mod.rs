//! Ingestion Module
//!
//! Feeds the inverted index from an external tagging oracle.
//!
//! ## Workflow
//! 1. **Dedupe**: images whose id is already indexed are skipped.
//! 2. **Tag**: the remaining images go to the `Tagger` in fixed-size batches.
//! 3. **Filter**: assignments below the confidence threshold are dropped.
//! 4. **Index**: each image's tags are written to the `InMemoryIndex`.
//!
//! A failing batch is logged and skipped; the run carries on with the next one.

pub mod pipeline;
pub mod types;
