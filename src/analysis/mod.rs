//! Corpus Analysis Module
//!
//! Offline reports over the tag relation, used to pick a partitioning strategy and to
//! spot tagging mistakes before a corpus is split.
//!
//! ## Submodules
//! - **`coverage`**: per-axis histograms and axis combination counts.
//! - **`integrity`**: orphan tags, untagged items and contradictory axis tagging.

pub mod coverage;
pub mod integrity;
