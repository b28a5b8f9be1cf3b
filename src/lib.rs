//! Faceted Tag Search Library
//!
//! Answers "items with tags X but not Y" over a tagged image corpus, where some tags
//! form mutually exclusive count axes (`girls`, `boys`, `solo`). A handful of chosen
//! tags is compiled into a complete positive/negative query, evaluated over an inverted
//! index, optionally across a corpus partitioned by facet value.
//!
//! ## Architecture Modules
//!
//! - **`axes`**: the immutable axis registry and its count-range semantics.
//! - **`query`**: normalization and the axis-driven negative inference.
//! - **`search`**: the inverted index seam and the ranked AND/NOT executor.
//! - **`partition`**: offline facet partitioning, shard registry and the fan-out router.
//! - **`analysis`**: axis coverage and integrity reports over the tag relation.
//! - **`ingestion`**: batches images through an external tagger into the index.
//! - **`service`**: the request/response boundary a transport would wrap.
//! - **`config`** / **`error`**: engine configuration and the error taxonomy.

pub mod analysis;
pub mod axes;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod partition;
pub mod query;
pub mod search;
pub mod service;
