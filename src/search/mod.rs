//! Search Executor Module
//!
//! Evaluates a compiled `Query` against an inverted tag index.
//!
//! ## Overview
//! The corpus is seen as `tag -> posting list`. Postings of every positive tag are
//! intersected, then items carrying any negative tag are dropped from the surviving
//! candidates. Hits are ranked by match count, ties broken by the newest item id.
//!
//! ## Responsibilities
//! - **Indexing**: an in-process, snapshot-friendly index for shards and tests.
//! - **Evaluation**: AND over positives, NOT over negatives, bounded by `limit`.
//! - **Deadlines**: posting reads are abandoned with `Timeout` once a deadline expires.
//!
//! ## Submodules
//! - **`engine`**: `SearchExecutor`, the evaluation loop.
//! - **`index`**: the `TagIndex` seam and `InMemoryIndex`.
//! - **`types`**: item ids, hits, ranking and corpus statistics.

pub mod engine;
pub mod index;
pub mod types;

#[cfg(test)]
mod tests;
