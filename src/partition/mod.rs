//! Partition Module
//!
//! Facet-based sharding of the corpus and the router that queries those shards.
//!
//! ## Core Concepts
//! - **Manifest**: an ordered list of `{name, predicate, shard_locator}` entries. The
//!   predicate is a pure tag-set test, so routing never touches an index.
//! - **Partitioner** (offline): assigns every item to the first matching entry and builds
//!   one shard-local index per partition.
//! - **Router** (online): sends a compiled query to the single partition its positive tags
//!   pin down, or fans out to all of them and merges by `(match_count desc, id desc)`.
//! - **Failure policy**: strict fails the query with the shard's error, lenient returns
//!   the reachable partitions' hits flagged as partial.
//!
//! Exclusive routing relies on compiled queries: a compiled query negates every axis the
//! caller left out, so items of other partitions cannot match it.
//!
//! ## Submodules
//! - **`types`**: manifest, predicates and routed results.
//! - **`strategy`**: the `solo_multi` and `detailed` manifests.
//! - **`partitioner`**: the offline split.
//! - **`registry`**: shard locator -> executor lookup.
//! - **`router`**: dispatch, scatter/gather and merge.

pub mod partitioner;
pub mod registry;
pub mod router;
pub mod strategy;
pub mod types;
