//! Query Compiler Module
//!
//! Turns a handful of user-chosen positive tags into a complete, contradiction-free
//! `(positive, negative)` pair.
//!
//! ## Responsibilities
//! - **Normalization**: trimming, lower-casing and de-duplicating raw tag input.
//! - **Inference**: per axis, negating every tag whose range cannot coexist with the
//!   chosen ones, and negating a whole axis the caller left out.
//! - **Merging**: folding caller-supplied negatives in without ever negating a positive.
//!
//! ## Submodules
//! - **`normalize`**: raw string handling.
//! - **`compiler`**: the axis-driven inference.
//! - **`types`**: the `Query` value handed to the executor and router.

pub mod compiler;
pub mod normalize;
pub mod types;
