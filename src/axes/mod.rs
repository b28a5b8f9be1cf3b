//! Axis Registry Module
//!
//! Static definition of the semantic axes: groups of mutually exclusive count/category
//! tags (`girls`, `boys`, `solo`), each tag carrying an inclusive count `Range`.
//!
//! ## Core Concepts
//! - **Range overlap**: the compiler spares every axis tag whose range intersects one of
//!   the user's chosen ranges. Overlap inside an axis (`multiple_girls` vs `2girls`) is
//!   intended.
//! - **Typed rows**: the table is data (`AxisRow`), so deployments can ship their own
//!   schema as JSON and tests can build several registries side by side.

pub mod registry;
pub mod types;
