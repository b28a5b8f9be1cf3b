//! Service Boundary Module
//!
//! The pure request/response surface a transport (HTTP, CLI, queue worker) would wrap.
//! Nothing here knows about sockets; it turns a `SearchRequest` into a `SearchResponse`
//! or a structured error.
//!
//! ## Submodules
//! - **`protocol`**: request and response DTOs.
//! - **`service`**: `FacetSearchService`, which owns config, compiler and backend.

pub mod protocol;
#[allow(clippy::module_inception)]
pub mod service;

#[cfg(test)]
mod tests;
