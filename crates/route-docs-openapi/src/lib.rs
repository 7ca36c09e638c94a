//! `OpenAPI` document generation for route-docs registries.
//!
//! Turns a registry [`Snapshot`](route_docs_core::Snapshot) into a
//! deterministic `OpenAPI` 3.0 JSON document:
//!
//! - [`SpecBuilder`]: the pure snapshot → document function
//! - [`DocumentBuilder`]: the trait runtimes program against
//! - [`DocumentConfig`]: `info`, `servers` and output toggles, loadable from YAML
//! - [`Manifest`]: YAML action lists for rendering documents offline
//!
//! With the `cli` feature, the `route-docs-openapi` binary renders or
//! checks manifests from the command line.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod builder;
mod config;
mod error;
mod manifest;
mod schema;

pub use builder::{DocumentBuilder, SpecBuilder, OPENAPI_VERSION};
pub use config::DocumentConfig;
pub use error::{Error, Result};
pub use manifest::{ActionSpec, Manifest};
pub use schema::ERROR_SCHEMA_NAME;
