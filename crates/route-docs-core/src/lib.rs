//! Action descriptors and the shared endpoint registry for the route-docs ecosystem.
//!
//! This crate holds the state every other route-docs crate agrees on:
//!
//! - [`ActionDescriptor`]: validated metadata for one action (path pattern,
//!   methods, parameters, response hint)
//! - [`ActionRegistry`]: the lock-guarded directory of installed actions,
//!   with a generation counter bumped on every mutation
//! - [`Snapshot`]: an ordered, immutable copy of the registry contents
//! - [`Registrable`] / [`SnapshotSource`]: the write and read capabilities
//!   other crates program against
//!
//! It knows nothing about HTTP request handling: the registry is generic
//! over the dispatch handle type, which the runtime crate picks.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod descriptor;
mod error;
mod pattern;
mod registry;

pub use descriptor::{
    normalize_method, ActionDescriptor, ActionDescriptorBuilder, ParamLocation, Parameter,
    ResponseHint, TypeHint,
};
pub use error::{Error, Result};
pub use pattern::PathPattern;
pub use registry::{
    ActionRegistry, Registrable, RegistrationId, Resolution, Resolved, RouteKey, Snapshot,
    SnapshotSource,
};

/// Re-exported so downstream crates name the same `Method` type.
pub use http::Method;
