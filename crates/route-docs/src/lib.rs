//! Self-describing action registry for Axum.
//!
//! Actions register a descriptor (path pattern, methods, parameters,
//! response hint) into a shared [`Registry`]. The registry dispatches
//! requests to them and the [`IntrospectionAction`] publishes an `OpenAPI`
//! document describing all of them, rebuilt only when the registry changes.
//!
//! # Types
//!
//! - [`Action`] / [`ActionRequest`]: the handler contract
//! - [`Registry`]: `ActionRegistry<dyn Action>`
//! - [`IntrospectionAction`] / [`IntrospectionConfig`]: the document endpoint
//! - [`router`]: the Axum [`Router`](axum::Router) front end
//! - [`DocsError`]: JSON error responses
//!
//! # Usage
//!
//! ```ignore
//! let registry = Arc::new(Registry::new());
//! let users = Arc::new(UsersAction::new());
//! route_docs::install(&*registry, &users)?;
//!
//! let config = IntrospectionConfig::load(Path::new("introspection.yaml"))?;
//! let docs = route_docs::install_introspection(&registry, &config)?;
//!
//! let app = route_docs::router(Arc::clone(&registry));
//! ```
//!
//! # Companion Crates
//!
//! | Crate                | Purpose                              |
//! |----------------------|--------------------------------------|
//! | `route-docs` (this)  | Runtime: dispatch + introspection    |
//! | `route-docs-core`    | Descriptors and the registry         |
//! | `route-docs-openapi` | Snapshot → `OpenAPI` document        |

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod runtime;

pub use runtime::*;

pub use route_docs_core;
pub use route_docs_openapi;
