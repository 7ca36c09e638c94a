//! Runtime types for serving registered actions and their documentation.
//!
//! - [`Action`]: the handler trait actions implement
//! - [`install`]: registers an action under its own descriptor
//! - [`IntrospectionAction`]: serves the cached `OpenAPI` document
//! - [`router`]: Axum router dispatching through the registry
//! - [`DocsError`]: JSON error responses

mod action;
mod cache;
mod config;
mod error;
mod introspection;
mod router;

pub use action::{install, Action, ActionRequest, Registry};
pub use cache::{CachedDocument, DocumentCache};
pub use config::{DisabledStatus, IntrospectionConfig, DEFAULT_PATH};
pub use error::{status_name, DocsError};
pub use introspection::{install_introspection, IntrospectionAction, INTROSPECTION_ACTION_NAME};
pub use router::{router, MAX_BODY_BYTES};
