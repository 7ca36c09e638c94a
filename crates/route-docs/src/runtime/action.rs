//! The action trait and the registry type it is installed into.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use bytes::Bytes;
use futures::future::BoxFuture;
use route_docs_core::{ActionDescriptor, ActionRegistry, Registrable, RegistrationId};

/// Registry of live actions, dispatching through `Weak<dyn Action>`.
pub type Registry = ActionRegistry<dyn Action>;

/// A request routed to an action.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// Request method.
    pub method: Method,
    /// Full request URI, including the query string.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Percent-decoded values captured from the path pattern placeholders.
    pub params: BTreeMap<String, String>,
    /// Buffered request body.
    pub body: Bytes,
}

/// A documented request handler.
///
/// The registry stores only a weak handle to the action; whoever installs
/// it keeps the owning [`Arc`]. Dropping that `Arc` makes the route answer
/// `404` until it is unregistered.
pub trait Action: Send + Sync + 'static {
    /// Metadata published in the registry and the generated document.
    fn descriptor(&self) -> ActionDescriptor;

    /// Handle one request.
    fn call(&self, request: ActionRequest) -> BoxFuture<'_, Response>;
}

/// Register `action` under its own descriptor.
///
/// # Errors
///
/// Fails with the registry's collision errors; nothing is registered then.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(Registry::new());
/// let users = Arc::new(UsersAction::new());
/// let id = route_docs::install(&*registry, &users)?;
/// ```
pub fn install<A, R>(registry: &R, action: &Arc<A>) -> route_docs_core::Result<RegistrationId>
where
    A: Action,
    R: Registrable<dyn Action> + ?Sized,
{
    let handle = Arc::downgrade(action) as Weak<dyn Action>;
    registry.register(action.descriptor(), handle)
}
