//! Axum integration: dispatch every request through the registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use route_docs_core::Resolution;

use super::action::{ActionRequest, Registry};
use super::error::DocsError;

/// Largest request body buffered for an action.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build a router that resolves each request against `registry`.
///
/// Routes are looked up per request, so actions installed or unregistered
/// after the router is built take effect immediately.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(Registry::new());
/// let docs = route_docs::install_introspection(&registry, &IntrospectionConfig::enabled())?;
/// let app = route_docs::router(Arc::clone(&registry));
/// ```
pub fn router(registry: Arc<Registry>) -> axum::Router {
    axum::Router::new().fallback(dispatch).with_state(registry)
}

async fn dispatch(State(registry): State<Arc<Registry>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    let resolved = match registry.resolve(parts.method.as_str(), &path) {
        Resolution::Found(resolved) => resolved,
        Resolution::Gone(descriptor) => {
            tracing::warn!(action = descriptor.name(), %path, "route handler has been dropped");
            return DocsError::Gone {
                name: descriptor.name().to_string(),
            }
            .into_response();
        }
        Resolution::MethodNotAllowed(allowed) => {
            return DocsError::MethodNotAllowed {
                method: parts.method.to_string(),
                path,
                allowed,
            }
            .into_response();
        }
        Resolution::NoRoute => {
            return DocsError::NoRoute {
                method: parts.method.to_string(),
                path,
            }
            .into_response();
        }
    };

    let params = match decode_params(resolved.params) {
        Ok(params) => params,
        Err(err) => return err.into_response(),
    };

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(err) => return DocsError::Body(err).into_response(),
    };

    tracing::debug!(action = resolved.descriptor.name(), method = %parts.method, %path, "dispatching");
    let request = ActionRequest {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        params,
        body,
    };
    resolved.handle.call(request).await
}

/// Percent-decode captured segments the way Axum's `Path` extractor does.
fn decode_params(raw: BTreeMap<String, String>) -> Result<BTreeMap<String, String>, DocsError> {
    raw.into_iter()
        .map(|(name, value)| match urlencoding::decode(&value) {
            Ok(decoded) => Ok((name, decoded.into_owned())),
            Err(_) => Err(DocsError::InvalidPathParam { name }),
        })
        .collect()
}
