//! HTTP error wrapper for dispatch and introspection failures.

use axum::extract::Json;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use route_docs_core::Method;

/// Errors surfaced to HTTP clients by the dispatcher and the introspection
/// action.
///
/// Every variant renders as a JSON body of the shape
///
/// ```json
/// { "error": { "code": 404, "message": "...", "status": "NOT_FOUND" } }
/// ```
///
/// which is also the `ErrorResponse` schema advertised in generated
/// documents.
///
/// # Examples
///
/// ```
/// use axum::http::StatusCode;
/// use axum::response::IntoResponse;
/// use route_docs::DocsError;
///
/// let response = DocsError::NotAvailable(StatusCode::FORBIDDEN).into_response();
/// assert_eq!(response.status(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DocsError {
    /// Introspection is disabled; carries the configured status (404 or 403).
    #[error("api documentation is not available")]
    NotAvailable(StatusCode),

    /// The document could not be built. The cache is left untouched.
    #[error("failed to build api document: {0}")]
    Build(#[from] route_docs_openapi::Error),

    /// No registered pattern matches the request path.
    #[error("no action serves {method} {path}")]
    NoRoute {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// The path is served, but not for this method.
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },

    /// The route is registered but its handler has been dropped.
    #[error("action '{name}' is no longer available")]
    Gone {
        /// Name of the unloaded action.
        name: String,
    },

    /// A captured path segment does not percent-decode to UTF-8.
    #[error("path parameter '{name}' is not valid UTF-8")]
    InvalidPathParam {
        /// Placeholder name of the offending segment.
        name: String,
    },

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),
}

impl DocsError {
    /// HTTP status the error renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotAvailable(status) => *status,
            Self::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRoute { .. } | Self::Gone { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidPathParam { .. } | Self::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// `SCREAMING_SNAKE_CASE` name of an HTTP status, e.g. `NOT_FOUND`.
#[must_use]
pub fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_ascii_uppercase()
        .replace([' ', '-'], "_")
}

impl IntoResponse for DocsError {
    fn into_response(self) -> axum::response::Response {
        let http_status = self.status();

        let body = serde_json::json!({
            "error": {
                "code": http_status.as_u16(),
                "message": self.to_string(),
                "status": status_name(http_status),
            }
        });

        let mut response = (http_status, Json(body)).into_response();
        if let Self::MethodNotAllowed { allowed, .. } = &self {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }
}
