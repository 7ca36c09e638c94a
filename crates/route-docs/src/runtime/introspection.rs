//! The introspection action: serves the `OpenAPI` document of the registry.
//!
//! On each request the action compares the registry generation with the
//! generation of its cached document. On a match the cached bytes are
//! served; otherwise a snapshot is taken, rendered and offered to the cache.
//! Concurrent misses may render in parallel; the cache keeps the result of
//! the highest generation.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::future::BoxFuture;
use route_docs_core::{ActionDescriptor, ResponseHint, SnapshotSource};
use route_docs_openapi::{DocumentBuilder, SpecBuilder};

use super::action::{install, Action, ActionRequest, Registry};
use super::cache::{CachedDocument, DocumentCache};
use super::config::IntrospectionConfig;
use super::error::DocsError;

/// Action name the introspection endpoint registers under.
pub const INTROSPECTION_ACTION_NAME: &str = "api_docs";

/// Serves a cached, generation-checked `OpenAPI` document of a registry.
pub struct IntrospectionAction<B = SpecBuilder> {
    enabled: bool,
    disabled_status: StatusCode,
    descriptor: ActionDescriptor,
    source: Arc<dyn SnapshotSource>,
    builder: B,
    cache: DocumentCache,
}

impl<B> std::fmt::Debug for IntrospectionAction<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrospectionAction")
            .field("enabled", &self.enabled)
            .field("path", &self.descriptor.path().as_str())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl IntrospectionAction<SpecBuilder> {
    /// Create the action with the standard [`SpecBuilder`].
    ///
    /// # Errors
    ///
    /// Fails when `config.path` is not a valid path pattern.
    pub fn new(
        config: &IntrospectionConfig,
        source: Arc<dyn SnapshotSource>,
    ) -> route_docs_core::Result<Self> {
        let builder = SpecBuilder::new(config.document.clone());
        Self::with_builder(config, source, builder)
    }
}

impl<B: DocumentBuilder> IntrospectionAction<B> {
    /// Create the action with a custom document builder.
    ///
    /// # Errors
    ///
    /// Fails when `config.path` is not a valid path pattern.
    pub fn with_builder(
        config: &IntrospectionConfig,
        source: Arc<dyn SnapshotSource>,
        builder: B,
    ) -> route_docs_core::Result<Self> {
        let descriptor = ActionDescriptor::builder(INTROSPECTION_ACTION_NAME, &config.path)
            .method("GET")
            .summary("OpenAPI description of every registered action")
            .tag("meta")
            .response(
                ResponseHint::new("OpenAPI document")
                    .schema(serde_json::json!({ "type": "object" })),
            )
            .build()?;

        Ok(Self {
            enabled: config.enabled,
            disabled_status: config.disabled_status.status_code(),
            descriptor,
            source,
            builder,
            cache: DocumentCache::new(),
        })
    }

    /// Whether the document is served.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Route the document is served on.
    #[must_use]
    pub fn path(&self) -> &str {
        self.descriptor.path().as_str()
    }

    /// The currently cached document, whatever its generation.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<CachedDocument>> {
        self.cache.current()
    }

    /// Produce the document body for one request.
    ///
    /// # Errors
    ///
    /// [`DocsError::NotAvailable`] while disabled (the registry is not
    /// consulted), [`DocsError::Build`] when rendering fails (the cache is
    /// left as it was).
    pub fn describe(&self) -> Result<Bytes, DocsError> {
        if !self.enabled {
            return Err(DocsError::NotAvailable(self.disabled_status));
        }

        let generation = self.source.current_generation();
        if let Some(body) = self.cache.get(generation) {
            return Ok(body);
        }

        let snapshot = self.source.snapshot();
        let body = self.builder.render(&snapshot).map_err(|err| {
            tracing::warn!(generation = snapshot.generation(), error = %err, "api document build failed");
            DocsError::from(err)
        })?;

        let stored = self.cache.store(snapshot.generation(), body.clone());
        tracing::debug!(
            generation = snapshot.generation(),
            actions = snapshot.len(),
            stored,
            "rebuilt api document"
        );
        Ok(body)
    }

    /// [`describe`](Self::describe) rendered as an HTTP response.
    pub fn respond(&self) -> Response {
        match self.describe() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(err) => err.into_response(),
        }
    }
}

impl<B: DocumentBuilder + 'static> Action for IntrospectionAction<B> {
    fn descriptor(&self) -> ActionDescriptor {
        self.descriptor.clone()
    }

    fn call(&self, _request: ActionRequest) -> BoxFuture<'_, Response> {
        let response = self.respond();
        Box::pin(futures::future::ready(response))
    }
}

/// Create the introspection action over `registry` and install it there.
///
/// The returned [`Arc`] owns the action; keep it alive for as long as the
/// route should answer.
///
/// # Errors
///
/// Fails when the configured path is invalid or already registered.
pub fn install_introspection(
    registry: &Arc<Registry>,
    config: &IntrospectionConfig,
) -> route_docs_core::Result<Arc<IntrospectionAction>> {
    let source: Arc<dyn SnapshotSource> = Arc::clone(registry) as Arc<dyn SnapshotSource>;
    let action = Arc::new(IntrospectionAction::new(config, source)?);
    install(&**registry, &action)?;
    tracing::debug!(
        path = action.path(),
        enabled = action.is_enabled(),
        "installed introspection action"
    );
    Ok(action)
}
