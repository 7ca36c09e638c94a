//! Introspection endpoint behavior: caching, invalidation, disabled mode,
//! concurrency and HTTP dispatch.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use axum::body::Body;
use axum::extract::Json;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use route_docs::route_docs_core::{
    ActionDescriptor, ParamLocation, Parameter, Snapshot, SnapshotSource, TypeHint,
};
use route_docs::route_docs_openapi::{DocumentBuilder, SpecBuilder};
use route_docs::{
    install, install_introspection, router, Action, ActionRequest, DisabledStatus, DocsError,
    IntrospectionAction, IntrospectionConfig, Registry,
};

// --- fixtures ---------------------------------------------------------------

/// Echoes captured path params and the body back as JSON.
struct Echo {
    descriptor: ActionDescriptor,
}

impl Echo {
    fn new(name: &str, path: &str, methods: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            descriptor: ActionDescriptor::builder(name, path)
                .methods(methods)
                .build()
                .unwrap(),
        })
    }
}

impl Action for Echo {
    fn descriptor(&self) -> ActionDescriptor {
        self.descriptor.clone()
    }

    fn call(&self, request: ActionRequest) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            Json(json!({
                "action": self.descriptor.name(),
                "params": request.params,
                "body": String::from_utf8_lossy(&request.body),
            }))
            .into_response()
        })
    }
}

/// Wraps [`SpecBuilder`] and counts renders.
#[derive(Default)]
struct CountingBuilder {
    inner: SpecBuilder,
    builds: Arc<AtomicUsize>,
}

impl DocumentBuilder for CountingBuilder {
    fn render(&self, snapshot: &Snapshot) -> route_docs::route_docs_openapi::Result<Bytes> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.inner.render(snapshot)
    }
}

/// Always fails, as a broken registry would make the real builder do.
struct FailingBuilder;

impl DocumentBuilder for FailingBuilder {
    fn render(&self, _snapshot: &Snapshot) -> route_docs::route_docs_openapi::Result<Bytes> {
        Err(route_docs::route_docs_openapi::Error::MalformedSnapshot {
            path: "/x".to_string(),
            method: "GET".to_string(),
        })
    }
}

/// Forwards to a registry and counts snapshot calls.
struct CountingSource {
    inner: Arc<Registry>,
    snapshots: AtomicUsize,
}

impl SnapshotSource for CountingSource {
    fn current_generation(&self) -> u64 {
        self.inner.current_generation()
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        self.inner.snapshot()
    }
}

/// Installs `late` into the registry the first time a snapshot is taken,
/// either just before or just after copying the registry.
struct RegisteringSource {
    inner: Arc<Registry>,
    late: Arc<Echo>,
    after_copy: bool,
    installed: AtomicBool,
    snapshots: AtomicUsize,
}

impl RegisteringSource {
    fn new(inner: &Arc<Registry>, late: Arc<Echo>, after_copy: bool) -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::clone(inner),
            late,
            after_copy,
            installed: AtomicBool::new(false),
            snapshots: AtomicUsize::new(0),
        })
    }

    fn install_once(&self) {
        if !self.installed.swap(true, Ordering::SeqCst) {
            install(&*self.inner, &self.late).unwrap();
        }
    }
}

impl SnapshotSource for RegisteringSource {
    fn current_generation(&self) -> u64 {
        self.inner.current_generation()
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        if self.after_copy {
            let snapshot = self.inner.snapshot();
            self.install_once();
            snapshot
        } else {
            self.install_once();
            self.inner.snapshot()
        }
    }
}

fn source_of(registry: &Arc<Registry>) -> Arc<dyn SnapshotSource> {
    Arc::clone(registry) as Arc<dyn SnapshotSource>
}

fn counting_action(
    registry: &Arc<Registry>,
    config: &IntrospectionConfig,
) -> (IntrospectionAction<CountingBuilder>, Arc<AtomicUsize>) {
    let builder = CountingBuilder::default();
    let builds = Arc::clone(&builder.builds);
    let action =
        IntrospectionAction::with_builder(config, source_of(registry), builder).unwrap();
    (action, builds)
}

fn paths(body: &[u8]) -> Vec<String> {
    let doc: Value = serde_json::from_slice(body).unwrap();
    doc["paths"].as_object().unwrap().keys().cloned().collect()
}

async fn send(app: axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, Response) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    (response.status(), response)
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// --- cache ------------------------------------------------------------------

#[test]
fn repeated_describe_builds_once() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    install(&*registry, &users).unwrap();

    let (action, builds) = counting_action(&registry, &IntrospectionConfig::enabled());
    let first = action.describe().unwrap();
    let second = action.describe().unwrap();

    assert_eq!(first, second);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(action.cached().unwrap().generation, 1);
}

#[test]
fn registration_invalidates_cache() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    install(&*registry, &users).unwrap();

    let (action, builds) = counting_action(&registry, &IntrospectionConfig::enabled());
    let before = action.describe().unwrap();
    assert_eq!(paths(&before), vec!["/users"]);

    let orders = Echo::new("orders", "/orders/{id}", &["GET"]);
    install(&*registry, &orders).unwrap();

    let after = action.describe().unwrap();
    assert_eq!(paths(&after), vec!["/orders/{id}", "/users"]);
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(action.cached().unwrap().generation, 2);
}

#[test]
fn unregistration_invalidates_cache() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    let orders = Echo::new("orders", "/orders", &["GET"]);
    install(&*registry, &users).unwrap();
    let orders_id = install(&*registry, &orders).unwrap();

    let (action, builds) = counting_action(&registry, &IntrospectionConfig::enabled());
    assert_eq!(paths(&action.describe().unwrap()), vec!["/orders", "/users"]);

    registry.unregister(orders_id).unwrap();
    assert_eq!(paths(&action.describe().unwrap()), vec!["/users"]);
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_registration_keeps_cache_valid() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    install(&*registry, &users).unwrap();

    let (action, builds) = counting_action(&registry, &IntrospectionConfig::enabled());
    action.describe().unwrap();

    let clash = Echo::new("users_again", "/users", &["get"]);
    assert!(install(&*registry, &clash).is_err());

    action.describe().unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn build_failure_is_internal_error_and_leaves_cache_empty() {
    let registry = Arc::new(Registry::new());
    let action = IntrospectionAction::with_builder(
        &IntrospectionConfig::enabled(),
        source_of(&registry),
        FailingBuilder,
    )
    .unwrap();

    let err = action.describe().unwrap_err();
    assert!(matches!(err, DocsError::Build(_)), "{err:?}");
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(action.cached().is_none());
}

// --- disabled mode ----------------------------------------------------------

#[test]
fn disabled_never_snapshots() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    install(&*registry, &users).unwrap();

    let source = Arc::new(CountingSource {
        inner: Arc::clone(&registry),
        snapshots: AtomicUsize::new(0),
    });
    let action = IntrospectionAction::new(&IntrospectionConfig::default(), source.clone()).unwrap();

    for _ in 0..3 {
        let err = action.describe().unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(source.snapshots.load(Ordering::SeqCst), 0);
    assert!(action.cached().is_none());
}

#[test]
fn disabled_status_policy_is_configurable() {
    let registry = Arc::new(Registry::new());
    let config = IntrospectionConfig {
        disabled_status: DisabledStatus::Forbidden,
        ..IntrospectionConfig::default()
    };
    let action = IntrospectionAction::new(&config, source_of(&registry)).unwrap();
    assert_eq!(action.describe().unwrap_err().status(), StatusCode::FORBIDDEN);
}

#[test]
fn enabled_snapshots_once_per_generation() {
    let registry = Arc::new(Registry::new());
    let source = Arc::new(CountingSource {
        inner: Arc::clone(&registry),
        snapshots: AtomicUsize::new(0),
    });
    let action = IntrospectionAction::new(&IntrospectionConfig::enabled(), source.clone()).unwrap();

    action.describe().unwrap();
    action.describe().unwrap();
    assert_eq!(source.snapshots.load(Ordering::SeqCst), 1);
}

#[test]
fn registration_during_rebuild_is_served_without_second_build() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    install(&*registry, &users).unwrap();
    let start = registry.current_generation();

    let source = RegisteringSource::new(&registry, Echo::new("orders", "/orders", &["GET"]), false);
    let builder = CountingBuilder::default();
    let builds = Arc::clone(&builder.builds);
    let action =
        IntrospectionAction::with_builder(&IntrospectionConfig::enabled(), source.clone(), builder)
            .unwrap();

    let body = action.describe().unwrap();
    assert_eq!(registry.current_generation(), start + 1);
    assert_eq!(paths(&body), vec!["/orders", "/users"]);
    assert_eq!(action.cached().unwrap().generation, start + 1);

    assert_eq!(action.describe().unwrap(), body);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(source.snapshots.load(Ordering::SeqCst), 1);
}

#[test]
fn registration_after_snapshot_copy_triggers_rebuild() {
    let registry = Arc::new(Registry::new());
    let users = Echo::new("users", "/users", &["GET"]);
    install(&*registry, &users).unwrap();
    let start = registry.current_generation();

    let source = RegisteringSource::new(&registry, Echo::new("orders", "/orders", &["GET"]), true);
    let builder = CountingBuilder::default();
    let builds = Arc::clone(&builder.builds);
    let action =
        IntrospectionAction::with_builder(&IntrospectionConfig::enabled(), source.clone(), builder)
            .unwrap();

    let first = action.describe().unwrap();
    assert_eq!(paths(&first), vec!["/users"]);
    assert_eq!(action.cached().unwrap().generation, start);

    let second = action.describe().unwrap();
    assert_eq!(paths(&second), vec!["/orders", "/users"]);
    assert_eq!(action.cached().unwrap().generation, start + 1);
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(source.snapshots.load(Ordering::SeqCst), 2);
}

// --- concurrency ------------------------------------------------------------

#[test]
fn concurrent_describes_return_identical_bodies() {
    const CALLERS: usize = 16;

    let registry = Arc::new(Registry::new());
    let actions: Vec<Arc<Echo>> = (0..10)
        .map(|i| Echo::new(&format!("a{i}"), &format!("/a/{i}/{{id}}"), &["GET", "PUT"]))
        .collect();
    for action in &actions {
        install(&*registry, action).unwrap();
    }

    let (action, builds) = counting_action(&registry, &IntrospectionConfig::enabled());
    let barrier = Barrier::new(CALLERS);

    let bodies: Vec<Bytes> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    action.describe().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected = SpecBuilder::default().render(&registry.snapshot()).unwrap();
    for body in &bodies {
        assert_eq!(body, &expected);
    }
    let builds = builds.load(Ordering::SeqCst);
    assert!((1..=CALLERS).contains(&builds), "builds = {builds}");
    assert_eq!(action.cached().unwrap().generation, registry.current_generation());
}

// --- HTTP -------------------------------------------------------------------

#[tokio::test]
async fn document_is_served_over_http() {
    let registry = Arc::new(Registry::new());
    let orders = Arc::new(Echo {
        descriptor: ActionDescriptor::builder("get_order", "/orders/{id}")
            .method("GET")
            .parameter(Parameter::new("id", ParamLocation::Path, TypeHint::Integer))
            .build()
            .unwrap(),
    });
    install(&*registry, &orders).unwrap();
    let _docs = install_introspection(&registry, &IntrospectionConfig::enabled()).unwrap();

    let (status, response) = send(router(Arc::clone(&registry)), "GET", "/swagger", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");

    let doc = json_body(response).await;
    assert_eq!(doc["openapi"], "3.0.3");
    assert_eq!(
        doc["paths"]["/orders/{id}"]["get"]["parameters"][0]["schema"],
        json!({ "type": "integer" })
    );
    assert_eq!(doc["paths"]["/swagger"]["get"]["operationId"], "api_docs");
}

#[tokio::test]
async fn disabled_document_is_not_found_over_http() {
    let registry = Arc::new(Registry::new());
    let _docs = install_introspection(&registry, &IntrospectionConfig::default()).unwrap();

    let (status, response) = send(router(Arc::clone(&registry)), "GET", "/swagger", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "api documentation is not available");
}

#[tokio::test]
async fn custom_introspection_path() {
    let registry = Arc::new(Registry::new());
    let config = IntrospectionConfig {
        path: "/api-docs".to_string(),
        ..IntrospectionConfig::enabled()
    };
    let docs = install_introspection(&registry, &config).unwrap();
    assert_eq!(docs.path(), "/api-docs");

    let (status, _) = send(router(Arc::clone(&registry)), "GET", "/api-docs", "").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(router(Arc::clone(&registry)), "GET", "/swagger", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dispatch_passes_params_and_body() {
    let registry = Arc::new(Registry::new());
    let echo = Echo::new("echo", "/echo/{id}", &["POST"]);
    install(&*registry, &echo).unwrap();

    let (status, response) =
        send(router(Arc::clone(&registry)), "POST", "/echo/42", "hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "action": "echo", "params": { "id": "42" }, "body": "hello" })
    );
}

#[tokio::test]
async fn dispatch_percent_decodes_params() {
    let registry = Arc::new(Registry::new());
    let echo = Echo::new("user", "/users/{name}", &["GET"]);
    install(&*registry, &echo).unwrap();
    let app = router(Arc::clone(&registry));

    let (status, response) = send(app.clone(), "GET", "/users/a%20b", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(response).await["params"], json!({ "name": "a b" }));

    let (status, response) = send(app, "GET", "/users/%FF", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "path parameter 'name' is not valid UTF-8"
    );
}

#[tokio::test]
async fn head_is_served_by_get_action() {
    let registry = Arc::new(Registry::new());
    let echo = Echo::new("page", "/pages/{slug}", &["GET"]);
    install(&*registry, &echo).unwrap();
    let app = router(Arc::clone(&registry));

    let (status, _) = send(app.clone(), "HEAD", "/pages/intro", "").await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = send(app, "DELETE", "/pages/intro", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["allow"], "GET");
}

#[tokio::test]
async fn dispatch_errors() {
    let registry = Arc::new(Registry::new());
    let echo = Echo::new("echo", "/echo", &["POST", "PUT"]);
    install(&*registry, &echo).unwrap();
    let app = router(Arc::clone(&registry));

    let (status, response) = send(app.clone(), "DELETE", "/echo", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["allow"], "POST, PUT");

    let (status, response) = send(app, "GET", "/missing", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["status"], "NOT_FOUND");
}

#[tokio::test]
async fn dropped_action_answers_not_found() {
    let registry = Arc::new(Registry::new());
    let echo = Echo::new("echo", "/echo", &["GET"]);
    install(&*registry, &echo).unwrap();
    drop(echo);

    let (status, response) = send(router(Arc::clone(&registry)), "GET", "/echo", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "action 'echo' is no longer available"
    );
}

#[tokio::test]
async fn routes_installed_after_router_is_built_are_served() {
    let registry = Arc::new(Registry::new());
    let app = router(Arc::clone(&registry));

    let (status, _) = send(app.clone(), "GET", "/late", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let late = Echo::new("late", "/late", &["GET"]);
    install(&*registry, &late).unwrap();
    let (status, _) = send(app, "GET", "/late", "").await;
    assert_eq!(status, StatusCode::OK);
}
