//! Snapshot → `OpenAPI` document generation.
//!
//! [`SpecBuilder`] walks a registry [`Snapshot`] and produces a JSON
//! document. The output depends only on the snapshot contents and the
//! [`DocumentConfig`]; object keys are emitted in sorted order, so the same
//! snapshot always renders to the same bytes.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use route_docs_core::{ActionDescriptor, Method, ParamLocation, Parameter, Snapshot};
use serde_json::{json, Map, Value};

use crate::config::DocumentConfig;
use crate::error::{Error, Result};
use crate::schema;

/// `openapi` version field of generated documents.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Anything that can turn a snapshot into a serialized document.
///
/// [`SpecBuilder`] is the implementation used in production; the trait lets
/// callers wrap it, e.g. to count builds.
pub trait DocumentBuilder: Send + Sync {
    /// Render the document for `snapshot`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; [`SpecBuilder`] fails with
    /// [`Error::MalformedSnapshot`], [`Error::DuplicateOperationId`] or
    /// [`Error::Json`].
    fn render(&self, snapshot: &Snapshot) -> Result<Bytes>;
}

/// Builds `OpenAPI` documents from registry snapshots.
#[derive(Debug, Clone, Default)]
pub struct SpecBuilder {
    config: DocumentConfig,
}

impl SpecBuilder {
    /// Create a builder with the given document config.
    #[must_use]
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Document config in use.
    #[must_use]
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Build the document as a JSON value.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedSnapshot`] if two snapshot entries claim the same
    /// `(path, method)`, [`Error::DuplicateOperationId`] if two operations
    /// end up with the same `operationId`.
    pub fn build(&self, snapshot: &Snapshot) -> Result<Value> {
        let mut paths: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();
        let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut operation_ids: BTreeSet<String> = BTreeSet::new();

        for descriptor in snapshot.actions() {
            let path = descriptor.path().as_str();
            for method in descriptor.methods() {
                if !seen.insert((path, method.as_str())) {
                    return Err(Error::MalformedSnapshot {
                        path: path.to_string(),
                        method: method.as_str().to_string(),
                    });
                }
                let operation_id = operation_id(descriptor, method);
                if !operation_ids.insert(operation_id.clone()) {
                    return Err(Error::DuplicateOperationId { operation_id });
                }
                paths.entry(path).or_default().insert(
                    method.as_str().to_ascii_lowercase(),
                    self.operation(descriptor, operation_id),
                );
            }
        }

        let mut info = Map::new();
        info.insert("title".to_string(), json!(self.config.title));
        info.insert("version".to_string(), json!(self.config.version));
        if let Some(description) = &self.config.description {
            info.insert("description".to_string(), json!(description));
        }

        let mut doc = Map::new();
        doc.insert("openapi".to_string(), json!(OPENAPI_VERSION));
        doc.insert("info".to_string(), Value::Object(info));
        if !self.config.servers.is_empty() {
            let servers: Vec<Value> = self
                .config
                .servers
                .iter()
                .map(|url| json!({ "url": url }))
                .collect();
            doc.insert("servers".to_string(), Value::Array(servers));
        }
        let paths: Map<String, Value> = paths
            .into_iter()
            .map(|(path, item)| (path.to_string(), Value::Object(item)))
            .collect();
        doc.insert("paths".to_string(), Value::Object(paths));
        if self.config.error_responses {
            let mut schemas = Map::new();
            schemas.insert(
                schema::ERROR_SCHEMA_NAME.to_string(),
                schema::error_schema(),
            );
            doc.insert("components".to_string(), json!({ "schemas": schemas }));
        }

        Ok(Value::Object(doc))
    }

    /// Build and serialize the document.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build), plus [`Error::Json`] on serialization
    /// failure.
    pub fn render(&self, snapshot: &Snapshot) -> Result<Bytes> {
        let doc = self.build(snapshot)?;
        let body = if self.config.pretty {
            serde_json::to_vec_pretty(&doc)?
        } else {
            serde_json::to_vec(&doc)?
        };
        tracing::debug!(
            generation = snapshot.generation(),
            actions = snapshot.len(),
            bytes = body.len(),
            "rendered api document"
        );
        Ok(Bytes::from(body))
    }

    fn operation(&self, descriptor: &ActionDescriptor, operation_id: String) -> Value {
        let mut op = Map::new();

        op.insert("operationId".to_string(), json!(operation_id));
        if let Some(summary) = descriptor.summary() {
            op.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = descriptor.description() {
            op.insert("description".to_string(), json!(description));
        }
        if !descriptor.tags().is_empty() {
            op.insert("tags".to_string(), json!(descriptor.tags()));
        }

        let parameters = parameters(descriptor);
        if !parameters.is_empty() {
            op.insert("parameters".to_string(), Value::Array(parameters));
        }
        if let Some(body) = request_body(descriptor) {
            op.insert("requestBody".to_string(), body);
        }
        op.insert("responses".to_string(), self.responses(descriptor));

        Value::Object(op)
    }

    fn responses(&self, descriptor: &ActionDescriptor) -> Value {
        let mut responses = Map::new();

        let ok = match descriptor.response() {
            Some(hint) => {
                let mut ok = Map::new();
                ok.insert("description".to_string(), json!(hint.description));
                if let Some(body_schema) = &hint.schema {
                    ok.insert(
                        "content".to_string(),
                        schema::content(&hint.content_type, body_schema.clone()),
                    );
                }
                Value::Object(ok)
            }
            None => json!({ "description": "Successful response" }),
        };
        responses.insert("200".to_string(), ok);

        if self.config.error_responses {
            responses.insert(
                "default".to_string(),
                json!({
                    "description": "Error response",
                    "content": schema::content(
                        "application/json",
                        schema::schema_ref(schema::ERROR_SCHEMA_NAME),
                    ),
                }),
            );
        }

        Value::Object(responses)
    }
}

impl DocumentBuilder for SpecBuilder {
    fn render(&self, snapshot: &Snapshot) -> Result<Bytes> {
        SpecBuilder::render(self, snapshot)
    }
}

/// Action name, suffixed with `_<method>` when the action serves several methods.
fn operation_id(descriptor: &ActionDescriptor, method: &Method) -> String {
    if descriptor.methods().len() > 1 {
        format!(
            "{}_{}",
            descriptor.name(),
            method.as_str().to_ascii_lowercase()
        )
    } else {
        descriptor.name().to_string()
    }
}

/// Path placeholders first (in path order), then query and header
/// parameters in declaration order.
fn parameters(descriptor: &ActionDescriptor) -> Vec<Value> {
    let declared = descriptor.parameters();
    let mut out = Vec::new();

    for placeholder in descriptor.path().placeholders() {
        let param = declared
            .iter()
            .find(|p| p.location == ParamLocation::Path && p.name == placeholder);
        let mut entry = Map::new();
        entry.insert("name".to_string(), json!(placeholder));
        entry.insert("in".to_string(), json!("path"));
        entry.insert("required".to_string(), json!(true));
        match param {
            Some(param) => {
                entry.insert("schema".to_string(), schema::type_schema(param.type_hint));
                if let Some(description) = &param.description {
                    entry.insert("description".to_string(), json!(description));
                }
            }
            None => {
                entry.insert("schema".to_string(), json!({ "type": "string" }));
            }
        }
        out.push(Value::Object(entry));
    }

    out.extend(
        declared
            .iter()
            .filter(|p| matches!(p.location, ParamLocation::Query | ParamLocation::Header))
            .map(plain_parameter),
    );
    out
}

fn plain_parameter(param: &Parameter) -> Value {
    let mut entry = Map::new();
    entry.insert("name".to_string(), json!(param.name));
    entry.insert("in".to_string(), json!(param.location.as_str()));
    entry.insert("required".to_string(), json!(param.required));
    entry.insert("schema".to_string(), schema::type_schema(param.type_hint));
    if let Some(description) = &param.description {
        entry.insert("description".to_string(), json!(description));
    }
    Value::Object(entry)
}

/// Body parameters folded into one JSON object schema.
fn request_body(descriptor: &ActionDescriptor) -> Option<Value> {
    let fields: Vec<&Parameter> = descriptor
        .parameters()
        .iter()
        .filter(|p| p.location == ParamLocation::Body)
        .collect();
    if fields.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &fields {
        properties.insert(field.name.clone(), schema::property_schema(field));
        if field.required {
            required.push(json!(field.name));
        }
    }

    let mut body_schema = Map::new();
    body_schema.insert("type".to_string(), json!("object"));
    body_schema.insert("properties".to_string(), Value::Object(properties));
    let any_required = !required.is_empty();
    if any_required {
        body_schema.insert("required".to_string(), Value::Array(required));
    }

    Some(json!({
        "required": any_required,
        "content": schema::content("application/json", Value::Object(body_schema)),
    }))
}
