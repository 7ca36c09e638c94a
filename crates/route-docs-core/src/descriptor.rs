//! Immutable metadata describing one registered action.
//!
//! A descriptor carries everything needed to document an action without
//! invoking it: its path pattern, HTTP methods, parameters and an optional
//! response hint. Descriptors are validated once, at construction, through
//! [`ActionDescriptor::builder`].

use http::Method;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pattern::PathPattern;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// A `{name}` placeholder of the path pattern.
    Path,
    /// A query-string parameter.
    Query,
    /// A field of the JSON request body.
    Body,
    /// A request header.
    Header,
}

impl ParamLocation {
    /// Lowercase name, as used in `OpenAPI` `in` fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
        }
    }
}

/// Coarse value type of a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeHint {
    /// Free text.
    #[default]
    String,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// UUID string.
    Uuid,
}

/// One declared input of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter is carried.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Whether the parameter must be present.
    #[serde(default)]
    pub required: bool,
    /// Value type.
    #[serde(default, rename = "type")]
    pub type_hint: TypeHint,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// Create a parameter with the given location and type, not required.
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParamLocation, type_hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            type_hint,
            description: None,
        }
    }

    /// Mark the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Shape of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHint {
    /// Description of the response.
    pub description: String,
    /// Media type of the body. Defaults to `application/json`.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Free-form JSON schema of the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl ResponseHint {
    /// A JSON response with the given description and no schema.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content_type: default_content_type(),
            schema: None,
        }
    }

    /// Attach a JSON schema.
    #[must_use]
    pub fn schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Override the media type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Validated, immutable metadata for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    name: String,
    path: PathPattern,
    methods: Vec<Method>,
    parameters: Vec<Parameter>,
    response: Option<ResponseHint>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

impl ActionDescriptor {
    /// Start building a descriptor for `name` served under `path`.
    #[must_use]
    pub fn builder(name: impl Into<String>, path: impl Into<String>) -> ActionDescriptorBuilder {
        ActionDescriptorBuilder {
            name: name.into(),
            path: path.into(),
            methods: Vec::new(),
            parameters: Vec::new(),
            response: None,
            summary: None,
            description: None,
            tags: Vec::new(),
        }
    }

    /// Unique action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path pattern the action is served under.
    #[must_use]
    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    /// HTTP methods, uppercase, deduplicated and sorted by name.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Declared parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Successful response hint, if any.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseHint> {
        self.response.as_ref()
    }

    /// One-line summary, if any.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Long description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Grouping tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Builder for [`ActionDescriptor`]; validation runs in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ActionDescriptorBuilder {
    name: String,
    path: String,
    methods: Vec<String>,
    parameters: Vec<Parameter>,
    response: Option<ResponseHint>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

impl ActionDescriptorBuilder {
    /// Add an HTTP method. Case-insensitive; normalized to uppercase.
    #[must_use]
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.methods.push(method.as_ref().to_string());
        self
    }

    /// Add several HTTP methods.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods
            .extend(methods.into_iter().map(|m| m.as_ref().to_string()));
        self
    }

    /// Append a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append several parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Set the response hint.
    #[must_use]
    pub fn response(mut self, response: ResponseHint) -> Self {
        self.response = Some(response);
        self
    }

    /// Set the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Validate and produce the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for a malformed path and
    /// [`Error::InvalidDescriptor`] for an empty name, no methods, an invalid
    /// method token, or two parameters sharing a name and location.
    pub fn build(self) -> Result<ActionDescriptor> {
        let invalid = |reason: String| Error::InvalidDescriptor {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        let path = PathPattern::parse(&self.path)?;

        if self.methods.is_empty() {
            return Err(invalid("at least one method is required".to_string()));
        }
        let mut methods = Vec::with_capacity(self.methods.len());
        for raw in &self.methods {
            let method = normalize_method(raw)
                .ok_or_else(|| invalid(format!("invalid HTTP method '{raw}'")))?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        for (i, param) in self.parameters.iter().enumerate() {
            if param.name.is_empty() {
                return Err(invalid("parameter name is empty".to_string()));
            }
            let repeated = self.parameters[..i]
                .iter()
                .any(|p| p.name == param.name && p.location == param.location);
            if repeated {
                return Err(invalid(format!(
                    "parameter '{}' declared twice in {}",
                    param.name,
                    param.location.as_str()
                )));
            }
            if param.location == ParamLocation::Path
                && !path.placeholders().any(|p| p == param.name)
            {
                return Err(invalid(format!(
                    "path parameter '{}' has no placeholder in '{path}'",
                    param.name
                )));
            }
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(ActionDescriptor {
            name: self.name,
            path,
            methods,
            parameters: self.parameters,
            response: self.response,
            summary: self.summary,
            description: self.description,
            tags,
        })
    }
}

/// Parse a method token case-insensitively into its uppercase form.
///
/// Returns `None` for empty or otherwise invalid tokens.
#[must_use]
pub fn normalize_method(raw: &str) -> Option<Method> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}
