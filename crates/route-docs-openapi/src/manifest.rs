//! YAML action manifests.
//!
//! A manifest lists action descriptors outside of any running server, so a
//! document can be rendered (or a route table checked for collisions) at
//! build time.
//!
//! # File format
//!
//! ```yaml
//! actions:
//!   - name: get_user
//!     path: /users/{id}
//!     methods: [GET]
//!     summary: Fetch one user
//!     tags: [users]
//!     parameters:
//!       - { name: id, in: path, type: integer, required: true }
//!       - { name: fields, in: query }
//!     response:
//!       description: The user
//!       schema: { type: object }
//! ```

use std::path::Path;

use route_docs_core::{ActionDescriptor, ActionRegistry, Parameter, ResponseHint, Snapshot};
use serde::Deserialize;

use crate::error::Result;

/// A list of actions loaded from YAML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Declared actions, in file order.
    pub actions: Vec<ActionSpec>,
}

/// One manifest entry; validated into an [`ActionDescriptor`].
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    /// Unique action name.
    pub name: String,
    /// Path pattern.
    pub path: String,
    /// HTTP methods, any case.
    pub methods: Vec<String>,
    /// One-line summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Declared parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Successful response hint.
    #[serde(default)]
    pub response: Option<ResponseHint>,
}

impl ActionSpec {
    /// Validate the entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`](crate::Error::Registry) when the entry
    /// violates a descriptor invariant.
    pub fn to_descriptor(&self) -> Result<ActionDescriptor> {
        let mut builder = ActionDescriptor::builder(&self.name, &self.path)
            .methods(&self.methods)
            .parameters(self.parameters.iter().cloned());
        if let Some(summary) = &self.summary {
            builder = builder.summary(summary);
        }
        if let Some(description) = &self.description {
            builder = builder.description(description);
        }
        for tag in &self.tags {
            builder = builder.tag(tag);
        }
        if let Some(response) = &self.response {
            builder = builder.response(response.clone());
        }
        Ok(builder.build()?)
    }
}

impl Manifest {
    /// Parse a manifest from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Load a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Register every entry into a documentation-only registry.
    ///
    /// The registry has no live handlers; it exists to enforce the same
    /// uniqueness rules a server would and to produce a [`Snapshot`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry or registration collision.
    pub fn to_registry(&self) -> Result<ActionRegistry<()>> {
        let registry = ActionRegistry::new();
        for spec in &self.actions {
            registry.register(spec.to_descriptor()?, std::sync::Weak::new())?;
        }
        Ok(registry)
    }

    /// Validate and snapshot the manifest in one step.
    ///
    /// # Errors
    ///
    /// Same as [`to_registry`](Self::to_registry).
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.to_registry()?.snapshot())
    }
}
