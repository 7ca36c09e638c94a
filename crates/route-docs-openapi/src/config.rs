//! Document-level configuration loaded from YAML.
//!
//! Holds the knobs that shape the generated document but are not part of
//! any action descriptor: the `info` block, server URLs and output toggles.
//!
//! # File format
//!
//! ```yaml
//! title: Inventory API
//! version: 2.1.0
//! description: Internal inventory service.
//!
//! # Base URLs listed under `servers`.
//! servers:
//!   - https://inventory.example.com
//!
//! # Add a `default` error response and the shared ErrorResponse schema.
//! error_responses: true
//!
//! # Pretty-print the rendered JSON.
//! pretty: false
//! ```

use std::path::Path;

use serde::Deserialize;

/// Document-level generation config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// `info.title`.
    pub title: String,

    /// `info.version`.
    pub version: String,

    /// `info.description`.
    pub description: Option<String>,

    /// Base URLs emitted under `servers`.
    pub servers: Vec<String>,

    /// Emit a `default` error response on every operation and the
    /// `ErrorResponse` component schema.
    pub error_responses: bool,

    /// Pretty-print the rendered JSON.
    pub pretty: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            servers: Vec::new(),
            error_responses: true,
            pretty: false,
        }
    }
}

impl DocumentConfig {
    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }
}
