//! Introspection endpoint configuration loaded from YAML.
//!
//! # File format
//!
//! ```yaml
//! # Serve the document at all. Off unless set.
//! enabled: true
//!
//! # Route the document is served on.
//! path: /swagger
//!
//! # Status returned while disabled: 404 or 403.
//! disabled_status: 404
//!
//! # Document-level settings, see route_docs_openapi::DocumentConfig.
//! document:
//!   title: Inventory API
//!   version: 2.1.0
//! ```

use std::path::Path;

use axum::http::StatusCode;
use route_docs_openapi::DocumentConfig;
use serde::Deserialize;

/// Default route of the introspection endpoint.
pub const DEFAULT_PATH: &str = "/swagger";

/// Configuration of the introspection action.
///
/// `enabled` is read once when the action is constructed; changing the
/// value afterwards has no effect on a running action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IntrospectionConfig {
    /// Serve the document. Defaults to `false`.
    pub enabled: bool,

    /// Route the document is served on.
    pub path: String,

    /// Status returned while disabled.
    pub disabled_status: DisabledStatus,

    /// Document-level generation settings.
    pub document: DocumentConfig,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: DEFAULT_PATH.to_string(),
            disabled_status: DisabledStatus::default(),
            document: DocumentConfig::default(),
        }
    }
}

impl IntrospectionConfig {
    /// An enabled config with defaults for everything else.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> route_docs_openapi::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }
}

/// Status policy while introspection is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u16")]
pub enum DisabledStatus {
    /// `404 Not Found`: the endpoint looks absent.
    #[default]
    NotFound,
    /// `403 Forbidden`: the endpoint exists but is refused.
    Forbidden,
}

impl DisabledStatus {
    /// HTTP status of the policy.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl TryFrom<u16> for DisabledStatus {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            404 => Ok(Self::NotFound),
            403 => Ok(Self::Forbidden),
            other => Err(format!("disabled_status must be 404 or 403, got {other}")),
        }
    }
}
