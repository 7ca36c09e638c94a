//! Typed error enum for the `route-docs-openapi` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary for richer
//! context messages.

/// Errors produced by `route-docs-openapi` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading config or manifest files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The snapshot holds two operations for the same `(path, method)`.
    ///
    /// Registries never produce such snapshots; seeing this means the
    /// snapshot was assembled by hand or the registry invariant broke.
    #[error("malformed snapshot: duplicate operation {method} {path}")]
    MalformedSnapshot {
        /// Path pattern of the duplicated operation.
        path: String,
        /// Uppercase method of the duplicated operation.
        method: String,
    },

    /// Two operations in the snapshot map to the same `operationId`.
    ///
    /// Happens when a multi-method action's `<name>_<method>` id matches
    /// another action's name.
    #[error("duplicate operationId '{operation_id}'")]
    DuplicateOperationId {
        /// The colliding id.
        operation_id: String,
    },

    /// A manifest entry could not be turned into a valid descriptor or registered.
    #[error(transparent)]
    Registry(#[from] route_docs_core::Error),
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
