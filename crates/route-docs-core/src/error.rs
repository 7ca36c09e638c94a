//! Typed error enum for descriptor construction and registry operations.

use crate::registry::RegistrationId;

/// Errors produced by `route-docs-core` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A `(method, path)` pair is already registered.
    ///
    /// The registration is rejected as a whole; the caller decides whether
    /// to abort startup or skip the action.
    #[error("route {method} {path} is already registered by action '{existing}'")]
    DuplicateKey {
        /// Uppercase HTTP method of the colliding key.
        method: String,
        /// Path pattern of the colliding key.
        path: String,
        /// Name of the action that owns the key.
        existing: String,
    },

    /// An action with the same name is already registered.
    #[error("an action named '{name}' is already registered")]
    DuplicateName {
        /// The duplicated action name.
        name: String,
    },

    /// Unregister was called with an id the registry does not know.
    #[error("no registration with id {id}")]
    NotFound {
        /// The unknown registration id.
        id: RegistrationId,
    },

    /// A descriptor violates a construction invariant.
    #[error("invalid action descriptor '{name}': {reason}")]
    InvalidDescriptor {
        /// Name of the offending descriptor (may be empty).
        name: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A path pattern is malformed.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
