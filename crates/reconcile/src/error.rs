//! Error types for reconciliation.
//!
//! Three outcomes matter to a caller and are kept apart:
//! local validation failures (nothing was sent), a missing remote resource
//! (changes control flow), and every other remote failure (passed through
//! untouched).

use crate::types::Phase;
use thiserror::Error;

/// Errors surfaced by the reconciliation core.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed declared input, detected before any remote call
    #[error("invalid value for '{field}': {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// The remote system has no resource with this identity
    #[error("resource not found: {identity}")]
    NotFound {
        /// Identity that was looked up
        identity: String,
    },

    /// Transport, authentication or server-side failure, passed through verbatim
    #[error("remote error: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation is not reachable from the resource's current phase
    #[error("cannot {operation} a resource that is {phase}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Phase the resource was in
        phase: Phase,
    },

    /// ForceNew fields differ; the resource must be destroyed and recreated
    #[error("replacement required, ForceNew fields changed: {}", fields.join(", "))]
    ReplacementRequired {
        /// Fields forcing the replacement
        fields: Vec<String>,
    },
}

impl Error {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(identity: impl Into<String>) -> Self {
        Self::NotFound {
            identity: identity.into(),
        }
    }

    /// Wrap any remote failure without interpreting it
    pub fn remote<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Remote(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
