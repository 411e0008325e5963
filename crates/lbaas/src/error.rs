//! Error types for health-monitor API operations.
//!
//! Errors are categorized so the client can decide what to retry and the
//! CLI can tell the user what to do about it.

use reconcile::ResourceIdentity;
use thiserror::Error;

/// Categories of API errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failures, timeouts, HTTP 5xx, 408 and 429 (transient, retryable)
    Network,
    /// Monitor does not exist
    NotFound,
    /// Token missing, expired or lacking permission
    Auth,
    /// Request refused by the API (bad field value, quota, conflict)
    Rejected,
    /// Response body could not be understood
    Format,
    /// Local configuration problems and everything else
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the endpoint URL and network access, then try again",
            Self::NotFound => "Run `lbmon refresh` to drop monitors deleted out-of-band",
            Self::Auth => "Export a valid token in the configured token variable",
            Self::Rejected => "Check the declared field values against the API limits",
            Self::Format => "Verify the endpoint points at a networking API",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors from the health-monitor API client and declarations.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, DNS, timeout or transient server failure
    #[error("network error: {message}")]
    Network {
        /// Detailed error message from the failed request
        message: String,
    },

    /// HTTP 404
    #[error("monitor not found")]
    NotFound,

    /// HTTP 401 / 403
    #[error("authentication failed (HTTP {status})")]
    Auth {
        /// Status code returned by the API
        status: u16,
    },

    /// Any other 4xx
    #[error("request rejected (HTTP {status})")]
    Rejected {
        /// Status code returned by the API
        status: u16,
    },

    /// Body missing an expected member or carrying the wrong JSON type
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No base URL configured for the region
    #[error("no endpoint configured for region '{0}'")]
    NoEndpoint(String),

    /// Token environment variable unset or empty
    #[error("auth token not set: environment variable {0} is empty")]
    MissingToken(String),

    /// Declared monitor fails local validation
    #[error("monitor '{name}': {message}")]
    InvalidMonitor {
        /// Monitor name from the config file
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::NotFound => ErrorCategory::NotFound,
            Error::Auth { .. } | Error::MissingToken(_) => ErrorCategory::Auth,
            Error::Rejected { .. } => ErrorCategory::Rejected,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Map an HTTP error status onto an error.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            401 | 403 => Self::Auth { status },
            408 | 429 | 500..=599 => Self::Network {
                message: format!("HTTP {status}"),
            },
            _ => Self::Rejected { status },
        }
    }

    pub(crate) fn invalid_monitor(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidMonitor {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Convert into the reconciliation core's error.
    ///
    /// A 404 becomes [`reconcile::Error::NotFound`] for `identity`; every
    /// other failure is passed through as [`reconcile::Error::Remote`] so
    /// callers can still downcast to this type.
    pub fn into_reconcile(self, identity: Option<&ResourceIdentity>) -> reconcile::Error {
        match self {
            Self::NotFound => reconcile::Error::not_found(
                identity.map(ToString::to_string).unwrap_or_default(),
            ),
            other => reconcile::Error::remote(other),
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::from_status(code),
            ureq::Error::Json(e) => Self::InvalidResponse(e.to_string()),
            err @ (ureq::Error::Timeout(_)
            | ureq::Error::Io(_)
            | ureq::Error::HostNotFound
            | ureq::Error::ConnectionFailed) => Self::Network {
                message: err.to_string(),
            },
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(Error::from_status(404), Error::NotFound));
        assert!(matches!(Error::from_status(401), Error::Auth { status: 401 }));
        assert!(matches!(Error::from_status(403), Error::Auth { status: 403 }));
        assert!(matches!(Error::from_status(409), Error::Rejected { status: 409 }));
        assert!(matches!(Error::from_status(400), Error::Rejected { status: 400 }));
        assert!(Error::from_status(503).is_retryable());
        assert!(Error::from_status(429).is_retryable());
        assert!(Error::from_status(408).is_retryable());
        assert!(!Error::from_status(400).is_retryable());
    }

    #[test]
    fn test_from_ureq_status() {
        let err: Error = ureq::Error::StatusCode(502).into();
        assert_eq!(err.category(), ErrorCategory::Network);

        let err: Error = ureq::Error::StatusCode(404).into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_from_ureq_connection_failure_is_retryable() {
        let err: Error = ureq::Error::ConnectionFailed.into();
        assert!(err.is_retryable());
        let err: Error = ureq::Error::HostNotFound.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_into_reconcile_not_found_keeps_identity() {
        let id = ResourceIdentity::new("m-7");
        let err = Error::NotFound.into_reconcile(Some(&id));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "resource not found: m-7");
    }

    #[test]
    fn test_into_reconcile_remote_downcasts() {
        let err = Error::Auth { status: 401 }.into_reconcile(None);
        let reconcile::Error::Remote(source) = err else {
            panic!("expected remote error");
        };
        let inner = source.downcast_ref::<Error>().unwrap();
        assert_eq!(inner.category(), ErrorCategory::Auth);
    }

    #[test]
    fn test_category_advice() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::NotFound,
            ErrorCategory::Auth,
            ErrorCategory::Rejected,
            ErrorCategory::Format,
            ErrorCategory::Other,
        ] {
            assert!(!category.advice().is_empty());
        }
    }
}
