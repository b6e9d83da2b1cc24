//! Typed error taxonomy for API-calling operations.
//!
//! Every function that talks to the storefront API returns
//! `Result<T, ApiError>` with an explicit error kind, so callers
//! match on variants instead of probing loosely-typed response
//! shapes.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by API-calling operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected before any network call (form-level validation).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server answered 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server answered 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response, carrying the server's message when
    /// one was provided.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never completed (DNS, connection, TLS, ...).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout. Treated exactly
    /// like a transport failure.
    #[error("request timed out")]
    Timeout,

    /// A 2xx body that did not match the expected shape.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The local state file could not be read or written.
    #[error("local storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// The server-supplied message for this failure, if any. Feeds
    /// notification text; callers fall back to a per-operation
    /// default when this is `None`.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Server { message: msg, .. } => {
                if msg.is_empty() { None } else { Some(msg) }
            }
            _ => None,
        }
    }

    /// Whether this failure means "no cart exists yet" on a cart
    /// fetch: 404 (no cart) and 401 (anonymous visitor) are normal
    /// absence, not errors.
    #[must_use]
    pub const fn is_cart_absence(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

/// Result type alias for API-calling operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let err = ApiError::Server {
            status: 500,
            message: "Inventory offline".to_owned(),
        };
        assert_eq!(err.server_message(), Some("Inventory offline"));

        let err = ApiError::Timeout;
        assert_eq!(err.server_message(), None);

        let err = ApiError::NotFound(String::new());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_cart_absence_classification() {
        assert!(ApiError::NotFound("no cart".to_owned()).is_cart_absence());
        assert!(ApiError::Unauthorized("anonymous".to_owned()).is_cart_absence());
        assert!(
            !ApiError::Server {
                status: 500,
                message: String::new()
            }
            .is_cart_absence()
        );
        assert!(!ApiError::Timeout.is_cart_absence());
    }

    #[test]
    fn test_display() {
        let err = ApiError::Validation("email must contain an @ symbol".to_owned());
        assert_eq!(
            err.to_string(),
            "validation failed: email must contain an @ symbol"
        );
    }
}
