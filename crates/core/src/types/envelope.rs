//! The JSON response envelope used by every storefront API endpoint.

use serde::{Deserialize, Serialize};

/// Wrapper around every API response body:
/// `{success, message?, data?, error?}`.
///
/// Callers unwrap `data` on success and surface `message`/`error` on
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Machine-oriented error description, present on some failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// Successful response with a message alongside the payload.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying only a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    /// The text a failure should surface to the user: `message` when
    /// present, otherwise `error`.
    #[must_use]
    pub fn failure_text(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }

    /// Unwrap the payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns the failure text (when the server provided one) if the
    /// envelope reports failure or carries no data.
    pub fn into_data(self) -> Result<T, Option<String>> {
        match self {
            Self {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            other => Err(other.failure_text().map(str::to_owned)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_roundtrip() {
        let resp = ApiResponse::ok(vec!["electronics".to_owned()]);
        let json = serde_json::to_string(&resp).unwrap();
        let parsed: ApiResponse<Vec<String>> = serde_json::from_str(&json).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data.unwrap(), vec!["electronics".to_owned()]);
    }

    #[test]
    fn test_failure_text_prefers_message() {
        let resp = ApiResponse::<()> {
            success: false,
            message: Some("Out of stock".to_owned()),
            data: None,
            error: Some("STOCK_ERROR".to_owned()),
        };
        assert_eq!(resp.failure_text(), Some("Out of stock"));
    }

    #[test]
    fn test_failure_text_falls_back_to_error() {
        let resp = ApiResponse::<()> {
            success: false,
            message: None,
            data: None,
            error: Some("STOCK_ERROR".to_owned()),
        };
        assert_eq!(resp.failure_text(), Some("STOCK_ERROR"));
    }

    #[test]
    fn test_into_data() {
        assert_eq!(ApiResponse::ok(7).into_data(), Ok(7));
        assert_eq!(
            ApiResponse::<i32>::failure("Out of stock").into_data(),
            Err(Some("Out of stock".to_owned()))
        );
        // Success without a payload is still unusable.
        let parsed: ApiResponse<i32> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(parsed.into_data(), Err(None));
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: ApiResponse<String> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.data.is_none());
        assert!(parsed.failure_text().is_none());
    }
}
