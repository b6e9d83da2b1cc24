//! HTTP client for the storefront API.
//!
//! Thin typed wrapper around `reqwest` that:
//! - injects the bearer token and anonymous session id from the
//!   [`LocalStore`] on every request (the server decides which one
//!   identifies the cart)
//! - unwraps the `{success, message, data, error}` envelope
//! - maps response statuses onto the [`ApiError`] taxonomy
//!
//! Every request carries the configured timeout; a hung request fails
//! like any other transport failure.

use std::sync::Arc;

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use clementine_core::ApiResponse;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::LocalStore;

/// Header carrying the anonymous session id.
const SESSION_HEADER: &str = "x-session-id";

/// Client for the storefront REST API.
///
/// Cheaply cloneable; all clones share one connection pool and one
/// local store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    store: LocalStore,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig, store: LocalStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let mut base_url = config.api_base_url.clone();
        // Url::join treats the last path segment as a file unless the
        // base ends with a slash, which would silently drop a
        // configured path prefix.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                store,
            }),
        })
    }

    /// Resolve a relative path (e.g. `api/cart`) against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Validation(format!("invalid request path {path}: {e}")))
    }

    // =========================================================================
    // Typed request helpers
    // =========================================================================

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, &[], None::<&()>).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, query, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub(crate) async fn put_no_body<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, &[], None::<&()>).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, &[], None::<&()>).await
    }

    /// DELETE where the success payload is irrelevant or absent.
    pub(crate) async fn delete_no_content(&self, path: &str) -> Result<(), ApiError> {
        self.send_raw(Method::DELETE, path, &[], None::<&()>)
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Issue a request and unwrap the envelope's `data`.
    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let (status, text) = self.send_raw(method, path, query, body).await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        // A 2xx body can still report failure through the envelope.
        envelope.into_data().map_err(|message| ApiError::Server {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| "response missing data".to_owned()),
        })
    }

    /// Issue a request, returning the raw body of a 2xx response and
    /// mapping everything else onto [`ApiError`].
    #[instrument(skip(self, body, query), fields(path = %path))]
    async fn send_raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(reqwest::StatusCode, String), ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self.inner.http.request(method, url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.inner.store.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(session_id) = self.inner.store.session_id() {
            request = request.header(SESSION_HEADER, session_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        // Read the body as text first so failures keep diagnostics.
        let text = response.text().await?;

        if status.is_success() {
            return Ok((status, text));
        }

        // Pull the server's message out of the failure envelope when
        // one was provided.
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
            .ok()
            .and_then(|envelope| envelope.failure_text().map(str::to_owned))
            .unwrap_or_default();

        tracing::debug!(status = %status, message = %message, "API request failed");

        Err(match status {
            reqwest::StatusCode::BAD_REQUEST => ApiError::Validation(message),
            reqwest::StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(message),
            other => ApiError::Server {
                status: other.as_u16(),
                message,
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> ApiClient {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(base, dir.path()).unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        ApiClient::new(&config, store).unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = client_with_base("http://localhost:4000");
        let url = client.endpoint("api/cart").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/cart");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = client_with_base("http://localhost:4000/store");
        let url = client.endpoint("api/products").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/store/api/products");
    }

    #[test]
    fn test_endpoint_tolerates_leading_slash() {
        let client = client_with_base("http://localhost:4000");
        let url = client.endpoint("/api/orders").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/orders");
    }
}
