//! HTTP client abstraction for testability.
//!
//! Both the imagery providers and the detection client talk to their services
//! through [`AsyncHttpClient`], so tests can inject mocks instead of touching
//! the network.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from HTTP transport.
#[derive(Debug, Error, Clone)]
pub enum HttpError {
    /// Request failed at the transport level (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The response status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// Response body could not be read.
    #[error("failed to read response: {0}")]
    Body(String),
}

/// Trait for async HTTP operations.
///
/// Methods return `impl Future + Send` so callers can drive requests from
/// spawned tasks regardless of the concrete client type.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an HTTP GET request, returning the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an HTTP POST with a JSON body, returning the response body.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_body(response: reqwest::Response, url: &str) -> Result<Vec<u8>, HttpError> {
        if !response.status().is_success() {
            return Err(HttpError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| HttpError::Body(e.to_string()))
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Self::read_body(response, url).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| HttpError::Transport(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Self::read_body(response, url).await
    }
}

#[cfg(test)]
pub use tests::MockAsyncHttpClient;

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Mock HTTP client returning canned responses.
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, HttpError>,
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, _url: &str) -> Result<Vec<u8>, HttpError> {
            self.response.clone()
        }

        async fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> Result<Vec<u8>, HttpError> {
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient {
            response: Ok(vec![1, 2, 3, 4]),
        };

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockAsyncHttpClient {
            response: Err(HttpError::Status {
                status: 503,
                url: "http://example.com".to_string(),
            }),
        };

        let result = mock.post_json("http://example.com", &serde_json::json!({})).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_http_error_display() {
        let err = HttpError::Status {
            status: 404,
            url: "http://example.com/tile".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://example.com/tile");
    }
}
