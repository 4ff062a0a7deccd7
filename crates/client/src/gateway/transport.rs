//! HTTP transport abstraction.
//!
//! The gateway talks to the backend through the [`Transport`] trait so that
//! stores can be exercised against [`super::mock::MockTransport`] without a
//! running server.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::config::ApiConfig;

/// A request as handed to the transport. `path` is relative to the base URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer_token: Option<String>,
}

/// A response with its body parsed as JSON (`Null` when empty, a JSON string
/// when the body is not JSON).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was received.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}

/// Executes HTTP requests against the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared `reqwest` client with a fixed timeout.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for the configured backend.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method, self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        Ok(HttpResponse {
            status,
            body: parse_body(&bytes),
        })
    }
}

/// Parses a raw response body.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_parse_body_json() {
        let body = parse_body(br#"{"id": 1}"#);
        assert_eq!(body["id"], 1);
    }

    #[test]
    fn test_parse_body_empty() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
    }

    #[test]
    fn test_parse_body_plain_text() {
        assert_eq!(
            parse_body(b"Bad Gateway"),
            Value::String("Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_response_is_success() {
        let ok = HttpResponse {
            status: 204,
            body: Value::Null,
        };
        let bad = HttpResponse {
            status: 400,
            body: Value::Null,
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }

    #[test]
    fn test_reqwest_transport_url_joining() {
        let config = Config::load_for_test(&[("api.base_url", "http://localhost:8000/api/v1/")])
            .expect("Failed to load config");
        let transport = ReqwestTransport::new(&config.api).expect("Failed to build transport");
        assert_eq!(
            transport.url("/orders/"),
            "http://localhost:8000/api/v1/orders/"
        );
        assert_eq!(transport.url("cities"), "http://localhost:8000/api/v1/cities");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::new("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert!(!err.timed_out);
    }
}
