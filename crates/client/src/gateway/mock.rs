//! Scripted transport for development and testing.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// A canned reply for one route.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Value,
    /// Simulated latency before the reply is delivered.
    pub delay: Option<Duration>,
    /// When set, the call fails without a response.
    pub transport_error: Option<String>,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: None,
            transport_error: None,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn network_error(message: &str) -> Self {
        Self {
            status: 0,
            body: Value::Null,
            delay: None,
            transport_error: Some(message.to_string()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Transport answering from scripted per-route queues.
///
/// Responses registered for the same method and path are served in order;
/// the last one keeps being served once the queue is down to it. Unscripted
/// routes answer `404`. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` + `path`.
    pub fn on(&self, method: Method, path: &str, response: MockResponse) -> &Self {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Requests received for one route.
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<HttpRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    fn next_response(&self, method: &Method, path: &str) -> Option<MockResponse> {
        let mut routes = lock(&self.routes);
        let queue = routes.get_mut(&(method.clone(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let scripted = self.next_response(&request.method, &request.path);
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            scripted = scripted.is_some(),
            "Mock transport request"
        );
        lock(&self.requests).push(request);

        let Some(response) = scripted else {
            return Ok(HttpResponse {
                status: 404,
                body: json!({ "detail": "Not found." }),
            });
        };

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = response.transport_error {
            return Err(TransportError::new(message));
        }

        Ok(HttpResponse {
            status: response.status,
            body: response.body,
        })
    }
}
