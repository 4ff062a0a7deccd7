//! HTTP gateway: the single place requests leave the client.
//!
//! Attaches the bearer token, reacts to `401` by ending the session, and
//! turns every failure into a [`GatewayError`].

pub mod mock;
pub mod session;
pub mod transport;

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::navigation::{Location, Navigator};
use session::Session;
use transport::{HttpRequest, Transport};

/// Normalized failure of one gateway call.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    /// `None` when no response was received.
    pub status: Option<u16>,
    pub message: String,
    /// Response body, when there was one.
    pub data: Option<Value>,
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

pub struct HttpGateway {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
}

impl HttpGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send one request and return the response body of a 2xx reply.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(String, String)],
    ) -> Result<Value, GatewayError> {
        let request = HttpRequest {
            method: method.clone(),
            path: path.to_string(),
            query: query.to_vec(),
            body,
            bearer_token: self.session.token(),
        };

        debug!(%method, path, "Sending request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, path, error = %err, timed_out = err.timed_out, "Request failed without response");
                let message = if err.timed_out {
                    "Request timed out".to_string()
                } else {
                    err.message
                };
                return Err(GatewayError {
                    status: None,
                    message,
                    data: None,
                });
            }
        };

        if response.is_success() {
            debug!(%method, path, status = response.status, "Request succeeded");
            return Ok(response.body);
        }

        if response.status == 401 {
            warn!(%method, path, "Unauthorized response, ending session");
            self.session.clear();
            self.navigator.navigate(Location::login());
        } else {
            warn!(%method, path, status = response.status, "Request rejected");
        }

        let data = (!response.body.is_null()).then_some(response.body);
        Err(GatewayError {
            status: Some(response.status),
            message: format!("Request failed with status code {}", response.status),
            data,
        })
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, GatewayError> {
        self.send(Method::GET, path, None, query).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, GatewayError> {
        self.send(Method::POST, path, Some(body), &[]).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, GatewayError> {
        self.send(Method::PATCH, path, Some(body), &[]).await
    }
}
