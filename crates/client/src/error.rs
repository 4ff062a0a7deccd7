use serde_json::Value;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::gateway::session::StorageError;
use crate::gateway::GatewayError;

/// Error surfaced by API modules and stores.
///
/// Every variant carries a message fit for display; stores copy it into
/// their `error` field.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("{0}")]
    Network(String),

    /// The session was rejected. The gateway has already cleared it.
    #[error("{0}")]
    Unauthorized(String),

    /// The server rejected the input (4xx other than 401/404).
    #[error("{message}")]
    Validation { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Server(String),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Invalid(String),

    /// The response body did not have the expected shape.
    #[error("{0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled")]
    Cancelled,
}

pub const SESSION_EXPIRED: &str = "Session expired, please sign in again";

impl ApiError {
    /// Translate a gateway failure, using `fallback` when the server gave no
    /// usable message.
    pub fn from_gateway(err: GatewayError, fallback: &str) -> Self {
        tracing::debug!(status = ?err.status, message = %err.message, "Gateway request failed");

        let extracted = err.data.as_ref().and_then(extract_error_message);
        match err.status {
            None => ApiError::Network(fallback.to_string()),
            Some(401) => ApiError::Unauthorized(extracted.unwrap_or_else(|| SESSION_EXPIRED.into())),
            Some(404) => ApiError::NotFound(extracted.unwrap_or_else(|| fallback.to_string())),
            Some(status) if status >= 500 => ApiError::Server(fallback.to_string()),
            Some(status) => ApiError::Validation {
                status,
                message: extracted.unwrap_or_else(|| fallback.to_string()),
            },
        }
    }

    /// HTTP status behind the error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Picks the message a user should see from an error response body.
///
/// Field validation messages win over `detail`, which wins over
/// `error`/`message`. Fields are visited in the order the server sent them.
pub fn extract_error_message(data: &Value) -> Option<String> {
    match data {
        Value::Object(map) => {
            let field_message = map
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "detail" | "error" | "message"))
                .find_map(|(_, value)| first_message(value));
            field_message.or_else(|| {
                ["detail", "error", "message"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(first_message))
            })
        }
        Value::Array(_) => first_message(data),
        Value::String(s) => non_blank(s),
        _ => None,
    }
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Array(items) => items.iter().find_map(first_message),
        Value::Object(_) => extract_error_message(value),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Session storage failure");
        ApiError::Storage(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(&errors, &mut messages);

        let message = match messages.len() {
            0 => "Invalid input".to_string(),
            1 => messages.remove(0),
            n => format!("{} ({} more)", messages.remove(0), n - 1),
        };

        ApiError::Invalid(message)
    }
}

/// Flattens nested validation errors, ordered by field name.
fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    for (field, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(list) => out.extend(list.iter().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })),
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, out);
                }
            }
        }
    }
}
