//! Domain API modules: stateless translation between domain calls and
//! gateway requests.

pub mod auth;
pub mod locations;
pub mod notifications;
pub mod reports;
pub mod requests;
pub mod users;
pub(crate) mod wire;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use wire::ListEnvelope;

pub use auth::AuthApi;
pub use locations::LocationsApi;
pub use notifications::NotificationsApi;
pub use reports::ReportsApi;
pub use requests::RequestsApi;
pub use users::UsersApi;

pub(crate) fn decode<T: DeserializeOwned>(body: Value, fallback: &str) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| {
        tracing::error!(error = %e, "Unexpected response shape");
        ApiError::Decode(fallback.to_string())
    })
}

pub(crate) fn decode_list<T: DeserializeOwned>(
    body: Value,
    fallback: &str,
) -> Result<Vec<T>, ApiError> {
    decode::<ListEnvelope<T>>(body, fallback).map(ListEnvelope::into_items)
}

pub(crate) fn encode<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Invalid(e.to_string()))
}
