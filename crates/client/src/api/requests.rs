use std::sync::Arc;

use tracing::info;
use validator::Validate;

use domain::models::{
    CreateRequestData, RequestFilters, RequestId, RequestStatus, ServiceRequest, UserId,
};
use shared::validation::{normalize_phone, validate_not_blank};

use super::wire::{AssignBody, BlacklistBody, ServerOrder, StatusBody};
use super::{decode, decode_list, encode};
use crate::error::ApiError;
use crate::gateway::HttpGateway;

pub const LIST_FAILED: &str = "Failed to load requests";
pub const CREATE_FAILED: &str = "Failed to create request";
pub const ASSIGN_FAILED: &str = "Failed to assign request";
pub const STATUS_FAILED: &str = "Failed to update request status";
pub const BLACKLIST_FAILED: &str = "Failed to add client to blacklist";
pub const DETAILS_FAILED: &str = "Failed to load request details";

/// Service request endpoints (`/orders/`).
#[derive(Clone)]
pub struct RequestsApi {
    gateway: Arc<HttpGateway>,
}

impl RequestsApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, filters: &RequestFilters) -> Result<Vec<ServiceRequest>, ApiError> {
        let body = self
            .gateway
            .get("/orders/", &filters.to_query())
            .await
            .map_err(|e| ApiError::from_gateway(e, LIST_FAILED))?;
        let orders: Vec<ServerOrder> = decode_list(body, LIST_FAILED)?;
        Ok(orders.into_iter().map(ServiceRequest::from).collect())
    }

    /// Validates `data` locally, normalizes the phone and creates the request.
    pub async fn create(&self, data: &CreateRequestData) -> Result<ServiceRequest, ApiError> {
        data.validate()?;

        let mut payload = data.clone();
        if let Some(phone) = normalize_phone(&payload.phone) {
            payload.phone = phone;
        }

        let body = self
            .gateway
            .post("/orders/", encode(&payload)?)
            .await
            .map_err(|e| ApiError::from_gateway(e, CREATE_FAILED))?;
        let created: ServiceRequest = decode::<ServerOrder>(body, CREATE_FAILED)?.into();
        info!(request_id = created.id, "Request created");
        Ok(created)
    }

    pub async fn assign(
        &self,
        id: RequestId,
        manager_id: UserId,
        force: bool,
    ) -> Result<ServiceRequest, ApiError> {
        let body = self
            .gateway
            .patch(
                &format!("/orders/{}/assign/", id),
                encode(&AssignBody { manager_id, force })?,
            )
            .await
            .map_err(|e| ApiError::from_gateway(e, ASSIGN_FAILED))?;
        Ok(decode::<ServerOrder>(body, ASSIGN_FAILED)?.into())
    }

    pub async fn update_status(
        &self,
        id: RequestId,
        status: RequestStatus,
        comment: Option<&str>,
    ) -> Result<ServiceRequest, ApiError> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let body = self
            .gateway
            .patch(
                &format!("/orders/{}/status/", id),
                encode(&StatusBody { status, comment })?,
            )
            .await
            .map_err(|e| ApiError::from_gateway(e, STATUS_FAILED))?;
        Ok(decode::<ServerOrder>(body, STATUS_FAILED)?.into())
    }

    /// The backend requires a reason; a blank one is rejected before sending.
    pub async fn blacklist(&self, id: RequestId, reason: &str) -> Result<ServiceRequest, ApiError> {
        if validate_not_blank(reason).is_err() {
            return Err(ApiError::Invalid(
                "A reason is required to blacklist a client".to_string(),
            ));
        }
        let body = self
            .gateway
            .post(
                &format!("/orders/{}/blacklist/", id),
                encode(&BlacklistBody {
                    reason: reason.trim(),
                })?,
            )
            .await
            .map_err(|e| ApiError::from_gateway(e, BLACKLIST_FAILED))?;
        Ok(decode::<ServerOrder>(body, BLACKLIST_FAILED)?.into())
    }

    pub async fn details(&self, id: RequestId) -> Result<ServiceRequest, ApiError> {
        let body = self
            .gateway
            .get(&format!("/orders/{}/", id), &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, DETAILS_FAILED))?;
        Ok(decode::<ServerOrder>(body, DETAILS_FAILED)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::gateway::mock::{MockResponse, MockTransport};
    use domain::models::{AddressInput, RequestPriority};
    use reqwest::Method;
    use serde_json::json;

    fn api() -> (Arc<MockTransport>, RequestsApi) {
        let (transport, gateway) = test_support::gateway();
        (transport, RequestsApi::new(gateway))
    }

    fn create_data(phone: &str) -> CreateRequestData {
        CreateRequestData {
            client_name: "Anna Volkova".to_string(),
            phone: phone.to_string(),
            address: AddressInput {
                city: "Kazan".to_string(),
                city_id: Some(3),
                street: "Baumana".to_string(),
                house: "5".to_string(),
                building: String::new(),
                apartment: "12".to_string(),
            },
            comment: String::new(),
            priority: RequestPriority::Normal,
        }
    }

    #[tokio::test]
    async fn test_list_sends_filters_as_query() {
        let (transport, api) = api();
        transport.on(
            Method::GET,
            "/orders/",
            MockResponse::ok(json!([{"id": "1", "status": "unassigned"}])),
        );
        let filters = RequestFilters {
            status: Some(RequestStatus::Unassigned),
            ..Default::default()
        };

        let requests = api.list(&filters).await.unwrap();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, 1);
        assert_eq!(
            transport.requests()[0].query,
            vec![("status".to_string(), "unassigned".to_string())]
        );
    }

    #[tokio::test]
    async fn test_list_malformed_body() {
        let (transport, api) = api();
        transport.on(Method::GET, "/orders/", MockResponse::ok(json!({"oops": true})));

        let err = api.list(&RequestFilters::default()).await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.message(), LIST_FAILED);
    }

    #[tokio::test]
    async fn test_create_normalizes_phone() {
        let (transport, api) = api();
        transport.on(
            Method::POST,
            "/orders/",
            MockResponse::json(201, json!({"id": 10, "phone": "+79991234567"})),
        );

        let created = api.create(&create_data("8 (999) 123-45-67")).await.unwrap();

        assert_eq!(created.id, 10);
        let sent = transport.requests_to(&Method::POST, "/orders/");
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body["phone"], "+79991234567");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_without_request() {
        let (transport, api) = api();

        let err = api.create(&create_data("12345")).await.unwrap_err();

        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_assign_body_and_error_message() {
        let (transport, api) = api();
        transport.on(
            Method::PATCH,
            "/orders/5/assign/",
            MockResponse::json(400, json!({"detail": "Manager is at capacity"})),
        );

        let err = api.assign(5, 3, true).await.unwrap_err();

        assert_eq!(err.message(), "Manager is at capacity");
        let sent = transport.requests_to(&Method::PATCH, "/orders/5/assign/");
        assert_eq!(sent[0].body, Some(json!({"manager_id": 3, "force": true})));
    }

    #[tokio::test]
    async fn test_update_status_omits_blank_comment() {
        let (transport, api) = api();
        transport.on(
            Method::PATCH,
            "/orders/2/status/",
            MockResponse::ok(json!({"id": 2, "status": "completed"})),
        );

        let updated = api
            .update_status(2, RequestStatus::Completed, Some("  "))
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Completed);
        let sent = transport.requests_to(&Method::PATCH, "/orders/2/status/");
        assert_eq!(sent[0].body, Some(json!({"status": "completed"})));
    }

    #[tokio::test]
    async fn test_blacklist_requires_reason() {
        let (transport, api) = api();
        let err = api.blacklist(2, " ").await.unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_details_not_found() {
        let (_transport, api) = api();
        let err = api.details(404).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
