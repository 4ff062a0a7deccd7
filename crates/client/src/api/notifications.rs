use std::sync::Arc;

use tracing::info;

use domain::models::{Manager, NotificationPayload, ServiceRequest};
use domain::services::notification::{request_assigned_message, status_changed_message};

use super::encode;
use crate::error::ApiError;
use crate::gateway::HttpGateway;

pub const NOTIFY_FAILED: &str = "Failed to send notification";

/// Telegram relay (`POST /telegram/notify`).
#[derive(Clone)]
pub struct NotificationsApi {
    gateway: Arc<HttpGateway>,
}

impl NotificationsApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn send(&self, payload: &NotificationPayload) -> Result<(), ApiError> {
        if payload.chat_id.trim().is_empty() {
            return Err(ApiError::Invalid("Telegram chat id is required".to_string()));
        }
        if payload.text.trim().is_empty() {
            return Err(ApiError::Invalid("Notification text is empty".to_string()));
        }

        self.gateway
            .post("/telegram/notify", encode(payload)?)
            .await
            .map_err(|e| ApiError::from_gateway(e, NOTIFY_FAILED))?;
        info!(chat_id = %payload.chat_id, "Notification sent");
        Ok(())
    }

    pub async fn send_notification(&self, chat_id: &str, text: &str) -> Result<(), ApiError> {
        self.send(&NotificationPayload::text(chat_id, text)).await
    }

    /// Tell `manager` about `request`.
    pub async fn send_request_notification(
        &self,
        manager: &Manager,
        request: &ServiceRequest,
    ) -> Result<(), ApiError> {
        self.send_notification(chat_id(manager)?, &request_assigned_message(request))
            .await
    }

    /// Tell `manager` that `request` moved to its current status.
    pub async fn send_status_notification(
        &self,
        manager: &Manager,
        request: &ServiceRequest,
    ) -> Result<(), ApiError> {
        self.send_notification(chat_id(manager)?, &status_changed_message(request))
            .await
    }
}

fn chat_id(manager: &Manager) -> Result<&str, ApiError> {
    manager.telegram_chat_id.as_deref().ok_or_else(|| {
        ApiError::Invalid(format!("Manager {} has no Telegram chat id", manager.name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::gateway::mock::MockResponse;
    use domain::models::{Address, ManagerStatus, RequestPriority, RequestStatus};
    use reqwest::Method;
    use serde_json::json;

    fn manager(chat_id: Option<&str>) -> Manager {
        Manager {
            id: 3,
            name: "Sergey".to_string(),
            email: String::new(),
            phone: String::new(),
            status: ManagerStatus::Available,
            telegram_chat_id: chat_id.map(str::to_string),
            current_request_id: None,
            max_assignments: 1,
            current_assignments: 0,
            specialization: None,
        }
    }

    fn request() -> ServiceRequest {
        ServiceRequest {
            id: 21,
            client_name: "Maria".to_string(),
            phone: "+79990001122".to_string(),
            address: Address {
                city: "Kazan".to_string(),
                street: "Baumana".to_string(),
                house: "1".to_string(),
                ..Default::default()
            },
            comment: String::new(),
            priority: RequestPriority::High,
            status: RequestStatus::Assigned,
            created_at: None,
            updated_at: None,
            assigned_to: None,
            is_blacklisted: false,
            history: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request_notification() {
        let (transport, gateway) = test_support::gateway();
        transport.on(
            Method::POST,
            "/telegram/notify",
            MockResponse::ok(json!({"ok": true})),
        );

        NotificationsApi::new(gateway)
            .send_request_notification(&manager(Some("1001")), &request())
            .await
            .unwrap();

        let sent = transport.requests_to(&Method::POST, "/telegram/notify");
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body["chat_id"], "1001");
        assert!(body["text"].as_str().unwrap().contains("#21"));
    }

    #[tokio::test]
    async fn test_send_status_notification() {
        let (transport, gateway) = test_support::gateway();
        transport.on(
            Method::POST,
            "/telegram/notify",
            MockResponse::ok(json!({"ok": true})),
        );

        NotificationsApi::new(gateway)
            .send_status_notification(&manager(Some("1001")), &request())
            .await
            .unwrap();

        let sent = transport.requests_to(&Method::POST, "/telegram/notify");
        let text = sent[0].body.as_ref().unwrap()["text"].as_str().unwrap().to_string();
        assert_eq!(text, "Request #21 (Maria) is now assigned");
    }

    #[tokio::test]
    async fn test_manager_without_chat_id() {
        let (transport, gateway) = test_support::gateway();

        let err = NotificationsApi::new(gateway)
            .send_request_notification(&manager(None), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_message() {
        let (transport, gateway) = test_support::gateway();
        transport.on(
            Method::POST,
            "/telegram/notify",
            MockResponse::json(502, json!("Bad Gateway")),
        );

        let err = NotificationsApi::new(gateway)
            .send_notification("1001", "hello")
            .await
            .unwrap_err();

        assert_eq!(err.message(), NOTIFY_FAILED);
    }
}
