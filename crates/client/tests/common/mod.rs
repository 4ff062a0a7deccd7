//! Common test utilities for integration tests.
//!
//! Builds an [`AppContext`] over a scripted [`MockTransport`] so store
//! workflows run end to end without a backend.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use crm_client::config::Config;
use crm_client::gateway::mock::MockTransport;
use crm_client::gateway::session::{MemoryTokenStorage, TokenStorage};
use crm_client::navigation::RecordingNavigator;
use crm_client::AppContext;
use domain::models::{
    Address, AddressInput, AssignedManager, CreateRequestData, Manager, ManagerStatus,
    RequestPriority, RequestStatus, ServiceRequest, UserId,
};
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};

pub struct TestApp {
    pub ctx: AppContext,
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryTokenStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestApp {
    /// A context with a signed-in session.
    pub fn new() -> Self {
        let app = Self::signed_out();
        app.storage
            .set("authToken", "test-token")
            .expect("memory storage never fails");
        app
    }

    pub fn signed_out() -> Self {
        let transport = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryTokenStorage::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let config = Config::load_for_test(&[]).expect("Failed to load test config");
        let ctx = AppContext::new(
            config,
            transport.clone(),
            storage.clone(),
            navigator.clone(),
        );
        Self {
            ctx,
            transport,
            storage,
            navigator,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn request(id: i64, status: RequestStatus) -> ServiceRequest {
    ServiceRequest {
        id,
        client_name: Name().fake(),
        phone: format!("+7999{:07}", id),
        address: Address {
            city: "Kazan".to_string(),
            city_id: Some(1),
            street: "Baumana".to_string(),
            house: id.to_string(),
            ..Default::default()
        },
        comment: String::new(),
        priority: RequestPriority::Normal,
        status,
        created_at: None,
        updated_at: None,
        assigned_to: None,
        is_blacklisted: false,
        history: vec![],
    }
}

pub fn assigned_request(id: i64, status: RequestStatus, manager_id: UserId) -> ServiceRequest {
    ServiceRequest {
        assigned_to: Some(AssignedManager {
            id: manager_id,
            name: format!("Manager {}", manager_id),
            status: Some(ManagerStatus::Busy),
        }),
        ..request(id, status)
    }
}

pub fn manager(id: UserId, status: ManagerStatus, current: u32, max: u32) -> Manager {
    Manager {
        id,
        name: Name().fake(),
        email: format!("manager{}@example.com", id),
        phone: format!("+7999{:07}", id),
        status,
        telegram_chat_id: Some(format!("{}", 1000 + id)),
        current_request_id: None,
        max_assignments: max,
        current_assignments: current,
        specialization: None,
    }
}

/// Server representation of an order.
pub fn order_json(id: i64, status: &str, manager_id: Option<UserId>) -> Value {
    let assigned_to = match manager_id {
        Some(manager_id) => json!({"id": manager_id, "first_name": "Sergey", "last_name": "Ivanov"}),
        None => Value::Null,
    };
    json!({
        "id": id,
        "client_name": "Ivan Petrov",
        "phone": "+79991234567",
        "address": {"city": {"id": 1, "name": "Kazan"}, "street": "Baumana", "house": "1"},
        "status": status,
        "assigned_to": assigned_to,
        "is_blacklisted": false,
        "status_history": []
    })
}

pub fn create_data() -> CreateRequestData {
    CreateRequestData {
        client_name: Name().fake(),
        phone: "+79991234567".to_string(),
        address: AddressInput {
            city: "Kazan".to_string(),
            city_id: Some(1),
            street: "Baumana".to_string(),
            house: "7".to_string(),
            building: String::new(),
            apartment: "3".to_string(),
        },
        comment: "Replace two windows".to_string(),
        priority: RequestPriority::High,
    }
}

pub fn ids(requests: &[ServiceRequest]) -> Vec<i64> {
    requests.iter().map(|r| r.id).collect()
}
