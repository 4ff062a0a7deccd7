//! Service request domain models.
//!
//! A service request (an "order" on the backend) is one window-installation
//! job tracked through a status lifecycle. The backend is the authority on
//! transitions; the client only mirrors what the server returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::user::{ManagerStatus, UserId};

/// Canonical identifier of a service request.
pub type RequestId = i64;

/// Lifecycle status of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Unassigned,
    Assigned,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Unassigned => "unassigned",
            RequestStatus::Assigned => "assigned",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses end the job and free the assigned manager.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Completed | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }

    /// Statuses that still need work from somebody.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RequestStatus::Unassigned | RequestStatus::Assigned | RequestStatus::InProgress
        )
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unassigned" => Ok(RequestStatus::Unassigned),
            "assigned" => Ok(RequestStatus::Assigned),
            "in_progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Decomposed client address.
///
/// `city_id` is the canonical city reference; `city` keeps the display name
/// when the server sends one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub city_id: Option<i64>,
    pub street: String,
    pub house: String,
    pub building: String,
    pub apartment: String,
}

impl Address {
    /// Single-line representation, e.g. `Moscow, Lenina, 5, bld 2, apt 10`.
    pub fn full(&self) -> String {
        let mut parts: Vec<String> = [&self.city, &self.street, &self.house]
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.to_string())
            .collect();
        if !self.building.is_empty() {
            parts.push(format!("bld {}", self.building));
        }
        if !self.apartment.is_empty() {
            parts.push(format!("apt {}", self.apartment));
        }
        parts.join(", ")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full())
    }
}

/// Denormalized snapshot of the manager a request is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedManager {
    pub id: UserId,
    pub name: String,
    pub status: Option<ManagerStatus>,
}

/// One entry of a request's status history. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: i64,
    pub status: RequestStatus,
    pub changed_at: Option<DateTime<Utc>>,
    pub changed_by: Option<String>,
    pub comment: String,
}

/// A service request as held by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub client_name: String,
    pub phone: String,
    pub address: Address,
    pub comment: String,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<AssignedManager>,
    pub is_blacklisted: bool,
    pub history: Vec<StatusChange>,
}

impl ServiceRequest {
    /// ID of the assigned manager, if any.
    pub fn manager_id(&self) -> Option<UserId> {
        self.assigned_to.as_ref().map(|m| m.id)
    }
}

/// Address part of a new request form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AddressInput {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub city: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub street: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub house: String,

    #[serde(default)]
    pub building: String,

    #[serde(default)]
    pub apartment: String,
}

/// Payload for creating a service request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestData {
    #[validate(length(min = 1, max = 100, message = "Client name must be 1-100 characters"))]
    pub client_name: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[validate(nested)]
    pub address: AddressInput,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub priority: RequestPriority,
}
