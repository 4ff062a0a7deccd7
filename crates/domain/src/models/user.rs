//! User and manager domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Canonical identifier of a user (managers included).
pub type UserId = i64;

/// Role of a user in the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    /// Assigns requests to managers.
    Coordinator,
    /// Field technician executing requests.
    Manager,
    /// Senior manager overseeing cities.
    Leader,
    /// Creates requests only.
    Operator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Coordinator => "coordinator",
            UserRole::Manager => "manager",
            UserRole::Leader => "leader",
            UserRole::Operator => "operator",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "coordinator" => Ok(UserRole::Coordinator),
            "manager" => Ok(UserRole::Manager),
            "leader" => Ok(UserRole::Leader),
            "operator" => Ok(UserRole::Operator),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Availability status of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerStatus {
    #[serde(alias = "free")]
    Available,
    Busy,
    #[serde(rename = "dayoff", alias = "day_off")]
    DayOff,
    Training,
    Paired,
}

impl ManagerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerStatus::Available => "available",
            ManagerStatus::Busy => "busy",
            ManagerStatus::DayOff => "dayoff",
            ManagerStatus::Training => "training",
            ManagerStatus::Paired => "paired",
        }
    }
}

impl fmt::Display for ManagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Option<UserRole>,
    pub city_id: Option<i64>,
    pub avatar: Option<String>,
}

/// A field technician together with the client's mirror of its workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ManagerStatus,
    pub telegram_chat_id: Option<String>,
    pub current_request_id: Option<i64>,
    pub max_assignments: u32,
    pub current_assignments: u32,
    pub specialization: Option<String>,
}

impl Manager {
    /// Whether the manager can take one more request.
    pub fn has_capacity(&self) -> bool {
        self.current_assignments < self.max_assignments
    }

    /// Available status and spare capacity are both required.
    pub fn is_available(&self) -> bool {
        self.status == ManagerStatus::Available && self.has_capacity()
    }

    /// Applies a status change to the local mirror.
    ///
    /// `Busy` takes one more assignment (saturating at `max_assignments`) and
    /// records `request_id`; any other status releases one assignment,
    /// floored at zero.
    pub fn apply_status(&mut self, status: ManagerStatus, request_id: Option<i64>) {
        self.status = status;
        self.current_request_id = request_id;
        if status == ManagerStatus::Busy {
            self.current_assignments = (self.current_assignments + 1).min(self.max_assignments);
        } else {
            self.current_assignments = self.current_assignments.saturating_sub(1);
        }
    }
}

/// Payload for creating a user (admin user management).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserData {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,

    #[validate(email(message = "Enter a valid email"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    pub role: UserRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "A manager must accept at least one assignment"))]
    pub max_assignments: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

/// Partial update of a user. Only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email"))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "A manager must accept at least one assignment"))]
    pub max_assignments: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(status: ManagerStatus, current: u32, max: u32) -> Manager {
        Manager {
            id: 1,
            name: "Sergey Ivanov".to_string(),
            email: "sergey@example.com".to_string(),
            phone: "+79990001122".to_string(),
            status,
            telegram_chat_id: Some("1001".to_string()),
            current_request_id: None,
            max_assignments: max,
            current_assignments: current,
            specialization: None,
        }
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(
            UserRole::from_str("Coordinator").unwrap(),
            UserRole::Coordinator
        );
        assert!(UserRole::from_str("guest").is_err());
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(format!("{}", UserRole::Operator), "operator");
        assert_eq!(format!("{}", UserRole::Leader), "leader");
    }

    #[test]
    fn test_manager_status_serde() {
        let status: ManagerStatus = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(status, ManagerStatus::Available);
        let status: ManagerStatus = serde_json::from_str("\"dayoff\"").unwrap();
        assert_eq!(status, ManagerStatus::DayOff);
        assert_eq!(
            serde_json::to_string(&ManagerStatus::DayOff).unwrap(),
            "\"dayoff\""
        );
        assert_eq!(
            serde_json::to_string(&ManagerStatus::Available).unwrap(),
            "\"available\""
        );
    }

    #[test]
    fn test_is_available_requires_status_and_capacity() {
        assert!(manager(ManagerStatus::Available, 0, 1).is_available());
        assert!(!manager(ManagerStatus::Available, 1, 1).is_available());
        assert!(!manager(ManagerStatus::Busy, 0, 2).is_available());
        assert!(!manager(ManagerStatus::DayOff, 0, 1).is_available());
    }

    #[test]
    fn test_apply_busy_increments() {
        let mut m = manager(ManagerStatus::Available, 0, 2);
        m.apply_status(ManagerStatus::Busy, Some(42));
        assert_eq!(m.status, ManagerStatus::Busy);
        assert_eq!(m.current_assignments, 1);
        assert_eq!(m.current_request_id, Some(42));
    }

    #[test]
    fn test_apply_busy_saturates_at_capacity() {
        let mut m = manager(ManagerStatus::Busy, 2, 2);
        m.apply_status(ManagerStatus::Busy, Some(3));
        assert_eq!(m.current_assignments, 2);
    }

    #[test]
    fn test_apply_release_decrements_and_floors() {
        let mut m = manager(ManagerStatus::Busy, 1, 2);
        m.current_request_id = Some(5);
        m.apply_status(ManagerStatus::Available, None);
        assert_eq!(m.current_assignments, 0);
        assert_eq!(m.current_request_id, None);

        m.apply_status(ManagerStatus::Available, None);
        assert_eq!(m.current_assignments, 0);
    }

    #[test]
    fn test_create_user_data_validation() {
        let data = CreateUserData {
            name: "Anna".to_string(),
            email: "not-an-email".to_string(),
            phone: "+79991234567".to_string(),
            role: UserRole::Operator,
            city_id: None,
            password: "secret123".to_string(),
            telegram_chat_id: None,
            max_assignments: Some(0),
            specialization: None,
        };
        let errors = data.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("max_assignments"));
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn test_update_user_data_skips_absent_fields() {
        let data = UpdateUserData {
            name: Some("Anna".to_string()),
            ..Default::default()
        };
        assert!(data.validate().is_ok());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Anna" }));
    }

    #[test]
    fn test_login_credentials_validation() {
        let ok = LoginCredentials {
            email: "coordinator@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginCredentials {
            email: "coordinator".to_string(),
            password: String::new(),
        };
        assert!(bad.validate().is_err());
    }
}
