//! Server response shapes and their conversion into domain records.
//!
//! The backend is loose about types: ids arrive as numbers or numeric
//! strings, nested objects may be flattened to ids, optional text may be
//! `null`. Everything is normalized here so the domain types stay strict.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use domain::models::{
    Address, AssignedManager, Manager, ManagerStatus, RequestPriority, RequestStatus,
    ServiceRequest, StatusChange, User, UserRole,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleId {
    Number(i64),
    Text(String),
}

impl FlexibleId {
    fn into_id(self) -> Result<i64, String> {
        match self {
            FlexibleId::Number(n) => Ok(n),
            FlexibleId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("invalid id: {:?}", s)),
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    FlexibleId::deserialize(deserializer)?
        .into_id()
        .map_err(de::Error::custom)
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlexibleId>::deserialize(deserializer)? {
        Some(id) => id.into_id().map(Some).map_err(de::Error::custom),
        None => Ok(None),
    }
}

/// Text that may arrive as a string, a number or `null`.
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Status strings outside the known set are dropped instead of failing the
/// whole record.
fn lenient<T: ServerEnum>(value: Option<String>) -> Option<T> {
    let value = value?;
    T::parse(&value).or_else(|| {
        tracing::warn!(value = %value, kind = T::KIND, "Ignoring unknown value from server");
        None
    })
}

trait ServerEnum: Sized {
    const KIND: &'static str;
    fn parse(s: &str) -> Option<Self>;
}

impl ServerEnum for ManagerStatus {
    const KIND: &'static str = "manager status";
    fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(Value::String(s.to_lowercase())).ok()
    }
}

impl ServerEnum for UserRole {
    const KIND: &'static str = "user role";
    fn parse(s: &str) -> Option<Self> {
        UserRole::from_str(s).ok()
    }
}

// ---------------------------------------------------------------------------
// Users and managers

#[derive(Debug, Deserialize)]
pub(crate) struct NestedStatus {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RoleField {
    Name(String),
    Named { name: String },
    /// Role table reference; the name is not resolvable client side.
    Id(#[allow(dead_code)] i64),
}

impl RoleField {
    fn role(self) -> Option<UserRole> {
        match self {
            RoleField::Name(name) | RoleField::Named { name } => lenient(Some(name)),
            RoleField::Id(_) => None,
        }
    }
}

/// A user as the server sends it, wherever it appears.
#[derive(Debug, Deserialize)]
pub(crate) struct ServerUser {
    #[serde(deserialize_with = "deserialize_id")]
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Option<RoleField>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    city_id: Option<i64>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "managerstatus")]
    manager_status: Option<NestedStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    telegram_chat_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    current_request_id: Option<i64>,
    #[serde(default)]
    max_assignments: Option<u32>,
    #[serde(default)]
    current_assignments: Option<u32>,
    #[serde(default)]
    specialization: Option<String>,
}

impl ServerUser {
    /// `name`, else `first_name last_name`, else `username`, else `User #id`.
    pub(crate) fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match self.username.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(username) => username.to_string(),
            None => format!("User #{}", self.id),
        }
    }

    fn manager_status(&self) -> Option<ManagerStatus> {
        let nested = self.manager_status.as_ref().and_then(|s| s.status.clone());
        lenient(self.status.clone().or(nested))
    }

    fn role(&mut self) -> Option<UserRole> {
        self.role
            .take()
            .and_then(RoleField::role)
            .or_else(|| self.groups.iter().find_map(|g| UserRole::from_str(g).ok()))
    }
}

impl From<ServerUser> for User {
    fn from(mut raw: ServerUser) -> Self {
        let name = raw.display_name();
        let role = raw.role();
        User {
            id: raw.id,
            name,
            email: raw.email.unwrap_or_default(),
            phone: raw.phone.unwrap_or_default(),
            role,
            city_id: raw.city_id,
            avatar: raw.avatar,
        }
    }
}

impl From<ServerUser> for Manager {
    fn from(raw: ServerUser) -> Self {
        Manager {
            id: raw.id,
            name: raw.display_name(),
            status: raw.manager_status().unwrap_or(ManagerStatus::Available),
            email: raw.email.unwrap_or_default(),
            phone: raw.phone.unwrap_or_default(),
            telegram_chat_id: raw.telegram_chat_id,
            current_request_id: raw.current_request_id,
            max_assignments: raw.max_assignments.unwrap_or(1),
            current_assignments: raw.current_assignments.unwrap_or(0),
            specialization: raw.specialization,
        }
    }
}

impl From<ServerUser> for AssignedManager {
    fn from(raw: ServerUser) -> Self {
        AssignedManager {
            id: raw.id,
            name: raw.display_name(),
            status: raw.manager_status(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CityField {
    Object {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        id: Option<i64>,
        #[serde(default)]
        name: Option<String>,
    },
    Id(i64),
    Name(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerAddress {
    #[serde(default)]
    city: Option<CityField>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    city_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    street: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    house: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    building: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    apartment: Option<String>,
}

impl From<ServerAddress> for Address {
    fn from(raw: ServerAddress) -> Self {
        let (city, nested_id) = match raw.city {
            Some(CityField::Object { id, name }) => (name.unwrap_or_default(), id),
            Some(CityField::Id(id)) => (String::new(), Some(id)),
            Some(CityField::Name(name)) => (name, None),
            None => (String::new(), None),
        };
        Address {
            city,
            city_id: raw.city_id.or(nested_id),
            street: raw.street.unwrap_or_default(),
            house: raw.house.unwrap_or_default(),
            building: raw.building.unwrap_or_default(),
            apartment: raw.apartment.unwrap_or_default(),
        }
    }
}

/// Older records carry the address as one line of text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AddressField {
    Structured(ServerAddress),
    Line(String),
}

impl From<AddressField> for Address {
    fn from(field: AddressField) -> Self {
        match field {
            AddressField::Structured(raw) => raw.into(),
            AddressField::Line(line) => Address {
                street: line,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserField {
    User(Box<ServerUser>),
    Id(FlexibleIdField),
}

/// Bare foreign key.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct FlexibleIdField(#[serde(deserialize_with = "deserialize_id")] i64);

impl From<UserField> for AssignedManager {
    fn from(field: UserField) -> Self {
        match field {
            UserField::User(user) => (*user).into(),
            UserField::Id(FlexibleIdField(id)) => AssignedManager {
                id,
                name: format!("User #{}", id),
                status: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChangedBy {
    User(Box<ServerUser>),
    Name(String),
    Id(i64),
}

impl ChangedBy {
    fn name(self) -> String {
        match self {
            ChangedBy::User(user) => user.display_name(),
            ChangedBy::Name(name) => name,
            ChangedBy::Id(id) => format!("User #{}", id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerHistoryItem {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<i64>,
    status: RequestStatus,
    #[serde(default)]
    changed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    changed_by: Option<ChangedBy>,
    #[serde(default)]
    comment: Option<String>,
}

/// An order as returned by `/orders/` endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ServerOrder {
    #[serde(deserialize_with = "deserialize_id")]
    id: i64,
    #[serde(default, alias = "clientName")]
    client_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    phone: Option<String>,
    #[serde(default)]
    address: Option<AddressField>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    priority: Option<RequestPriority>,
    #[serde(default)]
    status: Option<RequestStatus>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assigned_to: Option<UserField>,
    #[serde(default)]
    is_blacklisted: Option<bool>,
    #[serde(default, alias = "history")]
    status_history: Vec<ServerHistoryItem>,
}

impl From<ServerOrder> for ServiceRequest {
    fn from(raw: ServerOrder) -> Self {
        let history = raw
            .status_history
            .into_iter()
            .enumerate()
            .map(|(index, item)| StatusChange {
                id: item.id.unwrap_or(index as i64 + 1),
                status: item.status,
                changed_at: item.changed_at,
                changed_by: item.changed_by.map(ChangedBy::name),
                comment: item.comment.unwrap_or_default(),
            })
            .collect();

        ServiceRequest {
            id: raw.id,
            client_name: raw.client_name.unwrap_or_default(),
            phone: raw.phone.unwrap_or_default(),
            address: raw.address.map(Address::from).unwrap_or_default(),
            comment: raw.comment.unwrap_or_default(),
            priority: raw.priority.unwrap_or_default(),
            status: raw.status.unwrap_or(RequestStatus::Unassigned),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            assigned_to: raw.assigned_to.map(AssignedManager::from),
            is_blacklisted: raw.is_blacklisted.unwrap_or(false),
            history,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelopes and request bodies

/// List endpoints answer either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Plain(items) | ListEnvelope::Paged { results: items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerAuth {
    #[serde(alias = "access", alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<ServerUser>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignBody {
    pub manager_id: i64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusBody<'a> {
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BlacklistBody<'a> {
    pub reason: &'a str,
}

/// Body of `PATCH /users/managers/{id}/status`.
///
/// The backend's status choices are `free`, `busy`, `dayoff`, `training` and
/// `paired`, so `Available` goes out as `free`. Decoding accepts both `free`
/// and `available`.
#[derive(Debug, Serialize)]
pub(crate) struct ManagerStatusBody {
    #[serde(serialize_with = "serialize_backend_status")]
    pub status: ManagerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
}

fn serialize_backend_status<S: serde::Serializer>(
    status: &ManagerStatus,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let value = match status {
        ManagerStatus::Available => "free",
        other => other.as_str(),
    };
    serializer.serialize_str(value)
}
