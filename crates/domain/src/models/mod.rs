//! Domain models for the CRM client.

pub mod filter;
pub mod location;
pub mod notification;
pub mod report;
pub mod request;
pub mod user;

pub use filter::{FilterKey, RequestFilters};
pub use location::{City, SelectOption, Street};
pub use notification::{NotificationPayload, ParseMode};
pub use report::{CityStats, ManagerStats, ReportData, ReportPeriod, ReportQuery, StatusCount};
pub use request::{
    Address, AddressInput, AssignedManager, CreateRequestData, RequestId, RequestPriority,
    RequestStatus, ServiceRequest, StatusChange,
};
pub use user::{
    CreateUserData, LoginCredentials, Manager, ManagerStatus, UpdateUserData, User, UserId,
    UserRole,
};
