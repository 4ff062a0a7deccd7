//! Domain services for the CRM client.
//!
//! Services contain logic that operates on domain models without I/O.

pub mod notification;

pub use notification::{request_assigned_message, status_changed_message};
