//! Notification message builders.
//!
//! Texts sent to managers through the Telegram relay endpoint.

use crate::models::request::ServiceRequest;

/// Message telling a manager about a newly assigned request.
pub fn request_assigned_message(request: &ServiceRequest) -> String {
    let mut text = format!(
        "New request #{}\nClient: {}\nPhone: {}\nAddress: {}",
        request.id,
        request.client_name,
        request.phone,
        request.address.full()
    );
    if !request.comment.trim().is_empty() {
        text.push_str(&format!("\nComment: {}", request.comment.trim()));
    }
    text
}

/// Message describing a status change of a request.
pub fn status_changed_message(request: &ServiceRequest) -> String {
    format!(
        "Request #{} ({}) is now {}",
        request.id, request.client_name, request.status
    )
}
