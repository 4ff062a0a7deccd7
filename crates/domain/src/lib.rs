//! Domain layer for the service-request CRM client.
//!
//! This crate contains:
//! - Client-shaped records (service requests, managers, users, locations, reports)
//! - Request filter predicates
//! - Notification message builders

pub mod models;
pub mod services;
