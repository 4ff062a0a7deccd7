//! Shared utilities for the CRM client crates.
//!
//! This crate provides field-level validation used by outgoing form payloads:
//! - Phone number format and normalization
//! - Non-blank text checks

pub mod validation;
