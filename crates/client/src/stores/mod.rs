//! Client-side state containers.
//!
//! Each store keeps its state behind a lock that is only held for short,
//! synchronous sections and never across an `.await`.

pub mod auth;
pub mod locations;
pub mod managers;
pub mod requests;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ApiError;

pub use auth::AuthStore;
pub use locations::LocationStore;
pub use managers::ManagerStore;
pub use requests::RequestStore;

/// Store state guarded by a lock that recovers from poisoning.
#[derive(Debug, Default)]
pub(crate) struct StoreCell<T>(RwLock<T>);

impl<T> StoreCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(RwLock::new(value))
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The message a store records for a failed action, if any.
///
/// Unauthorized and cancelled calls leave the store's error untouched.
pub(crate) fn failure_message(err: &ApiError, default: &str) -> Option<String> {
    match err {
        ApiError::Unauthorized(_) | ApiError::Cancelled => None,
        other => {
            let message = other.message();
            Some(if message.trim().is_empty() {
                default.to_string()
            } else {
                message
            })
        }
    }
}
