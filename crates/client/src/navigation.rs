//! Navigation seam between the client core and the host's router.

use std::sync::{Mutex, PoisonError};

pub const LOGIN_ROUTE: &str = "login";
pub const DASHBOARD_ROUTE: &str = "dashboard";
pub const FORBIDDEN_ROUTE: &str = "forbidden";

/// A named route plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn login() -> Self {
        Self::named(LOGIN_ROUTE)
    }

    /// Login page that returns to `full_path` after signing in.
    pub fn login_with_redirect(full_path: &str) -> Self {
        Self::login().with_query("redirect", full_path)
    }

    pub fn dashboard() -> Self {
        Self::named(DASHBOARD_ROUTE)
    }

    pub fn forbidden() -> Self {
        Self::named(FORBIDDEN_ROUTE)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Implemented by the host to perform route changes.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: Location);
}

/// Records every navigation instead of performing it.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Location>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> Vec<Location> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Location> {
        self.navigations().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: Location) {
        tracing::debug!(route = %location.name, "Navigation requested");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location);
    }
}
