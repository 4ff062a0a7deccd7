//! Route guards.
//!
//! Evaluated before the host router enters a route. A guard either lets
//! navigation proceed or redirects it.

use std::sync::Arc;

use domain::models::UserRole;

use crate::gateway::session::Session;
use crate::navigation::Location;

/// Access requirements of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Roles allowed in. `None` means any authenticated user.
    pub roles: Option<Vec<UserRole>>,
}

/// The route being navigated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub name: String,
    /// Path plus query string, used as the post-login redirect.
    pub full_path: String,
    pub meta: RouteMeta,
}

impl RouteTarget {
    pub fn new(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            meta: RouteMeta::default(),
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn allow_roles(mut self, roles: impl IntoIterator<Item = UserRole>) -> Self {
        self.meta.requires_auth = true;
        self.meta.roles = Some(roles.into_iter().collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirect(Location),
}

pub trait NavigationGuard: Send + Sync {
    fn check(&self, to: &RouteTarget) -> GuardOutcome;
}

/// Sends unauthenticated users to the login page, remembering where they
/// were going.
pub struct AuthGuard {
    session: Arc<Session>,
}

impl AuthGuard {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl NavigationGuard for AuthGuard {
    fn check(&self, to: &RouteTarget) -> GuardOutcome {
        if !to.meta.requires_auth || self.session.is_active() {
            return GuardOutcome::Proceed;
        }
        GuardOutcome::Redirect(Location::login_with_redirect(&to.full_path))
    }
}

/// Sends users whose role is not allowed on the route to `forbidden`.
pub struct RoleGuard {
    session: Arc<Session>,
}

impl RoleGuard {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl NavigationGuard for RoleGuard {
    fn check(&self, to: &RouteTarget) -> GuardOutcome {
        let Some(allowed) = &to.meta.roles else {
            return GuardOutcome::Proceed;
        };
        match self.session.role() {
            Some(role) if allowed.contains(&role) => GuardOutcome::Proceed,
            role => {
                tracing::debug!(route = %to.name, role = ?role, "Role not allowed on route");
                GuardOutcome::Redirect(Location::forbidden())
            }
        }
    }
}

/// Runs guards in order; the first redirect wins.
#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn NavigationGuard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authentication, then role checks.
    pub fn standard(session: Arc<Session>) -> Self {
        Self::new()
            .with(AuthGuard::new(session.clone()))
            .with(RoleGuard::new(session))
    }

    pub fn with(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn evaluate(&self, to: &RouteTarget) -> GuardOutcome {
        for guard in &self.guards {
            if let GuardOutcome::Redirect(location) = guard.check(to) {
                tracing::debug!(from = %to.name, to = %location.name, "Navigation redirected");
                return GuardOutcome::Redirect(location);
            }
        }
        GuardOutcome::Proceed
    }
}
