use std::sync::Arc;

use tracing::{info, warn};

use domain::models::{LoginCredentials, User, UserRole};

use super::StoreCell;
use crate::api::auth::LOGIN_FAILED;
use crate::api::AuthApi;
use crate::error::ApiError;
use crate::gateway::session::Session;
use crate::navigation::{Location, Navigator};

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Sign-in, sign-out and session restore.
pub struct AuthStore {
    api: AuthApi,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
    state: StoreCell<AuthState>,
}

impl AuthStore {
    pub fn new(api: AuthApi, session: Arc<Session>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            session,
            navigator,
            state: StoreCell::new(AuthState::default()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn user_role(&self) -> Option<UserRole> {
        self.session.role()
    }

    pub fn is_admin(&self) -> bool {
        self.user_role() == Some(UserRole::Admin)
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Sign in, persist the token and go to the dashboard.
    ///
    /// Any failure is reported to the user as a wrong email or password.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        {
            let mut state = self.state.write();
            state.loading = true;
            state.error = None;
        }

        let result = match self.api.login(credentials).await {
            Ok(response) => self
                .session
                .start(&response.token, response.user.clone())
                .map_err(ApiError::from)
                .map(|()| response.user),
            Err(err) => Err(err),
        };

        let user = match result {
            Ok(user) => user,
            Err(err) => {
                warn!(email = %credentials.email, error = %err, "Login failed");
                let mut state = self.state.write();
                state.loading = false;
                state.error = Some(LOGIN_FAILED.to_string());
                return Err(err);
            }
        };

        // Some backends return only the token.
        let user = match user {
            Some(user) => user,
            None => match self.api.me().await {
                Ok(user) => {
                    self.session.set_user(Some(user.clone()));
                    user
                }
                Err(err) => {
                    warn!(error = %err, "Signed in but profile could not be loaded");
                    self.session.clear();
                    let mut state = self.state.write();
                    state.loading = false;
                    state.error = Some(LOGIN_FAILED.to_string());
                    return Err(err);
                }
            },
        };

        self.state.write().loading = false;
        info!(user_id = user.id, role = ?user.role, "Signed in");
        self.navigator.navigate(Location::dashboard());
        Ok(user)
    }

    /// End the session and go to the login page.
    pub fn logout(&self) {
        self.session.clear();
        info!("Signed out");
        self.navigator.navigate(Location::login());
    }

    /// Restore the session from a persisted token.
    ///
    /// Returns `false` when there is no token or the server rejects it; in
    /// the latter case the session is ended.
    pub async fn check_auth(&self) -> bool {
        if self.session.token().is_none() {
            return false;
        }
        match self.api.me().await {
            Ok(user) => {
                self.session.set_user(Some(user));
                true
            }
            Err(err) => {
                warn!(error = %err, "Stored session is no longer valid");
                self.logout();
                false
            }
        }
    }
}
