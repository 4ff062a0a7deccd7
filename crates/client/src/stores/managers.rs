//! Managers and users.

use tracing::{debug, info, warn};

use domain::models::{CreateUserData, Manager, ManagerStatus, UpdateUserData, User, UserId};

use super::{failure_message, StoreCell};
use crate::api::users::{
    CREATE_USER_FAILED, MANAGERS_FAILED, MANAGER_STATUS_FAILED, UPDATE_USER_FAILED, USERS_FAILED,
};
use crate::api::UsersApi;
use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct ManagerState {
    pub users: Vec<User>,
    pub managers: Vec<Manager>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Holds the manager roster and the client's mirror of each manager's
/// availability and workload.
pub struct ManagerStore {
    api: UsersApi,
    state: StoreCell<ManagerState>,
}

impl ManagerStore {
    pub fn new(api: UsersApi) -> Self {
        Self {
            api,
            state: StoreCell::new(ManagerState::default()),
        }
    }

    pub fn snapshot(&self) -> ManagerState {
        self.state.read().clone()
    }

    pub fn managers(&self) -> Vec<Manager> {
        self.state.read().managers.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.read().users.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Replace the roster without a fetch.
    pub fn hydrate_managers(&self, managers: Vec<Manager>) {
        self.state.write().managers = managers;
    }

    pub fn get_manager_by_id(&self, id: UserId) -> Option<Manager> {
        self.state
            .read()
            .managers
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Managers that are available and below capacity.
    pub fn available_managers(&self) -> Vec<Manager> {
        self.state
            .read()
            .managers
            .iter()
            .filter(|m| m.is_available())
            .cloned()
            .collect()
    }

    pub fn busy_managers(&self) -> Vec<Manager> {
        self.state
            .read()
            .managers
            .iter()
            .filter(|m| m.status == ManagerStatus::Busy)
            .cloned()
            .collect()
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.loading = true;
        state.error = None;
    }

    fn fail(&self, err: &ApiError, default: &str) {
        let mut state = self.state.write();
        state.loading = false;
        if let Some(message) = failure_message(err, default) {
            state.error = Some(message);
        }
    }

    pub async fn fetch_managers(&self) -> Result<Vec<Manager>, ApiError> {
        self.begin();
        match self.api.list_managers().await {
            Ok(managers) => {
                debug!(count = managers.len(), "Managers loaded");
                let mut state = self.state.write();
                state.managers = managers.clone();
                state.loading = false;
                Ok(managers)
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch managers");
                self.fail(&err, MANAGERS_FAILED);
                Err(err)
            }
        }
    }

    pub async fn fetch_all_users(&self) -> Result<Vec<User>, ApiError> {
        self.begin();
        match self.api.list_users().await {
            Ok(users) => {
                debug!(count = users.len(), "Users loaded");
                let mut state = self.state.write();
                state.users = users.clone();
                state.loading = false;
                Ok(users)
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch users");
                self.fail(&err, USERS_FAILED);
                Err(err)
            }
        }
    }

    /// Change a manager's status on the backend, then mirror it locally.
    pub async fn update_manager_status(
        &self,
        id: UserId,
        status: ManagerStatus,
        request_id: Option<i64>,
    ) -> Result<(), ApiError> {
        self.state.write().error = None;
        if let Err(err) = self.api.update_manager_status(id, status, request_id).await {
            warn!(manager_id = id, %status, error = %err, "Failed to update manager status");
            self.fail(&err, MANAGER_STATUS_FAILED);
            return Err(err);
        }
        self.mirror(id, status, request_id);
        info!(manager_id = id, %status, "Manager status updated");
        Ok(())
    }

    /// Mirror the status locally first, then tell the backend.
    ///
    /// Used as the follow-up step of request workflows: the local mirror
    /// changes even when the backend call fails, and the failure does not
    /// touch this store's `error`.
    pub async fn sync_manager_status(
        &self,
        id: UserId,
        status: ManagerStatus,
        request_id: Option<i64>,
    ) -> Result<(), ApiError> {
        if !self.mirror(id, status, request_id) {
            debug!(manager_id = id, "Manager not in local roster, mirror skipped");
        }
        self.api.update_manager_status(id, status, request_id).await
    }

    /// Apply a status change to the cached manager. Returns whether the
    /// manager was found.
    fn mirror(&self, id: UserId, status: ManagerStatus, request_id: Option<i64>) -> bool {
        let mut state = self.state.write();
        match state.managers.iter_mut().find(|m| m.id == id) {
            Some(manager) => {
                manager.apply_status(status, request_id);
                true
            }
            None => false,
        }
    }

    pub async fn create_user(&self, data: &CreateUserData) -> Result<User, ApiError> {
        self.begin();
        match self.api.create_user(data).await {
            Ok(user) => {
                info!(user_id = user.id, "User created");
                let mut state = self.state.write();
                state.users.push(user.clone());
                state.loading = false;
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Failed to create user");
                self.fail(&err, CREATE_USER_FAILED);
                Err(err)
            }
        }
    }

    pub async fn update_user(&self, id: UserId, data: &UpdateUserData) -> Result<User, ApiError> {
        self.begin();
        match self.api.update_user(id, data).await {
            Ok(user) => {
                let mut state = self.state.write();
                if let Some(slot) = state.users.iter_mut().find(|u| u.id == user.id) {
                    *slot = user.clone();
                }
                if let Some(manager) = state.managers.iter_mut().find(|m| m.id == user.id) {
                    manager.name = user.name.clone();
                    manager.email = user.email.clone();
                    manager.phone = user.phone.clone();
                }
                state.loading = false;
                Ok(user)
            }
            Err(err) => {
                warn!(user_id = id, error = %err, "Failed to update user");
                self.fail(&err, UPDATE_USER_FAILED);
                Err(err)
            }
        }
    }
}
