use std::sync::Arc;

use validator::Validate;

use domain::models::{CreateUserData, Manager, ManagerStatus, UpdateUserData, User, UserId};

use super::wire::{ManagerStatusBody, ServerUser};
use super::{decode, decode_list, encode};
use crate::error::ApiError;
use crate::gateway::HttpGateway;

pub const MANAGERS_FAILED: &str = "Failed to load managers";
pub const USERS_FAILED: &str = "Failed to load users";
pub const MANAGER_STATUS_FAILED: &str = "Failed to update manager status";
pub const CREATE_USER_FAILED: &str = "Failed to create user";
pub const UPDATE_USER_FAILED: &str = "Failed to update user";

/// User and manager endpoints.
#[derive(Clone)]
pub struct UsersApi {
    gateway: Arc<HttpGateway>,
}

impl UsersApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_managers(&self) -> Result<Vec<Manager>, ApiError> {
        let body = self
            .gateway
            .get("/users/managers", &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, MANAGERS_FAILED))?;
        let raw: Vec<ServerUser> = decode_list(body, MANAGERS_FAILED)?;
        Ok(raw.into_iter().map(Manager::from).collect())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let body = self
            .gateway
            .get("/users", &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, USERS_FAILED))?;
        let raw: Vec<ServerUser> = decode_list(body, USERS_FAILED)?;
        Ok(raw.into_iter().map(User::from).collect())
    }

    /// The response body is ignored; callers keep their own mirror.
    pub async fn update_manager_status(
        &self,
        id: UserId,
        status: ManagerStatus,
        request_id: Option<i64>,
    ) -> Result<(), ApiError> {
        self.gateway
            .patch(
                &format!("/users/managers/{}/status", id),
                encode(&ManagerStatusBody { status, request_id })?,
            )
            .await
            .map_err(|e| ApiError::from_gateway(e, MANAGER_STATUS_FAILED))?;
        Ok(())
    }

    pub async fn create_user(&self, data: &CreateUserData) -> Result<User, ApiError> {
        data.validate()?;
        let body = self
            .gateway
            .post("/users", encode(data)?)
            .await
            .map_err(|e| ApiError::from_gateway(e, CREATE_USER_FAILED))?;
        Ok(decode::<ServerUser>(body, CREATE_USER_FAILED)?.into())
    }

    pub async fn update_user(&self, id: UserId, data: &UpdateUserData) -> Result<User, ApiError> {
        data.validate()?;
        let body = self
            .gateway
            .patch(&format!("/users/{}", id), encode(data)?)
            .await
            .map_err(|e| ApiError::from_gateway(e, UPDATE_USER_FAILED))?;
        Ok(decode::<ServerUser>(body, UPDATE_USER_FAILED)?.into())
    }
}
