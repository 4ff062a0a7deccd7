use std::sync::Arc;

use validator::Validate;

use domain::models::{LoginCredentials, User};

use super::wire::{ServerAuth, ServerUser};
use super::{decode, encode};
use crate::error::ApiError;
use crate::gateway::HttpGateway;

pub const LOGIN_FAILED: &str = "Invalid email or password";
pub const PROFILE_FAILED: &str = "Failed to load profile";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: Option<User>,
}

#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<HttpGateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        credentials.validate()?;
        let body = self
            .gateway
            .post("/auth/login", encode(credentials)?)
            .await
            .map_err(|e| ApiError::from_gateway(e, LOGIN_FAILED))?;
        let raw: ServerAuth = decode(body, LOGIN_FAILED)?;
        Ok(AuthResponse {
            token: raw.token,
            user: raw.user.map(User::from),
        })
    }

    /// Profile of the session owner.
    pub async fn me(&self) -> Result<User, ApiError> {
        let body = self
            .gateway
            .get("/auth/me", &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, PROFILE_FAILED))?;
        Ok(decode::<ServerUser>(body, PROFILE_FAILED)?.into())
    }
}
