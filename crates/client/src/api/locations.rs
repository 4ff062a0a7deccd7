use std::sync::Arc;

use domain::models::{City, Street};

use super::decode_list;
use crate::error::ApiError;
use crate::gateway::HttpGateway;

pub const CITIES_FAILED: &str = "Failed to load cities";
pub const STREETS_FAILED: &str = "Failed to load streets";

/// City and street reference data.
#[derive(Clone)]
pub struct LocationsApi {
    gateway: Arc<HttpGateway>,
}

impl LocationsApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn cities(&self) -> Result<Vec<City>, ApiError> {
        let body = self
            .gateway
            .get("/cities", &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, CITIES_FAILED))?;
        decode_list(body, CITIES_FAILED)
    }

    pub async fn streets(&self, city_id: i64) -> Result<Vec<Street>, ApiError> {
        let body = self
            .gateway
            .get(&format!("/cities/{}/streets", city_id), &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, STREETS_FAILED))?;
        decode_list(body, STREETS_FAILED)
    }
}
