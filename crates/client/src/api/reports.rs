use std::sync::Arc;

use domain::models::{ManagerStats, ReportData, ReportQuery, UserId};

use super::decode;
use crate::error::ApiError;
use crate::gateway::HttpGateway;

pub const REPORTS_FAILED: &str = "Failed to load reports";
pub const MANAGER_STATS_FAILED: &str = "Failed to load manager statistics";

#[derive(Clone)]
pub struct ReportsApi {
    gateway: Arc<HttpGateway>,
}

impl ReportsApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn fetch_reports(&self, query: &ReportQuery) -> Result<ReportData, ApiError> {
        let body = self
            .gateway
            .get("/reports", &query.to_query())
            .await
            .map_err(|e| ApiError::from_gateway(e, REPORTS_FAILED))?;
        decode(body, REPORTS_FAILED)
    }

    pub async fn fetch_manager_stats(&self, manager_id: UserId) -> Result<ManagerStats, ApiError> {
        let body = self
            .gateway
            .get(&format!("/managers/{}/stats", manager_id), &[])
            .await
            .map_err(|e| ApiError::from_gateway(e, MANAGER_STATS_FAILED))?;
        decode(body, MANAGER_STATS_FAILED)
    }
}
