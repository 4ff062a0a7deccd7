//! Reporting models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Predefined reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "day",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
        }
    }
}

/// Query parameters for the summary report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub period: Option<ReportPeriod>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ReportQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(period) = self.period {
            query.push(("period".to_string(), period.as_str().to_string()));
        }
        if let Some(from) = self.date_from {
            query.push(("dateFrom".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            query.push(("dateTo".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        query
    }
}

/// Request count for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Per-city totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStats {
    pub city: String,
    pub total: u64,
    pub completed: u64,
}

/// Summary report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub total: u64,
    pub completed: u64,
    pub rejected: u64,
    #[serde(default)]
    pub average_time: String,
    #[serde(default)]
    pub by_status: Vec<StatusCount>,
    #[serde(default)]
    pub by_city: Vec<CityStats>,
}

/// Performance of one manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStats {
    pub id: UserId,
    pub name: String,
    pub completed: u64,
    pub rejected: u64,
    pub efficiency: f64,
    #[serde(default)]
    pub last_activity: Option<String>,
}
