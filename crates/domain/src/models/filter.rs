//! Request filter predicates.
//!
//! A [`RequestFilters`] value is both the local predicate set applied to the
//! cached request collection and the query sent with the initial fetch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::request::{RequestStatus, ServiceRequest};
use super::user::UserId;

/// Optional predicates over service requests. Active predicates combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<UserId>,
    /// Inclusive lower bound on the creation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blacklisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// One predicate of [`RequestFilters`], for clearing it on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Status,
    CityId,
    ManagerId,
    DateFrom,
    DateTo,
    IsBlacklisted,
    Search,
}

impl RequestFilters {
    /// Deactivates one predicate, leaving the others as they are.
    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::Status => self.status = None,
            FilterKey::CityId => self.city_id = None,
            FilterKey::ManagerId => self.manager_id = None,
            FilterKey::DateFrom => self.date_from = None,
            FilterKey::DateTo => self.date_to = None,
            FilterKey::IsBlacklisted => self.is_blacklisted = None,
            FilterKey::Search => self.search = None,
        }
    }

    /// Returns a filter set where every predicate present in `self` replaces
    /// the one in `base`. Absent predicates never clear `base`; use
    /// [`clear`](Self::clear) for that.
    pub fn merged_over(&self, base: &RequestFilters) -> RequestFilters {
        RequestFilters {
            status: self.status.or(base.status),
            city_id: self.city_id.or(base.city_id),
            manager_id: self.manager_id.or(base.manager_id),
            date_from: self.date_from.or(base.date_from),
            date_to: self.date_to.or(base.date_to),
            is_blacklisted: self.is_blacklisted.or(base.is_blacklisted),
            search: self.search.clone().or_else(|| base.search.clone()),
        }
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.city_id.is_none()
            && self.manager_id.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.is_blacklisted.is_none()
            && self.search_term().is_none()
    }

    /// Whether `request` satisfies every active predicate.
    pub fn matches(&self, request: &ServiceRequest) -> bool {
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(city_id) = self.city_id {
            if request.address.city_id != Some(city_id) {
                return false;
            }
        }
        if let Some(manager_id) = self.manager_id {
            if request.manager_id() != Some(manager_id) {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(created) = request.created_at.map(|ts| ts.date_naive()) else {
                return false;
            };
            if self.date_from.is_some_and(|from| created < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| created > to) {
                return false;
            }
        }
        if let Some(blacklisted) = self.is_blacklisted {
            if request.is_blacklisted != blacklisted {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let haystack = [
                request.id.to_string(),
                request.client_name.to_lowercase(),
                request.phone.to_lowercase(),
                request.address.full().to_lowercase(),
                request.comment.to_lowercase(),
            ];
            if !haystack.iter().any(|field| field.contains(&term)) {
                return false;
            }
        }
        true
    }

    /// Keeps the requests matching every predicate, preserving order.
    pub fn apply(&self, requests: &[ServiceRequest]) -> Vec<ServiceRequest> {
        requests
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// Query parameters for the list endpoint.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.to_string()));
        }
        if let Some(manager_id) = self.manager_id {
            query.push(("manager_id".to_string(), manager_id.to_string()));
        }
        if let Some(city_id) = self.city_id {
            query.push(("city_id".to_string(), city_id.to_string()));
        }
        if let Some(from) = self.date_from {
            query.push(("date_from".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            query.push(("date_to".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        if let Some(blacklisted) = self.is_blacklisted {
            query.push(("is_blacklisted".to_string(), blacklisted.to_string()));
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), term.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::{Address, AssignedManager, RequestPriority};
    use chrono::{TimeZone, Utc};

    fn request(id: i64, status: RequestStatus, city_id: i64, day: u32) -> ServiceRequest {
        ServiceRequest {
            id,
            client_name: format!("Client {}", id),
            phone: format!("+7999000000{}", id),
            address: Address {
                city: "Moscow".to_string(),
                city_id: Some(city_id),
                street: "Arbat".to_string(),
                house: id.to_string(),
                ..Default::default()
            },
            comment: String::new(),
            priority: RequestPriority::Normal,
            status,
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()),
            updated_at: None,
            assigned_to: None,
            is_blacklisted: false,
            history: vec![],
        }
    }

    fn sample() -> Vec<ServiceRequest> {
        let mut assigned = request(2, RequestStatus::Assigned, 1, 5);
        assigned.assigned_to = Some(AssignedManager {
            id: 10,
            name: "Oleg".to_string(),
            status: None,
        });
        let mut blacklisted = request(3, RequestStatus::Rejected, 2, 10);
        blacklisted.is_blacklisted = true;
        blacklisted.comment = "Rude on the phone".to_string();
        vec![
            request(1, RequestStatus::Unassigned, 1, 1),
            assigned,
            blacklisted,
            request(4, RequestStatus::Unassigned, 2, 20),
        ]
    }

    fn ids(requests: &[ServiceRequest]) -> Vec<i64> {
        requests.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_empty_filters_keep_everything_in_order() {
        let filters = RequestFilters::default();
        assert!(filters.is_empty());
        assert_eq!(ids(&filters.apply(&sample())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_blank_search_is_inactive() {
        let filters = RequestFilters {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert!(filters.to_query().is_empty());
    }

    #[test]
    fn test_clear_one_predicate() {
        let mut filters = RequestFilters {
            status: Some(RequestStatus::Unassigned),
            city_id: Some(2),
            search: Some("smith".to_string()),
            ..Default::default()
        };

        filters.clear(FilterKey::Status);

        assert_eq!(filters.status, None);
        assert_eq!(filters.city_id, Some(2));
        assert_eq!(filters.search.as_deref(), Some("smith"));

        filters.clear(FilterKey::CityId);
        filters.clear(FilterKey::Search);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_status_filter() {
        let filters = RequestFilters {
            status: Some(RequestStatus::Unassigned),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![1, 4]);
    }

    #[test]
    fn test_conjunction_of_predicates() {
        let filters = RequestFilters {
            status: Some(RequestStatus::Unassigned),
            city_id: Some(2),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![4]);
    }

    #[test]
    fn test_every_member_matches_and_every_non_member_violates() {
        let all = sample();
        let filters = RequestFilters {
            city_id: Some(1),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..Default::default()
        };
        let kept = filters.apply(&all);
        for r in &all {
            let member = kept.iter().any(|k| k.id == r.id);
            assert_eq!(member, filters.matches(r));
        }
        assert_eq!(ids(&kept), vec![1, 2]);
    }

    #[test]
    fn test_manager_filter() {
        let filters = RequestFilters {
            manager_id: Some(10),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![2]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filters = RequestFilters {
            date_from: NaiveDate::from_ymd_opt(2024, 3, 5),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![2, 3]);
    }

    #[test]
    fn test_date_range_excludes_missing_timestamp() {
        let mut r = request(9, RequestStatus::Unassigned, 1, 1);
        r.created_at = None;
        let filters = RequestFilters {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(!filters.matches(&r));
    }

    #[test]
    fn test_blacklist_filter() {
        let filters = RequestFilters {
            is_blacklisted: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![3]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let filters = RequestFilters {
            search: Some("RUDE".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![3]);

        let filters = RequestFilters {
            search: Some("client 4".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&sample())), vec![4]);
    }

    #[test]
    fn test_merged_over_prefers_overrides() {
        let base = RequestFilters {
            status: Some(RequestStatus::Assigned),
            city_id: Some(1),
            ..Default::default()
        };
        let params = RequestFilters {
            status: Some(RequestStatus::Completed),
            search: Some("ivan".to_string()),
            ..Default::default()
        };
        let merged = params.merged_over(&base);
        assert_eq!(merged.status, Some(RequestStatus::Completed));
        assert_eq!(merged.city_id, Some(1));
        assert_eq!(merged.search.as_deref(), Some("ivan"));
    }

    #[test]
    fn test_to_query() {
        let filters = RequestFilters {
            status: Some(RequestStatus::InProgress),
            city_id: Some(3),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 2),
            is_blacklisted: Some(false),
            search: Some(" lenina ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("status".to_string(), "in_progress".to_string()),
                ("city_id".to_string(), "3".to_string()),
                ("date_from".to_string(), "2024-01-02".to_string()),
                ("is_blacklisted".to_string(), "false".to_string()),
                ("search".to_string(), "lenina".to_string()),
            ]
        );
    }
}
