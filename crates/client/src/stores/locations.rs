use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use domain::models::{City, SelectOption, Street};

use super::{failure_message, StoreCell};
use crate::api::locations::{CITIES_FAILED, STREETS_FAILED};
use crate::api::LocationsApi;
use crate::error::ApiError;

pub const CITY_NOT_FOUND: &str = "City not found";

#[derive(Debug, Clone, Default)]
pub struct LocationState {
    pub cities: Vec<City>,
    /// Streets of one city at a time.
    pub streets: Vec<Street>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Cached city and street lists for forms and filters.
pub struct LocationStore {
    api: LocationsApi,
    state: StoreCell<LocationState>,
}

impl LocationStore {
    pub fn new(api: LocationsApi) -> Self {
        Self {
            api,
            state: StoreCell::new(LocationState::default()),
        }
    }

    pub fn snapshot(&self) -> LocationState {
        self.state.read().clone()
    }

    pub fn cities(&self) -> Vec<City> {
        self.state.read().cities.clone()
    }

    pub fn streets(&self) -> Vec<Street> {
        self.state.read().streets.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_updated
    }

    pub fn city_options(&self) -> Vec<SelectOption> {
        self.state.read().cities.iter().map(SelectOption::from).collect()
    }

    pub fn street_options(&self) -> Vec<SelectOption> {
        self.state.read().streets.iter().map(SelectOption::from).collect()
    }

    pub fn has_cities(&self) -> bool {
        !self.state.read().cities.is_empty()
    }

    pub fn has_streets(&self) -> bool {
        !self.state.read().streets.is_empty()
    }

    pub fn get_city_by_id(&self, id: i64) -> Option<City> {
        self.state.read().cities.iter().find(|c| c.id == id).cloned()
    }

    pub fn get_street_by_id(&self, id: i64) -> Option<Street> {
        self.state.read().streets.iter().find(|s| s.id == id).cloned()
    }

    /// Load the city list unless it is already cached and `force` is false.
    pub async fn fetch_cities(&self, force: bool) -> Result<Vec<City>, ApiError> {
        {
            let mut state = self.state.write();
            if !force && !state.cities.is_empty() {
                return Ok(state.cities.clone());
            }
            state.loading = true;
            state.error = None;
        }

        match self.api.cities().await {
            Ok(cities) => {
                debug!(count = cities.len(), "Cities loaded");
                let mut state = self.state.write();
                state.cities = cities.clone();
                state.last_updated = Some(Utc::now());
                state.loading = false;
                Ok(cities)
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch cities");
                self.fail(&err, CITIES_FAILED);
                Err(err)
            }
        }
    }

    /// Load the streets of the city named `city_name`.
    ///
    /// The city must be in the cached city list. Streets already loaded for
    /// that city are reused unless `force` is set.
    pub async fn fetch_streets(&self, city_name: &str, force: bool) -> Result<Vec<Street>, ApiError> {
        let city_id = {
            let mut state = self.state.write();
            let Some(city_id) = state
                .cities
                .iter()
                .find(|c| c.name == city_name)
                .map(|c| c.id)
            else {
                state.error = Some(CITY_NOT_FOUND.to_string());
                return Err(ApiError::NotFound(CITY_NOT_FOUND.to_string()));
            };
            let cached = state.streets.first().is_some_and(|s| s.city_id == city_id);
            if cached && !force {
                return Ok(state.streets.clone());
            }
            state.loading = true;
            state.error = None;
            city_id
        };

        match self.api.streets(city_id).await {
            Ok(streets) => {
                debug!(city_id, count = streets.len(), "Streets loaded");
                let mut state = self.state.write();
                state.streets = streets.clone();
                state.loading = false;
                Ok(streets)
            }
            Err(err) => {
                warn!(city_id, error = %err, "Failed to fetch streets");
                self.fail(&err, STREETS_FAILED);
                Err(err)
            }
        }
    }

    pub fn reset_streets(&self) {
        self.state.write().streets.clear();
    }

    pub fn clear_errors(&self) {
        self.state.write().error = None;
    }

    fn fail(&self, err: &ApiError, default: &str) {
        let mut state = self.state.write();
        state.loading = false;
        if let Some(message) = failure_message(err, default) {
            state.error = Some(message);
        }
    }
}
