//! The request store: the client's working set of service requests.
//!
//! Actions call the requests API and merge the server's answer into local
//! state. Assignment and terminal status changes also update the manager
//! mirror in [`ManagerStore`]; that second step is not transactional. If it
//! fails the request change stands, the failure is logged, and nothing is
//! rolled back.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use domain::models::{
    CreateRequestData, FilterKey, ManagerStatus, RequestFilters, RequestId, RequestStatus, ServiceRequest,
    UserId,
};

use super::managers::ManagerStore;
use super::{failure_message, StoreCell};
use crate::api::requests::{
    ASSIGN_FAILED, BLACKLIST_FAILED, CREATE_FAILED, DETAILS_FAILED, LIST_FAILED, STATUS_FAILED,
};
use crate::api::RequestsApi;
use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct RequestState {
    pub requests: Vec<ServiceRequest>,
    pub current_request: Option<ServiceRequest>,
    pub filters: RequestFilters,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct RequestStore {
    api: RequestsApi,
    managers: Arc<ManagerStore>,
    state: StoreCell<RequestState>,
    /// Incremented by every fetch.
    fetch_generation: AtomicU64,
    /// Generation of the list currently stored. A response older than this
    /// is stale.
    applied_generation: AtomicU64,
    /// Fetches still running. Only changed under the state write lock.
    fetches_in_flight: AtomicUsize,
}

/// Ends one in-flight fetch when dropped, including when the fetch future
/// itself is dropped before completion.
struct FetchGuard<'a> {
    store: &'a RequestStore,
}

impl<'a> FetchGuard<'a> {
    fn start(store: &'a RequestStore) -> Self {
        let mut state = store.state.write();
        store.fetches_in_flight.fetch_add(1, Ordering::SeqCst);
        state.loading = true;
        state.error = None;
        Self { store }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.store.state.write();
        let remaining = self.store.fetches_in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            state.loading = false;
        }
    }
}

impl RequestStore {
    pub fn new(api: RequestsApi, managers: Arc<ManagerStore>) -> Self {
        Self {
            api,
            managers,
            state: StoreCell::new(RequestState::default()),
            fetch_generation: AtomicU64::new(0),
            applied_generation: AtomicU64::new(0),
            fetches_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> RequestState {
        self.state.read().clone()
    }

    pub fn requests(&self) -> Vec<ServiceRequest> {
        self.state.read().requests.clone()
    }

    pub fn current_request(&self) -> Option<ServiceRequest> {
        self.state.read().current_request.clone()
    }

    pub fn filters(&self) -> RequestFilters {
        self.state.read().filters.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Replace the collection without a fetch.
    pub fn hydrate(&self, requests: Vec<ServiceRequest>) {
        self.state.write().requests = requests;
    }

    // -- derived views ------------------------------------------------------

    pub fn filtered_requests(&self) -> Vec<ServiceRequest> {
        let state = self.state.read();
        state.filters.apply(&state.requests)
    }

    pub fn requests_by_status(&self, status: RequestStatus) -> Vec<ServiceRequest> {
        self.select(|r| r.status == status)
    }

    pub fn unassigned_requests(&self) -> Vec<ServiceRequest> {
        self.requests_by_status(RequestStatus::Unassigned)
    }

    pub fn in_progress_requests(&self) -> Vec<ServiceRequest> {
        self.requests_by_status(RequestStatus::InProgress)
    }

    pub fn completed_requests(&self) -> Vec<ServiceRequest> {
        self.requests_by_status(RequestStatus::Completed)
    }

    /// Unassigned, assigned and in-progress requests.
    pub fn active_requests(&self) -> Vec<ServiceRequest> {
        self.select(|r| r.status.is_active())
    }

    pub fn get_request_by_id(&self, id: RequestId) -> Option<ServiceRequest> {
        self.state
            .read()
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn select(&self, predicate: impl Fn(&ServiceRequest) -> bool) -> Vec<ServiceRequest> {
        self.state
            .read()
            .requests
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    // -- filters -------------------------------------------------------------

    /// Merge `partial` into the stored filters. Local only.
    pub fn set_filters(&self, partial: RequestFilters) {
        let mut state = self.state.write();
        state.filters = partial.merged_over(&state.filters);
    }

    /// Deactivate one stored predicate and keep the rest.
    pub fn clear_filter(&self, key: FilterKey) {
        self.state.write().filters.clear(key);
    }

    /// Replace the stored filters wholesale.
    pub fn replace_filters(&self, filters: RequestFilters) {
        self.state.write().filters = filters;
    }

    pub fn reset_filters(&self) {
        self.state.write().filters = RequestFilters::default();
    }

    // -- bookkeeping ---------------------------------------------------------

    fn begin(&self, loading: bool) {
        let mut state = self.state.write();
        state.error = None;
        if loading {
            state.loading = true;
        }
    }

    fn fail(&self, err: &ApiError, default: &str) {
        let mut state = self.state.write();
        state.loading = false;
        if let Some(message) = failure_message(err, default) {
            state.error = Some(message);
        }
    }

    /// Replace the entry with the same id, and the focused request if it is
    /// that one. Unknown ids are not inserted.
    fn replace_entry(&self, updated: &ServiceRequest) {
        let mut state = self.state.write();
        if let Some(slot) = state.requests.iter_mut().find(|r| r.id == updated.id) {
            *slot = updated.clone();
        }
        if state
            .current_request
            .as_ref()
            .is_some_and(|current| current.id == updated.id)
        {
            state.current_request = Some(updated.clone());
        }
    }

    // -- actions -------------------------------------------------------------

    /// Load requests matching the stored filters overridden by `params`, and
    /// replace the collection. The stored filters are not changed.
    pub async fn fetch_requests(
        &self,
        params: Option<RequestFilters>,
    ) -> Result<Vec<ServiceRequest>, ApiError> {
        self.fetch_requests_cancellable(params, &CancellationToken::new())
            .await
    }

    /// Like [`fetch_requests`](Self::fetch_requests), abandoned with
    /// [`ApiError::Cancelled`] when `cancel` fires first.
    ///
    /// A response is written to the store unless a newer fetch already
    /// wrote one; a stale response is still returned to the caller.
    /// `loading` stays set while any fetch is running, and is cleared even
    /// if this future is dropped.
    pub async fn fetch_requests_cancellable(
        &self,
        params: Option<RequestFilters>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ServiceRequest>, ApiError> {
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = FetchGuard::start(self);
        let query = params
            .unwrap_or_default()
            .merged_over(&self.state.read().filters);
        debug!(generation, "Fetching requests");

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.api.list(&query) => result,
        };

        let mut state = self.state.write();
        let is_stale = self.applied_generation.load(Ordering::SeqCst) > generation;
        match result {
            Ok(requests) => {
                if is_stale {
                    debug!(generation, "Discarding stale request list");
                } else {
                    self.applied_generation.store(generation, Ordering::SeqCst);
                    state.requests = requests.clone();
                    debug!(generation, count = requests.len(), "Requests loaded");
                }
                Ok(requests)
            }
            Err(ApiError::Cancelled) => {
                debug!(generation, "Request fetch cancelled");
                Err(ApiError::Cancelled)
            }
            Err(err) => {
                warn!(generation, error = %err, "Failed to fetch requests");
                let newer_issued = self.fetch_generation.load(Ordering::SeqCst) > generation;
                if !is_stale && !newer_issued {
                    if let Some(message) = failure_message(&err, LIST_FAILED) {
                        state.error = Some(message);
                    }
                }
                Err(err)
            }
        }
    }

    /// Create a request and put it first in the collection.
    pub async fn create_request(
        &self,
        data: &CreateRequestData,
    ) -> Result<ServiceRequest, ApiError> {
        self.begin(true);
        match self.api.create(data).await {
            Ok(created) => {
                let mut state = self.state.write();
                state.requests.insert(0, created.clone());
                state.loading = false;
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "Failed to create request");
                self.fail(&err, CREATE_FAILED);
                Err(err)
            }
        }
    }

    pub async fn assign_request(
        &self,
        id: RequestId,
        manager_id: UserId,
    ) -> Result<ServiceRequest, ApiError> {
        self.assign(id, manager_id, false).await
    }

    /// Assign even if the backend would refuse because of the manager's
    /// current status or workload.
    pub async fn force_assign_request(
        &self,
        id: RequestId,
        manager_id: UserId,
    ) -> Result<ServiceRequest, ApiError> {
        self.assign(id, manager_id, true).await
    }

    async fn assign(
        &self,
        id: RequestId,
        manager_id: UserId,
        force: bool,
    ) -> Result<ServiceRequest, ApiError> {
        self.begin(false);
        let updated = match self.api.assign(id, manager_id, force).await {
            Ok(updated) => updated,
            Err(err) => {
                warn!(request_id = id, manager_id, force, error = %err, "Failed to assign request");
                self.fail(&err, ASSIGN_FAILED);
                return Err(err);
            }
        };
        self.replace_entry(&updated);
        info!(request_id = id, manager_id, force, "Request assigned");

        if let Err(err) = self
            .managers
            .sync_manager_status(manager_id, ManagerStatus::Busy, Some(id))
            .await
        {
            warn!(
                request_id = id,
                manager_id,
                error = %err,
                "Request assigned but manager status was not saved"
            );
        }
        Ok(updated)
    }

    /// Change a request's status. A terminal status releases the manager
    /// that held the request, unless the request was already terminal.
    pub async fn update_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
        comment: Option<&str>,
    ) -> Result<ServiceRequest, ApiError> {
        let previous = {
            let state = self.state.read();
            state
                .requests
                .iter()
                .chain(state.current_request.iter())
                .find(|r| r.id == id)
                .map(|r| (r.status, r.manager_id()))
        };

        self.begin(false);
        let updated = match self.api.update_status(id, status, comment).await {
            Ok(updated) => updated,
            Err(err) => {
                warn!(request_id = id, %status, error = %err, "Failed to update request status");
                self.fail(&err, STATUS_FAILED);
                return Err(err);
            }
        };
        self.replace_entry(&updated);
        info!(request_id = id, %status, "Request status updated");

        let was_terminal = previous.is_some_and(|(s, _)| s.is_terminal());
        if status.is_terminal() && !was_terminal {
            let manager_id = previous
                .and_then(|(_, manager)| manager)
                .or_else(|| updated.manager_id());
            if let Some(manager_id) = manager_id {
                if let Err(err) = self
                    .managers
                    .sync_manager_status(manager_id, ManagerStatus::Available, None)
                    .await
                {
                    warn!(
                        request_id = id,
                        manager_id,
                        error = %err,
                        "Request closed but manager release was not saved"
                    );
                }
            }
        }
        Ok(updated)
    }

    pub async fn add_to_blacklist(
        &self,
        id: RequestId,
        reason: &str,
    ) -> Result<ServiceRequest, ApiError> {
        self.begin(false);
        match self.api.blacklist(id, reason).await {
            Ok(updated) => {
                self.replace_entry(&updated);
                info!(request_id = id, "Client blacklisted");
                Ok(updated)
            }
            Err(err) => {
                warn!(request_id = id, error = %err, "Failed to blacklist client");
                self.fail(&err, BLACKLIST_FAILED);
                Err(err)
            }
        }
    }

    /// Load one request and focus it as `current_request`.
    pub async fn fetch_request_details(&self, id: RequestId) -> Result<ServiceRequest, ApiError> {
        self.begin(true);
        match self.api.details(id).await {
            Ok(request) => {
                let mut state = self.state.write();
                state.current_request = Some(request.clone());
                state.loading = false;
                Ok(request)
            }
            Err(err) => {
                warn!(request_id = id, error = %err, "Failed to load request details");
                self.fail(&err, DETAILS_FAILED);
                Err(err)
            }
        }
    }

    pub fn reset_current_request(&self) {
        self.state.write().current_request = None;
    }
}
