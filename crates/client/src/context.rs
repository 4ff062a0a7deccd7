//! Wiring of the whole client.

use std::sync::Arc;

use crate::api::{
    AuthApi, LocationsApi, NotificationsApi, ReportsApi, RequestsApi, UsersApi,
};
use crate::config::Config;
use crate::gateway::session::{FileTokenStorage, Session, TokenStorage};
use crate::gateway::transport::{ReqwestTransport, Transport, TransportError};
use crate::gateway::HttpGateway;
use crate::guards::GuardChain;
use crate::navigation::Navigator;
use crate::stores::{AuthStore, LocationStore, ManagerStore, RequestStore};

/// Everything a host needs, built once and shared.
pub struct AppContext {
    pub config: Config,
    pub session: Arc<Session>,
    pub gateway: Arc<HttpGateway>,
    pub requests: Arc<RequestStore>,
    pub managers: Arc<ManagerStore>,
    pub locations: Arc<LocationStore>,
    pub auth: Arc<AuthStore>,
    pub reports: ReportsApi,
    pub notifications: NotificationsApi,
    pub guards: Arc<GuardChain>,
}

impl AppContext {
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(Session::new(storage, config.session.token_key.clone()));
        let gateway = Arc::new(HttpGateway::new(
            transport,
            session.clone(),
            navigator.clone(),
        ));

        let managers = Arc::new(ManagerStore::new(UsersApi::new(gateway.clone())));
        let requests = Arc::new(RequestStore::new(
            RequestsApi::new(gateway.clone()),
            managers.clone(),
        ));
        let locations = Arc::new(LocationStore::new(LocationsApi::new(gateway.clone())));
        let auth = Arc::new(AuthStore::new(
            AuthApi::new(gateway.clone()),
            session.clone(),
            navigator,
        ));

        Self {
            reports: ReportsApi::new(gateway.clone()),
            notifications: NotificationsApi::new(gateway.clone()),
            guards: Arc::new(GuardChain::standard(session.clone())),
            config,
            session,
            gateway,
            requests,
            managers,
            locations,
            auth,
        }
    }

    /// Context talking to the configured backend over HTTP, with the token
    /// persisted under `session.storage_dir`.
    pub fn from_config(
        config: Config,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(&config.api)?);
        let storage = Arc::new(FileTokenStorage::new(config.session.storage_dir.clone()));
        tracing::info!(base_url = %config.api.base_url, "Client context initialized");
        Ok(Self::new(config, transport, storage, navigator))
    }
}
