//! Application wiring: everything constructed once, in dependency order.
//!
//! Ownership is a DAG: the router reads the session context, the session
//! store drives the API client and the router, and the API client reaches
//! session teardown only through the signal bus.

use std::sync::Arc;

use thiserror::Error;

use staffdesk_events::{ClientSignal, EventBus, InMemoryEventBus};

use crate::api::ApiClient;
use crate::employees::EmployeeStore;
use crate::router::{Navigator, ResolvedRoute, RouteError, RouteRecord, RouteTarget, Router, default_routes};
use crate::session::{ForcedLogout, SessionContext, SessionStore};
use crate::storage::SessionStorage;
use crate::transport::{CredentialSlot, HttpBackend};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),

    #[error("failed to register session listener: {0}")]
    Signals(String),
}

/// Application state shared with the UI layer.
#[derive(Clone)]
pub struct AppState {
    pub signals: Arc<InMemoryEventBus<ClientSignal>>,
    pub credentials: Arc<CredentialSlot>,
    pub router: Arc<Router>,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub employees: Arc<EmployeeStore>,
}

impl AppState {
    /// Wire the stores with the default route table.
    ///
    /// The session is rehydrated from `storage` and its credential
    /// re-installed before this returns, so the first navigation already
    /// sees it.
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, AppError> {
        Self::with_routes(backend, storage, default_routes())
    }

    pub fn with_routes(
        backend: Arc<dyn HttpBackend>,
        storage: Arc<dyn SessionStorage>,
        routes: Vec<RouteRecord>,
    ) -> Result<Self, AppError> {
        let signals = Arc::new(InMemoryEventBus::new());
        let credentials = Arc::new(CredentialSlot::new());

        let context = Arc::new(SessionContext::rehydrate(
            storage,
            credentials.clone(),
            signals.clone(),
        ));
        let router = Arc::new(Router::new(routes, context.clone())?);
        let navigator: Arc<dyn Navigator> = router.clone();

        let api = Arc::new(ApiClient::new(backend, credentials.clone(), signals.clone()));

        signals
            .listen(Arc::new(ForcedLogout::new(context.clone(), navigator.clone())))
            .map_err(|e| AppError::Signals(format!("{e:?}")))?;

        let session = Arc::new(SessionStore::new(context, api.clone(), navigator));
        if session.check_auth() {
            tracing::info!("credential re-installed for restored session");
        }

        let employees = Arc::new(EmployeeStore::new(api.clone()));

        Ok(Self {
            signals,
            credentials,
            router,
            api,
            session,
            employees,
        })
    }

    /// Wire against the real API and the on-disk session file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_config(config: &crate::config::ClientConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        use crate::http::ReqwestBackend;
        use crate::storage::{FileSessionStorage, default_storage_path};

        let backend = ReqwestBackend::with_timeout(config.api_url.clone(), config.request_timeout)
            .context("failed to build HTTP client")?;

        let path = match &config.storage_path {
            Some(path) => path.clone(),
            None => default_storage_path()?,
        };
        let storage = FileSessionStorage::open(&path)
            .with_context(|| format!("failed to open session storage at {:?}", path))?;

        tracing::info!(api_url = %config.api_url, storage = ?path, "client configured");
        Ok(Self::new(Arc::new(backend), Arc::new(storage))?)
    }

    /// Run the initial navigation (the page the user opened).
    pub fn start(&self, initial: RouteTarget) -> Result<ResolvedRoute, RouteError> {
        self.router.push(initial)
    }
}
