//! Session store: token lifecycle, role evaluation and credential
//! propagation.
//!
//! State lives in a shared `SessionContext` so the router (read side) and the
//! forced-logout listener (teardown side) can reach it without holding the
//! store itself, which owns the API client.

use std::sync::{Arc, Mutex};

use staffdesk_auth::{Credentials, LoginResponse, Role, RoleRequirement, UserProfile, role_satisfies};
use staffdesk_events::{ClientSignal, EventBus, EventListener, InMemoryEventBus, SessionEndReason};

use crate::api::{ApiClient, decode};
use crate::error::ClientError;
use crate::router::routes::{DASHBOARD, LOGIN};
use crate::router::{Navigator, RouteTarget, SessionView};
use crate::status::{HasStatus, InFlight, OperationStatus, lock};
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::transport::{ApiRequest, CredentialSlot, Method, TransportError};

pub const LOGIN_PATH: &str = "/auth/login";
const LOGIN_FALLBACK: &str = "Login failed";

/// Session state as exposed to the UI.
///
/// `token` and `user` are always both present or both absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub status: OperationStatus,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl HasStatus for Session {
    fn status_mut(&mut self) -> &mut OperationStatus {
        &mut self.status
    }
}

/// Shared session state plus its persistence and credential mirrors.
pub struct SessionContext {
    state: Mutex<Session>,
    storage: Arc<dyn SessionStorage>,
    credentials: Arc<CredentialSlot>,
    signals: Arc<InMemoryEventBus<ClientSignal>>,
}

impl SessionContext {
    /// Build the context from whatever a previous run persisted.
    ///
    /// A half-written pair (token without user, user without token, or an
    /// unparsable user) counts as no session and is wiped.
    pub fn rehydrate(
        storage: Arc<dyn SessionStorage>,
        credentials: Arc<CredentialSlot>,
        signals: Arc<InMemoryEventBus<ClientSignal>>,
    ) -> Self {
        let token = storage.get(TOKEN_KEY);
        let user = storage.get(USER_KEY);

        let session = match (token, user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<UserProfile>(&raw_user) {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "session restored from storage");
                    Session {
                        token: Some(token),
                        user: Some(user),
                        status: OperationStatus::default(),
                    }
                }
                Err(err) => {
                    tracing::warn!("discarding stored session: user profile unreadable: {err}");
                    wipe(storage.as_ref());
                    Session::default()
                }
            },
            (None, None) => Session::default(),
            _ => {
                tracing::warn!("discarding incomplete stored session");
                wipe(storage.as_ref());
                Session::default()
            }
        };

        Self {
            state: Mutex::new(session),
            storage,
            credentials,
            signals,
        }
    }

    pub fn snapshot(&self) -> Session {
        lock(&self.state).clone()
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.state).token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        lock(&self.state).user.clone()
    }

    pub fn has_role(&self, requirement: &RoleRequirement) -> bool {
        let state = lock(&self.state);
        role_satisfies(state.user.as_ref().map(|u| &u.role), requirement)
    }

    /// Install the current token as the outgoing credential.
    pub fn install_credentials(&self) -> bool {
        match self.token() {
            Some(token) => {
                self.credentials.install(token);
                true
            }
            None => false,
        }
    }

    /// Commit a successful login: memory, storage, credential, in that order.
    fn commit(&self, response: &LoginResponse) {
        {
            let mut state = lock(&self.state);
            state.token = Some(response.access_token.clone());
            state.user = Some(response.user.clone());
        }

        self.storage.set(TOKEN_KEY, &response.access_token);
        match serde_json::to_string(&response.user) {
            Ok(raw) => self.storage.set(USER_KEY, &raw),
            Err(err) => tracing::error!("failed to serialize user profile for storage: {err}"),
        }
        self.credentials.install(response.access_token.clone());

        self.emit(ClientSignal::session_started(response.user.id.clone()));
    }

    /// Drop the session everywhere. Always succeeds.
    pub fn clear(&self, reason: SessionEndReason) {
        let had_session = {
            let mut state = lock(&self.state);
            let had = state.token.is_some();
            state.token = None;
            state.user = None;
            had
        };

        wipe(self.storage.as_ref());
        self.credentials.clear();

        if had_session {
            self.emit(ClientSignal::session_ended(reason));
        }
    }

    fn emit(&self, signal: ClientSignal) {
        if let Err(e) = self.signals.publish(signal) {
            tracing::error!("failed to publish session signal: {e:?}");
        }
    }
}

impl SessionView for SessionContext {
    fn is_authenticated(&self) -> bool {
        lock(&self.state).is_authenticated()
    }

    fn role(&self) -> Option<Role> {
        lock(&self.state).user.as_ref().map(|u| u.role.clone())
    }
}

impl core::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("SessionContext")
            .field("authenticated", &state.is_authenticated())
            .field("user", &state.user.as_ref().map(|u| u.id.to_string()))
            .field("status", &state.status)
            .finish()
    }
}

fn wipe(storage: &dyn SessionStorage) {
    storage.remove(TOKEN_KEY);
    storage.remove(USER_KEY);
}

fn go_to_login(navigator: &dyn Navigator) {
    if let Err(err) = navigator.push(RouteTarget::named(LOGIN)) {
        tracing::warn!("navigation to {LOGIN} failed: {err}");
    }
}

/// Authentication store consumed by the UI.
pub struct SessionStore {
    context: Arc<SessionContext>,
    api: Arc<ApiClient>,
    navigator: Arc<dyn Navigator>,
}

impl SessionStore {
    pub fn new(context: Arc<SessionContext>, api: Arc<ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            context,
            api,
            navigator,
        }
    }

    /// Authenticate and, on success, start a session and navigate to the
    /// dashboard.
    ///
    /// On failure the previous token/user are left untouched and `error`
    /// holds the server message (or a generic fallback).
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        let in_flight = InFlight::begin(&self.context.state);
        tracing::info!(email = %credentials.email, "login attempt");

        let result = match serde_json::to_value(credentials) {
            Ok(body) => {
                self.api
                    .send_anonymous(ApiRequest::new(Method::Post, LOGIN_PATH).with_body(body))
                    .await
            }
            Err(e) => Err(TransportError::Encode(e.to_string())),
        };
        let response = result.and_then(|resp| decode::<LoginResponse>(resp.data));

        match response {
            Ok(response) => {
                self.context.commit(&response);
                tracing::info!(user_id = %response.user.id, role = %response.user.role, "login succeeded");
                if let Err(err) = self.navigator.push(RouteTarget::named(DASHBOARD)) {
                    tracing::warn!("post-login navigation failed: {err}");
                }
                Ok(response)
            }
            Err(source) => {
                let message = source.server_message().unwrap_or(LOGIN_FALLBACK).to_string();
                tracing::warn!(error = %source, "login failed");
                in_flight.fail(message.clone());
                Err(ClientError::Authentication { message, source })
            }
        }
    }

    /// Re-install the credential for a rehydrated session. No network.
    pub fn check_auth(&self) -> bool {
        self.context.install_credentials()
    }

    /// End the session and navigate to the login route. Always succeeds.
    pub fn logout(&self) {
        tracing::info!("logout");
        self.context.clear(SessionEndReason::Logout);
        go_to_login(self.navigator.as_ref());
    }

    /// False when unauthenticated; otherwise whether the user's role equals
    /// the given role or belongs to the given set.
    pub fn has_role(&self, requirement: impl Into<RoleRequirement>) -> bool {
        self.context.has_role(&requirement.into())
    }

    pub fn is_authenticated(&self) -> bool {
        self.context.is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.context.token()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.context.user()
    }

    pub fn loading(&self) -> bool {
        lock(&self.context.state).status.loading
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.context.state).status.error.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.context.snapshot()
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }
}

/// Single consumer of `AuthorizationExpired`: tears the session down and
/// sends the user to the login route.
pub struct ForcedLogout {
    context: Arc<SessionContext>,
    navigator: Arc<dyn Navigator>,
}

impl ForcedLogout {
    pub fn new(context: Arc<SessionContext>, navigator: Arc<dyn Navigator>) -> Self {
        Self { context, navigator }
    }
}

impl EventListener<ClientSignal> for ForcedLogout {
    fn on_event(&self, message: &ClientSignal) {
        if let ClientSignal::AuthorizationExpired { method, path, .. } = message {
            tracing::warn!(%method, %path, "credential rejected; forcing logout");
            self.context.clear(SessionEndReason::Expired);
            go_to_login(self.navigator.as_ref());
        }
    }
}
