mod common;

use std::sync::Arc;

use serde_json::json;

use common::{ScriptedBackend, app, login_body, stored_session};
use staffdesk_auth::{Credentials, Role};
use staffdesk_client::router::routes::{DASHBOARD, LOGIN};
use staffdesk_client::storage::{TOKEN_KEY, USER_KEY};
use staffdesk_client::transport::AUTHORIZATION;
use staffdesk_client::{ClientError, InMemorySessionStorage, RouteTarget, SessionStorage};
use staffdesk_events::{ClientSignal, EventBus, SessionEndReason};

fn credentials() -> Credentials {
    Credentials::new("ana@example.com", "secret")
}

#[tokio::test]
async fn login_persists_session_and_lands_on_dashboard() {
    let backend = ScriptedBackend::new();
    let storage = Arc::new(InMemorySessionStorage::new());
    let app = app(&backend, storage.clone());
    let signals = app.signals.subscribe();

    backend.ok(login_body("tok-1", 7, "admin"));
    let response = app.session.login(&credentials()).await.unwrap();

    assert_eq!(response.access_token, "tok-1");
    assert!(app.session.is_authenticated());
    assert_eq!(app.session.token().as_deref(), Some("tok-1"));
    assert_eq!(app.session.user().unwrap().role, Role::ADMIN);
    assert!(!app.session.loading());
    assert_eq!(app.session.error(), None);

    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-1"));
    let stored_user: serde_json::Value = serde_json::from_str(&storage.get(USER_KEY).unwrap()).unwrap();
    assert_eq!(stored_user["role"], "admin");
    assert_eq!(stored_user["id"], 7);

    assert_eq!(app.api.current_credential().as_deref(), Some("tok-1"));
    let landed = app.router.current().unwrap();
    assert_eq!(landed.name, DASHBOARD);
    assert_eq!(landed.path, "/");

    let sent = backend.last_request();
    assert_eq!(sent.path, "/auth/login");
    assert_eq!(sent.body, Some(json!({ "email": "ana@example.com", "password": "secret" })));
    assert!(sent.header(AUTHORIZATION).is_none());

    assert!(matches!(signals.drain().as_slice(), [ClientSignal::SessionStarted { .. }]));
}

#[tokio::test]
async fn requests_after_login_carry_the_bearer_credential() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, Arc::new(InMemorySessionStorage::new()));

    backend.ok(login_body("tok-1", 7, "hr"));
    app.session.login(&credentials()).await.unwrap();

    backend.ok(json!([]));
    app.employees.fetch_employees(&Default::default()).await.unwrap();

    let sent = backend.last_request();
    assert_eq!(sent.header(AUTHORIZATION), Some("Bearer tok-1"));
    assert!(sent.header("X-Request-Id").is_some());
}

#[tokio::test]
async fn failed_login_keeps_previous_session() {
    let backend = ScriptedBackend::new();
    let storage = stored_session("old-token", "manager");
    let app = app(&backend, storage.clone());

    backend.status(401, json!({ "message": "Invalid credentials" }));
    let err = app.session.login(&credentials()).await.unwrap_err();

    assert!(matches!(err, ClientError::Authentication { .. }));
    assert_eq!(err.message(), "Invalid credentials");
    assert_eq!(app.session.error().as_deref(), Some("Invalid credentials"));
    assert!(!app.session.loading());

    assert_eq!(app.session.token().as_deref(), Some("old-token"));
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("old-token"));
    assert_eq!(app.api.current_credential().as_deref(), Some("old-token"));
}

#[tokio::test]
async fn failed_login_without_server_message_uses_fallback() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, Arc::new(InMemorySessionStorage::new()));

    backend.network_error();
    let err = app.session.login(&credentials()).await.unwrap_err();

    assert_eq!(err.message(), "Login failed");
    assert_eq!(app.session.error().as_deref(), Some("Login failed"));
    assert!(!app.session.is_authenticated());
    assert!(app.router.history().is_empty());
}

#[tokio::test]
async fn new_login_clears_previous_error() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, Arc::new(InMemorySessionStorage::new()));

    backend.status(500, json!({}));
    app.session.login(&credentials()).await.unwrap_err();
    assert!(app.session.error().is_some());

    backend.ok(login_body("tok-2", 3, "employee"));
    app.session.login(&credentials()).await.unwrap();
    assert_eq!(app.session.error(), None);
}

#[tokio::test]
async fn loading_is_set_only_while_login_is_in_flight() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, Arc::new(InMemorySessionStorage::new()));
    let gate = backend.gated_ok(login_body("tok-1", 7, "admin"));

    let session = app.session.clone();
    let pending = tokio::spawn(async move { session.login(&credentials()).await });

    while backend.requests().is_empty() {
        tokio::task::yield_now().await;
    }
    assert!(app.session.loading());

    gate.notify_one();
    pending.await.unwrap().unwrap();
    assert!(!app.session.loading());
}

#[tokio::test]
async fn logout_tears_everything_down() {
    let backend = ScriptedBackend::new();
    let storage = stored_session("tok-1", "admin");
    let app = app(&backend, storage.clone());
    let signals = app.signals.subscribe();

    app.session.logout();

    assert!(!app.session.is_authenticated());
    assert_eq!(app.session.user(), None);
    assert!(storage.is_empty());
    assert_eq!(app.api.current_credential(), None);
    assert_eq!(app.router.current().unwrap().name, LOGIN);
    assert!(backend.requests().is_empty());

    let received = signals.drain();
    assert!(matches!(
        received.as_slice(),
        [ClientSignal::SessionEnded { reason: SessionEndReason::Logout, .. }]
    ));

    // Logging out twice is harmless and emits nothing new.
    app.session.logout();
    assert!(signals.drain().is_empty());
}

#[test]
fn rehydrated_session_reinstalls_credential() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, stored_session("tok-9", "hr"));

    assert!(app.session.is_authenticated());
    assert!(app.session.has_role(Role::HR));
    assert_eq!(app.api.current_credential().as_deref(), Some("tok-9"));
    assert!(app.session.check_auth());
}

#[test]
fn incomplete_stored_session_is_discarded() {
    let backend = ScriptedBackend::new();
    let storage = Arc::new(InMemorySessionStorage::with_entries([(TOKEN_KEY, "orphan")]));
    let app = app(&backend, storage.clone());

    assert!(!app.session.is_authenticated());
    assert!(!app.session.check_auth());
    assert_eq!(app.api.current_credential(), None);
    assert!(storage.is_empty());
}

#[test]
fn role_checks_follow_the_session() {
    let backend = ScriptedBackend::new();
    let anonymous = app(&backend, Arc::new(InMemorySessionStorage::new()));
    assert!(!anonymous.session.has_role(Role::ADMIN));
    assert!(!anonymous.session.has_role(vec![Role::ADMIN, Role::HR]));

    let manager = app(&backend, stored_session("t", "manager"));
    assert!(manager.session.has_role(Role::MANAGER));
    assert!(!manager.session.has_role(Role::ADMIN));
    assert!(manager.session.has_role([Role::ADMIN, Role::MANAGER]));
    assert!(!manager.session.has_role(Vec::<Role>::new()));
}

#[test]
fn first_navigation_sees_rehydrated_session() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, stored_session("tok", "employee"));

    let landed = app.start(RouteTarget::path("/employees")).unwrap();
    assert_eq!(landed.path, "/employees");

    // An employee cannot open the editor; the guard sends them home.
    let landed = app.start(RouteTarget::path("/employees/new")).unwrap();
    assert_eq!(landed.name, DASHBOARD);
    assert_eq!(landed.path, "/");

    let landed = app.start(RouteTarget::path("/")).unwrap();
    assert_eq!(landed.name, DASHBOARD);
}

#[test]
fn anonymous_navigation_is_sent_to_login_with_redirect() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, Arc::new(InMemorySessionStorage::new()));

    let landed = app.start(RouteTarget::path("/employees/e9")).unwrap();
    assert_eq!(landed.path, "/login");
    assert_eq!(landed.query_value("redirect"), Some("/employees/e9"));
}

#[test]
fn anonymous_landing_page_redirects_to_login() {
    let backend = ScriptedBackend::new();
    let app = app(&backend, Arc::new(InMemorySessionStorage::new()));

    let landed = app.start(RouteTarget::path("/")).unwrap();
    assert_eq!(landed.name, LOGIN);
    assert_eq!(landed.full_path, "/login?redirect=%2F");
}
