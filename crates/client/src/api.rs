//! Shared API client with the two interceptor hooks.
//!
//! - Outgoing: attach the bearer credential (read from the injected
//!   `CredentialProvider`) and a request id.
//! - Incoming: a 401 answer to any session-scoped request publishes
//!   `ClientSignal::AuthorizationExpired` before the error is returned, so the
//!   session listener has already torn the session down when the caller sees
//!   the failure. Anonymous requests (login) never publish it.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use staffdesk_events::{ClientSignal, EventBus, InMemoryEventBus};

use crate::transport::{
    ApiRequest, ApiResponse, AUTHORIZATION, CredentialProvider, HttpBackend, Method, REQUEST_ID,
    TransportError,
};

pub struct ApiClient {
    backend: Arc<dyn HttpBackend>,
    credentials: Arc<dyn CredentialProvider>,
    signals: Arc<InMemoryEventBus<ClientSignal>>,
}

impl ApiClient {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        credentials: Arc<dyn CredentialProvider>,
        signals: Arc<InMemoryEventBus<ClientSignal>>,
    ) -> Self {
        Self {
            backend,
            credentials,
            signals,
        }
    }

    /// Issue a request with the current credential attached.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let request = self.intercept_request(request, true);
        self.dispatch(request, true).await
    }

    /// Issue a request without any credential (login).
    ///
    /// A 401 here means "bad credentials", never "session expired", so it
    /// does not reach the session listener.
    pub async fn send_anonymous(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let request = self.intercept_request(request, false);
        self.dispatch(request, false).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, TransportError> {
        let resp = self
            .send(ApiRequest::new(Method::Get, path).with_query(query))
            .await?;
        decode(resp.data)
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let resp = self
            .send(ApiRequest::new(Method::Post, path).with_body(encode(body)?))
            .await?;
        decode(resp.data)
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let resp = self
            .send(ApiRequest::new(Method::Patch, path).with_body(encode(body)?))
            .await?;
        decode(resp.data)
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.send(ApiRequest::new(Method::Delete, path)).await
    }

    /// The credential the next request would carry.
    pub fn current_credential(&self) -> Option<String> {
        self.credentials.bearer_token()
    }

    fn intercept_request(&self, mut request: ApiRequest, with_credential: bool) -> ApiRequest {
        if with_credential {
            if let Some(token) = self.credentials.bearer_token() {
                request
                    .headers
                    .insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
            }
        }
        request
            .headers
            .entry(REQUEST_ID.to_string())
            .or_insert_with(|| Uuid::now_v7().to_string());
        request
    }

    async fn dispatch(
        &self,
        request: ApiRequest,
        session_scoped: bool,
    ) -> Result<ApiResponse, TransportError> {
        let method = request.method;
        let path = request.path.clone();
        let authenticated = request.is_authenticated();
        let request_id = request.header(REQUEST_ID).unwrap_or_default().to_string();

        tracing::debug!(%method, %path, %request_id, authenticated, "dispatching request");

        match self.backend.send(request).await {
            Ok(resp) => Ok(resp),
            Err(err) => {
                tracing::warn!(%method, %path, %request_id, error = %err, "request failed");
                if err.is_unauthorized() && session_scoped {
                    self.on_unauthorized(method, &path);
                }
                Err(err)
            }
        }
    }

    fn on_unauthorized(&self, method: Method, path: &str) {
        let signal = ClientSignal::authorization_expired(method.as_str(), path);
        if let Err(e) = self.signals.publish(signal) {
            tracing::error!("failed to publish authorization-expired signal: {e:?}");
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, TransportError> {
    serde_json::to_value(body).map_err(|e| TransportError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(data: Value) -> Result<T, TransportError> {
    serde_json::from_value(data).map_err(|e| TransportError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::CredentialSlot;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Rejecting {
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl HttpBackend for Rejecting {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Err(TransportError::from_status(401, &json!({})))
        }
    }

    fn client(token: Option<&str>) -> (ApiClient, Arc<Rejecting>, Arc<InMemoryEventBus<ClientSignal>>) {
        let backend = Arc::new(Rejecting::default());
        let slot = Arc::new(CredentialSlot::new());
        if let Some(token) = token {
            slot.install(token);
        }
        let bus = Arc::new(InMemoryEventBus::new());
        (ApiClient::new(backend.clone(), slot, bus.clone()), backend, bus)
    }

    #[tokio::test]
    async fn unauthorized_session_request_publishes_expiry() {
        let (api, backend, bus) = client(Some("t1"));
        let signals = bus.subscribe();

        let err = api.delete("/employees/e1").await.unwrap_err();
        assert!(err.is_unauthorized());

        let sent = backend.seen.lock().unwrap()[0].clone();
        assert_eq!(sent.header(AUTHORIZATION), Some("Bearer t1"));
        assert!(sent.header(REQUEST_ID).is_some());

        match signals.drain().as_slice() {
            [ClientSignal::AuthorizationExpired { method, path, .. }] => {
                assert_eq!(method, "DELETE");
                assert_eq!(path, "/employees/e1");
            }
            other => panic!("unexpected signals: {other:?}"),
        }
    }

    #[tokio::test]
    async fn anonymous_request_carries_no_credential_and_stays_silent() {
        let (api, backend, bus) = client(Some("t1"));
        let signals = bus.subscribe();

        api.send_anonymous(ApiRequest::new(Method::Post, "/auth/login"))
            .await
            .unwrap_err();

        assert!(!backend.seen.lock().unwrap()[0].is_authenticated());
        assert!(signals.drain().is_empty());
    }

    #[tokio::test]
    async fn caller_supplied_request_id_is_kept() {
        let (api, backend, _bus) = client(None);
        let mut request = ApiRequest::new(Method::Get, "/employees");
        request.headers.insert(REQUEST_ID.to_string(), "fixed".to_string());

        api.send(request).await.unwrap_err();

        let sent = backend.seen.lock().unwrap()[0].clone();
        assert_eq!(sent.header(REQUEST_ID), Some("fixed"));
        assert!(!sent.is_authenticated());
    }
}
