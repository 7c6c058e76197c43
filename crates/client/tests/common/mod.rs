#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;

use staffdesk_client::storage::{TOKEN_KEY, USER_KEY};
use staffdesk_client::{
    ApiRequest, ApiResponse, AppState, HttpBackend, InMemorySessionStorage, TransportError,
};

struct Reply {
    gate: Option<Arc<Notify>>,
    result: Result<Value, TransportError>,
}

/// Backend that answers from a queue and records what it was sent.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ok(&self, data: Value) {
        self.push(None, Ok(data));
    }

    pub fn status(&self, status: u16, body: Value) {
        self.push(None, Err(TransportError::from_status(status, &body)));
    }

    pub fn network_error(&self) {
        self.push(None, Err(TransportError::Network("connection refused".into())));
    }

    /// Queue a reply that is held back until the returned gate is notified.
    pub fn gated_ok(&self, data: Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(Some(gate.clone()), Ok(data));
        gate
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }

    fn push(&self, gate: Option<Arc<Notify>>, result: Result<Value, TransportError>) {
        self.replies.lock().unwrap().push_back(Reply { gate, result });
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request: no scripted reply left");

        if let Some(gate) = reply.gate {
            gate.notified().await;
        }
        reply.result.map(|data| ApiResponse { status: 200, data })
    }
}

pub fn login_body(token: &str, user_id: u64, role: &str) -> Value {
    json!({
        "accessToken": token,
        "user": { "id": user_id, "role": role, "email": "ana@example.com" }
    })
}

pub fn employee(id: &str, department: &str) -> Value {
    json!({ "id": id, "department": department, "active": true, "firstName": "Emp", "lastName": id })
}

/// Storage pre-populated as a previous run would have left it.
pub fn stored_session(token: &str, role: &str) -> Arc<InMemorySessionStorage> {
    let user = json!({ "id": 1, "role": role }).to_string();
    Arc::new(InMemorySessionStorage::with_entries([
        (TOKEN_KEY, token.to_string()),
        (USER_KEY, user),
    ]))
}

pub fn app(backend: &Arc<ScriptedBackend>, storage: Arc<InMemorySessionStorage>) -> AppState {
    AppState::new(backend.clone(), storage).expect("default wiring is valid")
}
