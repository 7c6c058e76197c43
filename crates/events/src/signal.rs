use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use staffdesk_core::UserId;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// The user asked to log out.
    Logout,
    /// The server rejected the credential (401).
    Expired,
}

/// Notifications emitted by the transport and the stores.
///
/// `AuthorizationExpired` is the only signal with a mandatory consumer: the
/// session teardown listener. Everything else is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientSignal {
    /// A request carrying a credential was answered with 401.
    AuthorizationExpired {
        method: String,
        path: String,
        at: DateTime<Utc>,
    },
    SessionStarted {
        user_id: UserId,
        at: DateTime<Utc>,
    },
    SessionEnded {
        reason: SessionEndReason,
        at: DateTime<Utc>,
    },
}

impl ClientSignal {
    pub fn authorization_expired(method: impl Into<String>, path: impl Into<String>) -> Self {
        ClientSignal::AuthorizationExpired {
            method: method.into(),
            path: path.into(),
            at: Utc::now(),
        }
    }

    pub fn session_started(user_id: UserId) -> Self {
        ClientSignal::SessionStarted {
            user_id,
            at: Utc::now(),
        }
    }

    pub fn session_ended(reason: SessionEndReason) -> Self {
        ClientSignal::SessionEnded {
            reason,
            at: Utc::now(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientSignal::AuthorizationExpired { .. } => "authorization_expired",
            ClientSignal::SessionStarted { .. } => "session_started",
            ClientSignal::SessionEnded { .. } => "session_ended",
        }
    }
}
