use serde::{Deserialize, Serialize};

use staffdesk_core::{DomainError, DomainResult};

use crate::UserProfile;

/// Login form payload sent to `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Required-field check done before anything is sent.
    pub fn validate(&self) -> DomainResult<()> {
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        Ok(())
    }
}

// Never print the password, not even in debug logs.
impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}
