//! Errors surfaced by the stores.

use thiserror::Error;

use crate::transport::TransportError;

/// Employee-store operation names, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    FetchOne,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchAll => "fetch employees",
            Operation::FetchOne => "fetch employee",
            Operation::Create => "create employee",
            Operation::Update => "update employee",
            Operation::Delete => "delete employee",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Login was rejected (bad credentials, network failure, bad response).
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: TransportError,
    },

    /// An authenticated request was answered with 401.
    ///
    /// The session has already been cleared when this is returned.
    #[error("authorization expired: {message}")]
    AuthorizationExpired { message: String },

    /// Any other CRUD failure.
    #[error("{operation} failed: {message}")]
    ResourceOperation {
        operation: Operation,
        message: String,
        #[source]
        source: TransportError,
    },
}

impl ClientError {
    /// The message recorded in the store's `error` field.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Authentication { message, .. }
            | ClientError::AuthorizationExpired { message }
            | ClientError::ResourceOperation { message, .. } => message,
        }
    }

    /// HTTP status of the failed request, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Authentication { source, .. }
            | ClientError::ResourceOperation { source, .. } => source.status(),
            ClientError::AuthorizationExpired { .. } => Some(401),
        }
    }

    pub fn is_authorization_expired(&self) -> bool {
        matches!(self, ClientError::AuthorizationExpired { .. })
    }

    /// Classify a failed employee-store call.
    pub(crate) fn resource(operation: Operation, message: String, source: TransportError) -> Self {
        if source.is_unauthorized() {
            ClientError::AuthorizationExpired { message }
        } else {
            ClientError::ResourceOperation {
                operation,
                message,
                source,
            }
        }
    }
}
