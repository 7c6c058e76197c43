//! `staffdesk-client`
//!
//! **Responsibility:** client-side state for the employee directory.
//!
//! This crate provides:
//! - A session store (login, logout, rehydration, role checks)
//! - An employee store mirroring the server's records
//! - A route table with authentication and role guards
//! - An API client that attaches the session credential and turns a
//!   rejected credential into a forced logout
//!
//! The server stays the authority; nothing here writes without it.

pub mod api;
pub mod app;
pub mod config;
pub mod employees;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod router;
pub mod session;
pub mod status;
pub mod storage;
pub mod transport;
pub mod types;

pub use api::ApiClient;
pub use app::{AppError, AppState};
pub use config::ClientConfig;
pub use employees::{EmployeeCache, EmployeeStore};
pub use error::{ClientError, Operation};
pub use router::{Navigator, ResolvedRoute, RouteError, RouteTarget, Router};
pub use session::{Session, SessionContext, SessionStore};
pub use status::OperationStatus;
pub use storage::{InMemorySessionStorage, SessionStorage};
pub use transport::{ApiRequest, ApiResponse, CredentialSlot, HttpBackend, Method, TransportError};
pub use types::{Employee, EmployeeDraft, EmployeeFilter};
