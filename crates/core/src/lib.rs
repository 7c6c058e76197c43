//! `staffdesk-core`: shared building blocks for the StaffDesk client.
//!
//! This crate contains **pure** primitives (no transport or storage concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EmployeeId, UserId};
