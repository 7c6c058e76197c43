//! `staffdesk-auth`: identity and role primitives for the client.
//!
//! This crate is intentionally decoupled from HTTP and storage: it models who
//! the user is and what a role check means, nothing about how tokens travel.

pub mod authorize;
pub mod credentials;
pub mod roles;
pub mod user;

pub use authorize::role_satisfies;
pub use credentials::{Credentials, LoginResponse};
pub use roles::{Role, RoleRequirement};
pub use user::UserProfile;
