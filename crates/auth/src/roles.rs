use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for coarse-grained gating.
///
/// Roles stay opaque strings so the backend can introduce new ones without a
/// client release; the well-known ones are provided as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const HR: Role = Role(Cow::Borrowed("hr"));
    pub const MANAGER: Role = Role(Cow::Borrowed("manager"));
    pub const EMPLOYEE: Role = Role(Cow::Borrowed("employee"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

/// What a role check asks for: one exact role, or membership in a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    Exactly(Role),
    AnyOf(Vec<Role>),
}

impl RoleRequirement {
    pub fn is_met_by(&self, role: &Role) -> bool {
        match self {
            RoleRequirement::Exactly(required) => required == role,
            RoleRequirement::AnyOf(set) => set.contains(role),
        }
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        RoleRequirement::Exactly(role)
    }
}

impl From<&Role> for RoleRequirement {
    fn from(role: &Role) -> Self {
        RoleRequirement::Exactly(role.clone())
    }
}

impl From<&'static str> for RoleRequirement {
    fn from(role: &'static str) -> Self {
        RoleRequirement::Exactly(Role::new(role))
    }
}

impl From<Vec<Role>> for RoleRequirement {
    fn from(roles: Vec<Role>) -> Self {
        RoleRequirement::AnyOf(roles)
    }
}

impl From<&[Role]> for RoleRequirement {
    fn from(roles: &[Role]) -> Self {
        RoleRequirement::AnyOf(roles.to_vec())
    }
}

impl<const N: usize> From<[Role; N]> for RoleRequirement {
    fn from(roles: [Role; N]) -> Self {
        RoleRequirement::AnyOf(roles.to_vec())
    }
}
