//! Employee wire types shared by the store and its callers.
//!
//! These types must not depend on native-only crates so they stay usable
//! from a WASM front end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use staffdesk_auth::Role;
use staffdesk_core::{EmployeeId, Entity};

/// Employee record as returned by the API.
///
/// Fields the client does not interpret are kept in `extra` so a record
/// written back to the server loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    #[serde(default)]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EmployeeId>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Employee {
    pub fn new(id: impl Into<EmployeeId>, department: impl Into<String>, active: bool) -> Self {
        Self {
            id: id.into(),
            department: department.into(),
            manager_id: None,
            active,
            role: None,
            first_name: None,
            last_name: None,
            email: None,
            position: None,
            hire_date: None,
            extra: Map::new(),
        }
    }

    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for create (`POST`) and partial update (`PATCH`).
///
/// Absent fields are not serialized, so a patch only touches what it sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EmployeeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmployeeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn manager(mut self, manager_id: impl Into<EmployeeId>) -> Self {
        self.manager_id = Some(manager_id.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set a field the typed draft does not model.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Restrictions for `GET /employees`. Absent options impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub active: Option<bool>,
}

impl EmployeeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn manager(mut self, manager_id: impl Into<EmployeeId>) -> Self {
        self.manager_id = Some(manager_id.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Query pairs in `department`, `managerId`, `active` order.
    ///
    /// Empty strings count as absent; `active=false` is a real constraint.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(department) = self.department.as_deref().filter(|d| !d.is_empty()) {
            query.push(("department".to_string(), department.to_string()));
        }
        if let Some(manager_id) = self.manager_id.as_ref().filter(|m| !m.as_str().is_empty()) {
            query.push(("managerId".to_string(), manager_id.to_string()));
        }
        if let Some(active) = self.active {
            query.push(("active".to_string(), active.to_string()));
        }
        query
    }
}
