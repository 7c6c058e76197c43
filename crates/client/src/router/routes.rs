//! Route table schema and the application's default routes.

use staffdesk_auth::Role;

/// Per-route metadata consulted by the navigation guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub roles: Option<Vec<Role>>,
}

impl RouteMeta {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            roles: None,
        }
    }

    pub fn with_roles(roles: impl Into<Vec<Role>>) -> Self {
        Self {
            requires_auth: true,
            roles: Some(roles.into()),
        }
    }
}

/// A declared route. Child paths without a leading `/` are relative to the
/// parent's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub name: String,
    pub path: String,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

pub const LOGIN: &str = "login";
pub const DASHBOARD: &str = "dashboard";
pub const EMPLOYEES: &str = "employees";
pub const EMPLOYEE_DETAIL: &str = "employee-detail";
pub const NEW_EMPLOYEE: &str = "new-employee";
pub const EDIT_EMPLOYEE: &str = "edit-employee";
pub const NOT_FOUND: &str = "not-found";

/// Roles allowed to create or edit employee records.
pub fn editor_roles() -> Vec<Role> {
    vec![Role::ADMIN, Role::HR, Role::MANAGER]
}

pub fn default_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new(LOGIN, "/login", RouteMeta::public()),
        RouteRecord::new(DASHBOARD, "/", RouteMeta::authenticated()),
        RouteRecord::new(EMPLOYEES, "/employees", RouteMeta::authenticated()),
        RouteRecord::new(EMPLOYEE_DETAIL, "/employees/:id", RouteMeta::authenticated()),
        RouteRecord::new(NEW_EMPLOYEE, "/employees/new", RouteMeta::with_roles(editor_roles())),
        RouteRecord::new(EDIT_EMPLOYEE, "/employees/:id/edit", RouteMeta::with_roles(editor_roles())),
        RouteRecord::new(NOT_FOUND, "/:pathMatch(.*)*", RouteMeta::public()),
    ]
}
