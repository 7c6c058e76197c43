//! Navigation guard: pure allow/redirect decision evaluated before a route
//! change is committed.

use staffdesk_auth::Role;

use super::routes::{DASHBOARD, LOGIN};
use super::{ResolvedRoute, RouteTarget};

/// Query parameter carrying the originally requested path to the login page.
pub const REDIRECT_QUERY: &str = "redirect";

/// The slice of session state the guard needs.
pub trait SessionView: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn role(&self) -> Option<Role>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(RouteTarget),
}

/// Decide whether navigation to `to` may proceed. First match wins:
///
/// 1. auth required, unauthenticated → login, with `redirect=<full path>`
/// 2. auth required, role set declared, role not in it → landing route
/// 3. target is the login route, already authenticated → landing route
/// 4. allow
pub fn decide(to: &ResolvedRoute, session: &dyn SessionView) -> NavigationDecision {
    let authenticated = session.is_authenticated();

    if to.meta.requires_auth && !authenticated {
        return NavigationDecision::Redirect(
            RouteTarget::named(LOGIN).with_query(REDIRECT_QUERY, to.full_path.clone()),
        );
    }

    if to.meta.requires_auth {
        if let Some(roles) = &to.meta.roles {
            let permitted = session.role().is_some_and(|role| roles.contains(&role));
            if !permitted {
                return NavigationDecision::Redirect(RouteTarget::named(DASHBOARD));
            }
        }
    }

    if to.name == LOGIN && authenticated {
        return NavigationDecision::Redirect(RouteTarget::named(DASHBOARD));
    }

    NavigationDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::{EMPLOYEES, NEW_EMPLOYEE, editor_roles};
    use crate::router::{RouteMeta, RouteRecord, Router};
    use proptest::prelude::*;
    use std::sync::Arc;

    struct FixedSession(Option<Role>);

    impl SessionView for FixedSession {
        fn is_authenticated(&self) -> bool {
            self.0.is_some()
        }

        fn role(&self) -> Option<Role> {
            self.0.clone()
        }
    }

    fn resolve(path: &str) -> ResolvedRoute {
        Router::new(crate::router::default_routes(), Arc::new(FixedSession(None)))
            .unwrap()
            .resolve(&RouteTarget::path(path))
            .unwrap()
    }

    fn route_with(meta: RouteMeta) -> ResolvedRoute {
        ResolvedRoute {
            name: "target".into(),
            path: "/target/7".into(),
            full_path: "/target/7?tab=history".into(),
            params: Default::default(),
            query: Default::default(),
            meta,
        }
    }

    #[test]
    fn unauthenticated_protected_route_goes_to_login_with_return_target() {
        let to = resolve("/employees/e9/edit");
        let decision = decide(&to, &FixedSession(None));
        assert_eq!(
            decision,
            NavigationDecision::Redirect(
                RouteTarget::named(LOGIN).with_query(REDIRECT_QUERY, "/employees/e9/edit")
            )
        );
    }

    #[test]
    fn wrong_role_is_silently_sent_to_landing() {
        let to = resolve("/employees/new");
        assert_eq!(to.name, NEW_EMPLOYEE);
        assert_eq!(
            decide(&to, &FixedSession(Some(Role::EMPLOYEE))),
            NavigationDecision::Redirect(RouteTarget::named(DASHBOARD))
        );
        assert_eq!(decide(&to, &FixedSession(Some(Role::HR))), NavigationDecision::Allow);
    }

    #[test]
    fn authenticated_user_cannot_open_login() {
        let to = resolve("/login");
        assert_eq!(
            decide(&to, &FixedSession(Some(Role::ADMIN))),
            NavigationDecision::Redirect(RouteTarget::named(DASHBOARD))
        );
        assert_eq!(decide(&to, &FixedSession(None)), NavigationDecision::Allow);
    }

    #[test]
    fn public_and_plain_protected_routes_are_allowed() {
        assert_eq!(decide(&resolve("/missing"), &FixedSession(None)), NavigationDecision::Allow);
        assert_eq!(resolve("/employees").name, EMPLOYEES);
        assert_eq!(
            decide(&resolve("/employees"), &FixedSession(Some(Role::EMPLOYEE))),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn roles_without_requires_auth_are_not_checked() {
        let to = route_with(RouteMeta {
            requires_auth: false,
            roles: Some(editor_roles()),
        });
        assert_eq!(decide(&to, &FixedSession(None)), NavigationDecision::Allow);
    }

    #[test]
    fn default_table_uses_editor_roles() {
        let records: Vec<RouteRecord> = crate::router::default_routes();
        let new = records.iter().find(|r| r.name == NEW_EMPLOYEE).unwrap();
        assert_eq!(new.meta.roles.as_deref(), Some(editor_roles().as_slice()));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::ADMIN),
            Just(Role::HR),
            Just(Role::MANAGER),
            Just(Role::EMPLOYEE),
        ]
    }

    proptest! {
        /// Property: unauthenticated access to a protected route always
        /// lands on login with the original full path preserved.
        #[test]
        fn unauthenticated_always_redirects_to_login(
            roles in proptest::option::of(proptest::collection::vec(any_role(), 0..4))
        ) {
            let to = route_with(RouteMeta { requires_auth: true, roles });
            let expected = NavigationDecision::Redirect(
                RouteTarget::named(LOGIN).with_query(REDIRECT_QUERY, "/target/7?tab=history"),
            );
            prop_assert_eq!(decide(&to, &FixedSession(None)), expected);
        }

        /// Property: for authenticated sessions on role-gated routes,
        /// navigation is allowed iff the role is in the declared set.
        #[test]
        fn role_gate_is_membership(
            role in any_role(),
            roles in proptest::collection::vec(any_role(), 0..4)
        ) {
            let member = roles.contains(&role);
            let to = route_with(RouteMeta { requires_auth: true, roles: Some(roles) });
            let decision = decide(&to, &FixedSession(Some(role)));
            if member {
                prop_assert_eq!(decision, NavigationDecision::Allow);
            } else {
                prop_assert_eq!(decision, NavigationDecision::Redirect(RouteTarget::named(DASHBOARD)));
            }
        }
    }
}
