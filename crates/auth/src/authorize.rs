use crate::{Role, RoleRequirement};

/// Evaluate a role requirement against the current user's role.
///
/// - No IO
/// - No panics
/// - An absent role (unauthenticated) never satisfies anything
pub fn role_satisfies(role: Option<&Role>, requirement: &RoleRequirement) -> bool {
    match role {
        Some(role) => requirement.is_met_by(role),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unauthenticated_never_satisfies() {
        assert!(!role_satisfies(None, &Role::ADMIN.into()));
        assert!(!role_satisfies(None, &RoleRequirement::AnyOf(vec![])));
    }

    #[test]
    fn exact_and_set_checks() {
        let hr = Role::HR;
        assert!(role_satisfies(Some(&hr), &"hr".into()));
        assert!(!role_satisfies(Some(&hr), &Role::ADMIN.into()));
        assert!(role_satisfies(Some(&hr), &[Role::ADMIN, Role::HR].into()));
        assert!(!role_satisfies(Some(&hr), &RoleRequirement::AnyOf(vec![])));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::ADMIN),
            Just(Role::HR),
            Just(Role::MANAGER),
            Just(Role::EMPLOYEE),
            "[a-z]{1,8}".prop_map(Role::new),
        ]
    }

    proptest! {
        /// Property: a set check is exactly membership.
        #[test]
        fn set_check_is_membership(role in any_role(), set in proptest::collection::vec(any_role(), 0..5)) {
            let expected = set.contains(&role);
            prop_assert_eq!(role_satisfies(Some(&role), &RoleRequirement::AnyOf(set)), expected);
        }
    }
}
