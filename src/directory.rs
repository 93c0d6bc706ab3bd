//! Static dev directory of predefined accounts.
//!
//! One account per role. Used as a fallback dataset by the CLI and to seed
//! the backend's in-memory account store.

use crate::model::{InsurerSize, Role, User};

/// The three predefined accounts: insurer, regulator, admin.
#[must_use]
pub fn mock_users() -> Vec<User> {
    vec![
        User {
            id: "1".into(),
            username: "maisha_insurance".into(),
            role: Role::Insurer,
            email: Some("cfo@maisha.co.ke".into()),
            business_name: Some("Maisha Insurance".into()),
            registration_number: Some("IRA/INS/2019/041".into()),
            region: Some("Nairobi".into()),
            size: Some(InsurerSize::Medium),
        },
        User {
            id: "2".into(),
            username: "regulator_main".into(),
            role: Role::Regulator,
            email: Some("regulator@ira.co.ke".into()),
            business_name: None,
            registration_number: None,
            region: None,
            size: None,
        },
        User {
            id: "3".into(),
            username: "admin_main".into(),
            role: Role::Admin,
            email: Some("admin@ira.co.ke".into()),
            business_name: None,
            registration_number: None,
            region: None,
            size: None,
        },
    ]
}

/// First predefined account holding `role`.
#[must_use]
pub fn find_by_role(role: Role) -> Option<User> {
    mock_users().into_iter().find(|u| u.role == role)
}

/// Look up a predefined account by username or email (case-insensitive).
#[must_use]
pub fn find_by_username(login: &str) -> Option<User> {
    let needle = login.trim();
    mock_users().into_iter().find(|u| {
        u.username.eq_ignore_ascii_case(needle)
            || u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_account_per_role() {
        let users = mock_users();
        assert_eq!(users.len(), 3);
        for role in [Role::Insurer, Role::Regulator, Role::Admin] {
            assert_eq!(users.iter().filter(|u| u.role == role).count(), 1);
        }
    }

    #[test]
    fn only_the_insurer_carries_a_profile() {
        for user in mock_users() {
            assert_eq!(user.is_insurer_profile_complete(), user.role == Role::Insurer);
        }
    }

    #[test]
    fn ids_are_unique() {
        let users = mock_users();
        let mut ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), users.len());
    }

    #[test]
    fn find_by_role_returns_matching_account() {
        let admin = find_by_role(Role::Admin).unwrap();
        assert_eq!(admin.username, "admin_main");
    }

    #[test]
    fn find_by_username_matches_email_or_username() {
        assert_eq!(find_by_username("REGULATOR_MAIN").unwrap().role, Role::Regulator);
        assert_eq!(find_by_username(" cfo@maisha.co.ke ").unwrap().role, Role::Insurer);
        assert!(find_by_username("nobody").is_none());
    }
}
