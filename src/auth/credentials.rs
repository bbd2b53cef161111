//! # Credential Store
//!
//! Static table of username/password/role triples, provisioned once at
//! startup and immutable afterwards. Lookup is a linear scan with exact,
//! case-sensitive comparison of both fields.
//!
//! Comparison is not constant-time: the credential set is static and
//! non-rotating, so the timing side-channel is an accepted trade-off.

use serde::Deserialize;

use super::role::Role;

/// One provisioned user.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Immutable table of provisioned users.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: Vec<Credential>,
}

impl CredentialStore {
    pub fn new(users: Vec<Credential>) -> Self {
        Self { users }
    }

    /// The table the device ships with.
    pub fn builtin() -> Self {
        let user = |username: &str, password: &str, role| Credential {
            username: username.to_string(),
            password: password.to_string(),
            role,
        };
        Self::new(vec![
            user("admin", "admin123", Role::Admin),
            user("moderator", "mod123", Role::Moderator),
            user("viewer", "view123", Role::Viewer),
            user("guest", "guest123", Role::Guest),
        ])
    }

    /// Returns the matching record only on exact match of both fields.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Credential> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_exact_match() {
        let store = CredentialStore::builtin();
        let cred = store.authenticate("moderator", "mod123").unwrap();
        assert_eq!(cred.role, Role::Moderator);
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let store = CredentialStore::builtin();
        assert!(store.authenticate("moderator", "wrong").is_none());
    }

    #[test]
    fn test_authenticate_unknown_user() {
        let store = CredentialStore::builtin();
        assert!(store.authenticate("nobody", "mod123").is_none());
    }

    #[test]
    fn test_authenticate_case_sensitive() {
        let store = CredentialStore::builtin();
        assert!(store.authenticate("Moderator", "mod123").is_none());
        assert!(store.authenticate("moderator", "MOD123").is_none());
    }
}
