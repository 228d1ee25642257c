//! Operator directory: username → role and visibility scope.
//!
//! The engine only ever consumes the resolved `(Role, Scope)` pair; the
//! storage mechanism behind the directory is an external concern, stubbed
//! here as a static lookup table.

use std::fmt;

use crate::models::{Role, Scope};

/// An authenticated operator as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub username: String,
    pub role: Role,
    pub scope: Scope,
}

/// One credential entry in the directory.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub center: String,
}

impl fmt::Debug for DirectoryEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DirectoryEntry")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("center", &self.center)
            .finish()
    }
}

/// Static username → `(password, role, center)` lookup table.
#[derive(Debug, Clone, Default)]
pub struct OperatorDirectory {
    entries: Vec<DirectoryEntry>,
}

impl OperatorDirectory {
    pub const fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    /// Directory shipped with the build.
    pub fn with_defaults() -> Self {
        let entry = |username: &str, password: &str, role: Role, center: &str| DirectoryEntry {
            username: username.to_string(),
            password: password.to_string(),
            role,
            center: center.to_string(),
        };
        Self::new(vec![
            entry("admin", "admin", Role::Admin, "Todos"),
            entry("Enrique", "Fibsal2026", Role::Admin, "FIBSAL"),
            entry("Edu", "Fibsal2026", Role::Admin, "FIBSAL"),
            entry("Marta", "Fibsal2026", Role::Admin, "FIBSAL"),
            entry("David", "Fibsal2026", Role::Admin, "FIBSAL"),
        ])
    }

    /// Verify credentials, resolving the operator's role and scope.
    pub fn verify(&self, username: &str, password: &str) -> Option<Operator> {
        self.entries
            .iter()
            .find(|entry| entry.username == username && entry.password == password)
            .map(|entry| Operator {
                username: entry.username.clone(),
                role: entry.role,
                scope: Scope::for_role(entry.role, &entry.center),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> OperatorDirectory {
        OperatorDirectory::new(vec![
            DirectoryEntry {
                username: "root".to_string(),
                password: "secret".to_string(),
                role: Role::Admin,
                center: "Todos".to_string(),
            },
            DirectoryEntry {
                username: "mesa1".to_string(),
                password: "pw".to_string(),
                role: Role::Mesa,
                center: "FIBSAL".to_string(),
            },
        ])
    }

    #[test]
    fn verify_resolves_role_and_scope() {
        let admin = directory().verify("root", "secret").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.scope, Scope::All);

        let mesa = directory().verify("mesa1", "pw").unwrap();
        assert_eq!(mesa.role, Role::Mesa);
        assert_eq!(mesa.scope, Scope::Center("FIBSAL".to_string()));
    }

    #[test]
    fn verify_rejects_bad_credentials() {
        assert!(directory().verify("root", "wrong").is_none());
        assert!(directory().verify("nobody", "secret").is_none());
    }

    #[test]
    fn directory_entry_debug_redacts_password() {
        let debug = format!("{:?}", directory().entries[0]);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
