//! Operator roles and visibility scopes

use serde::{Deserialize, Serialize};

/// What an authenticated operator is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full roster access, may filter by any center.
    Admin,
    /// Bound to a single voting center.
    Mesa,
}

/// The subset of the roster an operator may see and act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Unrestricted: the full roster.
    All,
    /// Only records assigned to the named voting center.
    Center(String),
}

impl Scope {
    /// Derive the scope for a role and its assigned center.
    pub fn for_role(role: Role, center: &str) -> Self {
        match role {
            Role::Admin => Self::All,
            Role::Mesa => Self::Center(center.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_scope_is_unrestricted() {
        assert_eq!(Scope::for_role(Role::Admin, "FIBSAL"), Scope::All);
    }

    #[test]
    fn mesa_scope_is_center_bound() {
        assert_eq!(
            Scope::for_role(Role::Mesa, "FIBSAL"),
            Scope::Center("FIBSAL".to_string())
        );
    }
}
