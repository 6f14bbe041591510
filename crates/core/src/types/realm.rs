//! Authentication realms.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the two independent authentication contexts.
///
/// Each realm has its own identity-provider client, redirect targets, and
/// fallback paths. A session identity carries the realm it authenticated
/// against as its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    /// Ordinary members: registered on first login, assignable to tasks.
    Member,
    /// Administrators: create tasks and view the dashboard.
    Admin,
}

impl Realm {
    /// The realm name as stored in the database and in session records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Realm::Member).expect("serialize"),
            "\"member\""
        );
        assert_eq!(
            serde_json::from_str::<Realm>("\"admin\"").expect("deserialize"),
            Realm::Admin
        );
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Realm::Member.as_str(), "member");
        assert_eq!(Realm::Admin.as_str(), "admin");
    }
}
