//! Member records persisted by the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crewdesk_core::{Email, MemberId, Realm};

use crate::models::Identity;

/// A registered member, one row per email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique key: at most one member per email.
    pub email: Email,
    /// Stable provider-issued subject.
    pub member_id: MemberId,
    /// Display name, used for task assignment.
    pub name: String,
    pub phone: Option<String>,
    /// Always [`Realm::Member`]; admins are never registered here.
    pub role: Realm,
    pub created_at: DateTime<Utc>,
}

/// Profile fields projected from a freshly authenticated identity.
///
/// The store stamps `created_at` on insert; a later login never overwrites
/// an existing row, so the original registration time is retained.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: Email,
    pub member_id: MemberId,
    pub name: String,
    pub phone: Option<String>,
}

impl NewMember {
    /// Project the registration fields out of a session identity.
    ///
    /// Returns `None` when the identity carries no email address, in which
    /// case there is nothing to key the registry on and registration is
    /// skipped.
    pub fn from_identity(identity: &Identity) -> Option<Self> {
        let email = identity.email.clone()?;
        Some(Self {
            email,
            member_id: identity.subject.clone(),
            name: identity
                .display_name
                .clone()
                .unwrap_or_else(|| identity.subject.to_string()),
            phone: identity.phone_number.clone(),
        })
    }
}
