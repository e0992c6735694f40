//! Identity records and their outward-facing projection.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalizes an email address for storage and lookup.
///
/// Email uniqueness is case-insensitive; every path that touches the store
/// goes through this function so the invariant holds regardless of caller.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A registered user's durable record.
///
/// Owned by the identity store; the auth service only holds transient copies
/// during a request. The password hash never leaves this crate: responses
/// carry the [`IdentityProfile`] projection instead.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Email address, stored lowercase, unique across identities.
    pub email: String,
    /// Username, unique across identities.
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl Identity {
    /// Returns the hash-free projection of this identity.
    pub fn profile(&self) -> IdentityProfile {
        IdentityProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // password_hash is deliberately omitted from debug output
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Input for creating a new identity.
///
/// The email must already be normalized and the password already hashed;
/// the store assigns the identifier and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Normalized (lowercase) email address.
    pub email: String,
    /// Username as provided by the user.
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
}

/// The shape of an identity that crosses the service boundary.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Username.
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn debug_redacts_password_hash() {
        let identity = Identity {
            id: Uuid::now_v7(),
            email: "a@x.com".to_owned(),
            username: "abc".to_owned(),
            password_hash: "$argon2id$secret".to_owned(),
            created_at: Timestamp::now(),
        };

        let debug = format!("{identity:?}");
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("a@x.com"));
    }

    #[test]
    fn profile_drops_the_hash() {
        let identity = Identity {
            id: Uuid::now_v7(),
            email: "a@x.com".to_owned(),
            username: "abc".to_owned(),
            password_hash: "$argon2id$secret".to_owned(),
            created_at: Timestamp::now(),
        };

        let profile = identity.profile();
        assert_eq!(profile.id, identity.id);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
