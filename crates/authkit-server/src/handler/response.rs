//! Success response envelopes.

use authkit_core::AuthSession;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response returned after successful registration or login.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Always `true`.
    pub success: bool,
    /// Short human-readable outcome description.
    pub message: String,
    /// Session token and hash-free user projection.
    pub data: AuthSession,
}

impl AuthResponse {
    /// Envelope for a completed registration.
    pub fn registered(session: AuthSession) -> Self {
        Self {
            success: true,
            message: "User registered successfully".to_owned(),
            data: session,
        }
    }

    /// Envelope for a completed login.
    pub fn logged_in(session: AuthSession) -> Self {
        Self {
            success: true,
            message: "Login successful".to_owned(),
            data: session,
        }
    }
}

/// Response returned by the authenticated-subject probe.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectResponse {
    /// Always `true`.
    pub success: bool,
    /// The verified subject.
    pub data: SubjectData,
}

/// Payload of [`SubjectResponse`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectData {
    /// Identifier the presented token vouches for.
    pub id: Uuid,
}

impl SubjectResponse {
    /// Envelope for a verified subject.
    pub fn new(id: Uuid) -> Self {
        Self {
            success: true,
            data: SubjectData { id },
        }
    }
}
