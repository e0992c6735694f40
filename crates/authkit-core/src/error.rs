//! Typed failure taxonomy for the authentication core.
//!
//! Every fallible operation in this crate resolves into [`AuthError`]. The
//! variants are deliberately coarse: callers (an HTTP layer, a CLI) map them
//! onto their own response vocabulary without inspecting sources.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source slot in [`AuthError`] variants that wrap infrastructure
/// failures while keeping `Send + Sync` bounds for multi-threaded contexts.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// A single field-level validation failure.
///
/// Validation is aggregated: a request with three invalid fields produces
/// three violations in one [`AuthError::Validation`], never just the first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldViolation {
    /// Name of the offending request field.
    pub field: String,
    /// Machine-readable violation code (e.g. `email`, `length`).
    pub code: String,
    /// Human-readable description safe for client consumption.
    pub message: String,
}

impl FieldViolation {
    /// Creates a new field violation.
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Identity field on which a uniqueness conflict occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConflictField {
    /// Another identity already owns this email address.
    Email,
    /// Another identity already owns this username.
    Username,
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// The error type for authentication operations.
///
/// All variants are recoverable at the service boundary. [`Internal`] covers
/// infrastructure failures (RNG, signing) that startup validation should have
/// precluded; it exists so the per-request path never panics.
///
/// [`Internal`]: AuthError::Internal
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more request fields failed validation.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// A uniqueness constraint was violated on the named field.
    #[error("{0} is already taken")]
    Conflict(ConflictField),

    /// Unknown identity or wrong password.
    ///
    /// The two cases are intentionally indistinguishable to prevent account
    /// enumeration.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session token's expiry timestamp has passed.
    #[error("session token has expired")]
    TokenExpired,

    /// The session token's signature does not match its payload.
    #[error("session token signature is invalid")]
    TokenInvalid,

    /// The session token could not be parsed into payload and signature.
    #[error("session token is malformed")]
    TokenMalformed,

    /// The identity store could not be reached or failed mid-operation.
    #[error("identity store is unavailable")]
    StoreUnavailable(#[source] BoxedError),

    /// Misconfiguration detected while constructing a component.
    ///
    /// Raised at startup only; a running service never returns this.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Unexpected infrastructure failure (RNG, signing backend).
    #[error("internal authentication error")]
    Internal(#[source] BoxedError),
}

impl AuthError {
    /// Creates a configuration error with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error from any source error.
    pub fn internal(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Box::new(source))
    }

    /// Returns the violations if this is a validation error.
    pub fn violations(&self) -> Option<&[FieldViolation]> {
        match self {
            Self::Validation(violations) => Some(violations),
            _ => None,
        }
    }
}
