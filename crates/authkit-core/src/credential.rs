//! Secure password hashing and verification using Argon2id.
//!
//! Hashing uses the Argon2id algorithm with OWASP recommended parameters and
//! a cryptographically secure per-password salt. Verification recomputes the
//! hash and compares in constant time; a malformed stored record verifies as
//! `false` rather than erroring, so callers cannot leak record state.

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
};
use rand::rngs::OsRng;

use crate::error::{AuthError, FieldViolation, Result};

/// Tracing target for credential hashing operations.
const TRACING_TARGET: &str = "authkit_core::credential";

/// Password hashing and verification service using Argon2id.
///
/// # Security Features
///
/// - Argon2id variant (hybrid of Argon2i and Argon2d)
/// - OWASP recommended parameters (19 MB memory, 2 iterations, 1 thread)
/// - Cryptographically secure random salt per hash
/// - Timing-safe verification
/// - Plaintext passwords never appear in logs or errors
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Memory cost in KiB (~19 MB, OWASP recommended).
    const MEMORY_COST_KIB: u32 = 19_456;
    /// Time cost in iterations (OWASP recommended).
    const TIME_COST: u32 = 2;
    /// Degree of parallelism (OWASP recommended).
    const PARALLELISM: u32 = 1;

    /// Creates a hasher with the OWASP recommended configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if Argon2 rejects the parameters.
    /// This is a startup-time failure, never a per-request one.
    pub fn new() -> Result<Self> {
        Self::with_params(Self::MEMORY_COST_KIB, Self::TIME_COST, Self::PARALLELISM)
    }

    /// Creates a hasher with explicit cost parameters.
    ///
    /// Useful for tuning the work factor; tests may lower it, deployments on
    /// beefier hardware may raise it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if Argon2 rejects the parameters.
    pub fn with_params(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to create Argon2 parameters"
            );

            AuthError::configuration("invalid password hashing parameters")
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self { argon2 })
    }

    /// Hashes a password with a fresh cryptographically secure salt.
    ///
    /// Returns a PHC string containing the algorithm, parameters, salt and
    /// hash value, suitable for long-term storage.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] if the password is empty. This is the only
    ///   input-driven failure.
    /// - [`AuthError::Internal`] if salt generation or the hashing backend
    ///   fails; with valid startup parameters this does not happen in
    ///   practice.
    pub fn hash(&self, password: &str) -> Result<String> {
        if password.is_empty() {
            return Err(AuthError::Validation(vec![FieldViolation::new(
                "password",
                "required",
                "password must not be empty",
            )]));
        }

        let salt = SaltString::try_from_rng(&mut OsRng).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to generate cryptographically secure salt"
            );

            AuthError::internal(e)
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                AuthError::internal(e)
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash record.
    ///
    /// Returns `false` for wrong passwords and for malformed records alike;
    /// this method never errors, so callers cannot distinguish a corrupt
    /// record from a mismatch.
    #[must_use]
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "stored password hash has invalid format"
                );
                return false;
            }
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => true,
            Err(ArgonError::Password) => false,
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                false
            }
        }
    }

    /// Performs a dummy verification to keep lookup timing uniform.
    ///
    /// Used when no identity matches the submitted email: hashing and
    /// verifying against a random throwaway password takes about as long as
    /// a real verification, which prevents account enumeration via timing.
    /// Always returns `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        use rand::Rng;

        let password_len = rand::random_range(16..32);
        let dummy_password: String = (0..password_len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();

        if let Ok(dummy_hash) = self.hash(&dummy_password) {
            let _ = self.verify(password, &dummy_hash);
        }

        false
    }
}
