//! Authentication configuration.
//!
//! The signing secret is an explicit configuration value injected into the
//! components at construction time; nothing in this crate reads process
//! globals. Misconfiguration (undersized secret, zero lifetime) fails at
//! startup, never per-request.

use std::time::Duration;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::credential::CredentialHasher;
use crate::error::Result;
use crate::token::TokenSigner;

/// Authentication core configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct AuthConfig {
    /// Process-wide secret used to sign session tokens.
    ///
    /// Must be at least 32 bytes; shorter values abort startup. Never
    /// serialized back out, mirroring the redacted `Debug` output.
    #[serde(skip_serializing)]
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_TOKEN_SECRET", hide_env_values = true)
    )]
    pub token_secret: String,

    /// Session token lifetime in hours.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_TOKEN_TTL_HOURS", default_value_t = 24)
    )]
    #[serde(default = "AuthConfig::default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl AuthConfig {
    fn default_token_ttl_hours() -> u64 {
        24
    }

    /// Returns the configured token lifetime.
    ///
    /// Saturates instead of overflowing on absurd hour counts.
    #[inline]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours.saturating_mul(60 * 60))
    }

    /// Builds the token signer from this configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for undersized secrets or a zero
    /// lifetime.
    pub fn create_signer(&self) -> Result<TokenSigner> {
        TokenSigner::with_ttl(&self.token_secret, self.token_ttl())
    }

    /// Builds the credential hasher with the recommended parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the hashing parameters are rejected.
    pub fn create_hasher(&self) -> Result<CredentialHasher> {
        CredentialHasher::new()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // token_secret is deliberately omitted from debug output
        f.debug_struct("AuthConfig")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish_non_exhaustive()
    }
}
