//! Stateless session token issuance and verification.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 over a process-wide
//! secret. Validity is a pure function of the signature and the embedded
//! expiry, so no server-side session store exists; this trades revocability
//! for horizontal scalability.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};

/// Tracing target for token operations.
const TRACING_TARGET: &str = "authkit_core::token";

/// Claims embedded in a session token.
///
/// Standard RFC 7519 claim names; timestamps are Unix seconds as the JWT
/// ecosystem expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Issuer (who created the token).
    pub iss: Cow<'static, str>,
    /// Subject: the authenticated identity's identifier.
    pub sub: Uuid,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration time (Unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// Checks whether the expiry timestamp has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.exp <= Timestamp::now().as_second()
    }
}

/// Issues and verifies signed session tokens.
///
/// Cheap to clone; the keys live behind an [`Arc`]. The signing secret is
/// injected at construction and immutable afterwards, matching the
/// read-only-after-startup discipline for process-wide secrets.
#[derive(Clone)]
pub struct TokenSigner {
    inner: Arc<TokenSignerInner>,
}

struct TokenSignerInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    /// Issuer identifier embedded in and required of every token.
    const ISSUER: &'static str = "authkit";
    /// Minimum accepted secret length in bytes.
    const MIN_SECRET_LEN: usize = 32;
    /// Default token lifetime.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Creates a signer from the process-wide secret with the default
    /// 24-hour token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the secret is shorter than 32
    /// bytes. Misconfigured secrets are fatal at startup, not per-request.
    pub fn new(secret: &str) -> Result<Self> {
        Self::with_ttl(secret, Self::DEFAULT_TTL)
    }

    /// Creates a signer with an explicit default token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] for undersized secrets or a zero
    /// lifetime.
    pub fn with_ttl(secret: &str, ttl: Duration) -> Result<Self> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(AuthError::configuration(format!(
                "token secret must be at least {} bytes",
                Self::MIN_SECRET_LEN
            )));
        }

        if ttl.is_zero() {
            return Err(AuthError::configuration(
                "token lifetime must be greater than zero",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[Self::ISSUER]);
        validation.set_required_spec_claims(&["iss", "sub", "iat", "exp"]);

        let inner = TokenSignerInner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the configured default token lifetime.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Issues a signed token for the given subject with the default lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the signing backend fails; with a
    /// valid secret this does not happen in practice.
    pub fn issue(&self, subject: Uuid) -> Result<String> {
        self.issue_with_ttl(subject, self.inner.ttl)
    }

    /// Issues a signed token for the given subject with an explicit lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the signing backend fails.
    pub fn issue_with_ttl(&self, subject: Uuid, ttl: Duration) -> Result<String> {
        let now = Timestamp::now().as_second();
        // Saturate on oversized lifetimes rather than wrapping into the past.
        let expires_at = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .unwrap_or(i64::MAX);
        let claims = SessionClaims {
            iss: Cow::Borrowed(Self::ISSUER),
            sub: subject,
            iat: now,
            exp: expires_at,
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.inner.encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                subject = %subject,
                "failed to encode session token"
            );

            AuthError::internal(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            subject = %subject,
            expires_at = claims.exp,
            "session token issued"
        );

        Ok(token)
    }

    /// Verifies a token and returns the subject identifier it vouches for.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenExpired`] if the expiry timestamp has passed
    /// - [`AuthError::TokenInvalid`] if the signature does not match the
    ///   payload (any payload mutation lands here)
    /// - [`AuthError::TokenMalformed`] if the token cannot be parsed into
    ///   payload and signature at all
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let token_data = decode::<SessionClaims>(token, &self.inner.decoding_key, &self.inner.validation)
            .map_err(|e| {
                let error = Self::map_jwt_error(&e);
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %e,
                    rejected_as = %error,
                    "session token verification failed"
                );
                error
            })?;

        let claims = token_data.claims;

        // The library already validated exp; re-check so a leeway tweak can
        // never silently admit an expired token.
        if claims.is_expired() {
            tracing::debug!(
                target: TRACING_TARGET,
                subject = %claims.sub,
                expired_at = claims.exp,
                "session token expired"
            );
            return Err(AuthError::TokenExpired);
        }

        Ok(claims.sub)
    }

    /// Maps a `jsonwebtoken` failure onto the token error taxonomy.
    fn map_jwt_error(error: &jsonwebtoken::errors::Error) -> AuthError {
        match error.kind() {
            JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
            JwtErrorKind::InvalidSignature => AuthError::TokenInvalid,
            JwtErrorKind::InvalidToken
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => AuthError::TokenMalformed,
            // Issuer/algorithm/claim mismatches mean the payload does not
            // check out against this signer.
            _ => AuthError::TokenInvalid,
        }
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn test_signer() -> TokenSigner {
        TokenSigner::new(TEST_SECRET).expect("valid test secret")
    }

    #[test]
    fn issue_then_verify_roundtrip() -> anyhow::Result<()> {
        let signer = test_signer();
        let subject = Uuid::now_v7();

        let token = signer.issue(subject)?;
        assert_eq!(signer.verify(&token)?, subject);

        Ok(())
    }

    #[test]
    fn short_secret_is_rejected_at_construction() {
        let result = TokenSigner::new("too-short");
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn zero_ttl_is_rejected_at_construction() {
        let result = TokenSigner::with_ttl(TEST_SECRET, Duration::ZERO);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn expired_token_is_rejected() -> anyhow::Result<()> {
        let signer = test_signer();
        let now = Timestamp::now().as_second();

        // Hand-roll a token whose expiry is in the past, signed with the
        // same key the signer trusts.
        let claims = SessionClaims {
            iss: Cow::Borrowed(TokenSigner::ISSUER),
            sub: Uuid::now_v7(),
            iat: now - 600,
            exp: now - 120,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &signer.inner.encoding_key,
        )?;

        assert!(matches!(
            signer.verify(&token),
            Err(AuthError::TokenExpired)
        ));

        Ok(())
    }

    #[test]
    fn tampered_payload_is_invalid() -> anyhow::Result<()> {
        let signer = test_signer();
        let token = signer.issue(Uuid::now_v7())?;

        let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
        assert_eq!(parts.len(), 3);

        // Flip one byte of the payload; the signature no longer matches.
        let payload = &mut parts[1];
        let tampered_char = if payload.ends_with('A') { 'B' } else { 'A' };
        payload.pop();
        payload.push(tampered_char);

        let tampered = parts.join(".");
        assert_ne!(tampered, token);
        assert!(matches!(
            signer.verify(&tampered),
            Err(AuthError::TokenInvalid)
        ));

        Ok(())
    }

    #[test]
    fn foreign_signature_is_invalid() -> anyhow::Result<()> {
        let signer = test_signer();
        let other = TokenSigner::new("ffffffffffffffffffffffffffffffff")?;

        let token = other.issue(Uuid::now_v7())?;
        assert!(matches!(
            signer.verify(&token),
            Err(AuthError::TokenInvalid)
        ));

        Ok(())
    }

    #[test]
    fn garbage_token_is_malformed() {
        let signer = test_signer();

        assert!(matches!(
            signer.verify("not-a-token"),
            Err(AuthError::TokenMalformed)
        ));
        assert!(matches!(
            signer.verify(""),
            Err(AuthError::TokenMalformed)
        ));
    }

    #[test]
    fn extreme_ttl_saturates_expiry() -> anyhow::Result<()> {
        let signer = TokenSigner::with_ttl(TEST_SECRET, Duration::from_secs(u64::MAX))?;

        let subject = Uuid::now_v7();
        let token = signer.issue(subject)?;
        assert_eq!(signer.verify(&token)?, subject);

        Ok(())
    }

    #[test]
    fn wrong_issuer_is_invalid() -> anyhow::Result<()> {
        let signer = test_signer();
        let now = Timestamp::now().as_second();

        let claims = SessionClaims {
            iss: Cow::Borrowed("someone-else"),
            sub: Uuid::now_v7(),
            iat: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &signer.inner.encoding_key,
        )?;

        assert!(matches!(
            signer.verify(&token),
            Err(AuthError::TokenInvalid)
        ));

        Ok(())
    }
}
