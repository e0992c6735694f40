//! Registration, login and token authentication orchestration.
//!
//! The service is stateless per request: it validates input, talks to the
//! identity store, drives the hasher and signer, and folds every failure
//! into the [`AuthError`] taxonomy. It never retries store calls; retry
//! policy belongs to the store implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::credential::CredentialHasher;
use crate::error::{AuthError, ConflictField, FieldViolation, Result};
use crate::identity::{IdentityProfile, NewIdentity, normalize_email};
use crate::store::IdentityStore;
use crate::token::TokenSigner;

/// Tracing target for auth service operations.
const TRACING_TARGET: &str = "authkit_core::service";

/// Checks that a username contains only letters, digits and underscores.
fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars")
            .with_message("must contain only letters, numbers, and underscores".into()))
    }
}

/// Registration input.
///
/// Validation is aggregated: all field violations are reported in one
/// [`AuthError::Validation`], not just the first.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address; uniqueness is case-insensitive.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Plaintext password; hashed immediately, never stored or logged.
    #[validate(length(min = 8, message = "must be at least 8 characters long"))]
    pub password: String,
    /// Unique username.
    #[validate(
        length(min = 3, max = 30, message = "must be between 3 and 30 characters long"),
        custom(function = validate_username_chars)
    )]
    pub username: String,
}

/// Login input.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address of the identity.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// The result of a successful registration or login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque signed session token for subsequent requests.
    pub token: String,
    /// The authenticated identity, without its password hash.
    pub user: IdentityProfile,
}

/// Converts aggregated `validator` errors into the core taxonomy.
fn into_validation_error(errors: ValidationErrors) -> AuthError {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("failed validation: {}", error.code),
                };
                FieldViolation::new(field.to_string(), error.code.to_string(), message)
            })
        })
        .collect();

    // HashMap iteration order is arbitrary; keep the report deterministic.
    violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));

    AuthError::Validation(violations)
}

/// Authentication service.
///
/// Cheap to clone; the store, hasher and signer are all shared handles. No
/// mutable state lives here, so any number of requests may run concurrently
/// without coordination.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    hasher: CredentialHasher,
    signer: TokenSigner,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a service over the given collaborators.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: CredentialHasher,
        signer: TokenSigner,
    ) -> Self {
        Self {
            store,
            hasher,
            signer,
        }
    }

    /// Registers a new identity and issues its first session token.
    ///
    /// The uniqueness pre-checks here are advisory; the store's write-time
    /// constraint is authoritative, so a lost race between check and insert
    /// still surfaces as [`AuthError::Conflict`].
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] listing every violated field
    /// - [`AuthError::Conflict`] if the email or username is taken
    /// - [`AuthError::StoreUnavailable`] if the store fails
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession> {
        request.validate().map_err(into_validation_error)?;

        let email = normalize_email(&request.email);

        if self.store.find_by_email(&email).await?.is_some() {
            tracing::warn!(
                target: TRACING_TARGET,
                email = %email,
                "registration rejected: email already taken"
            );
            return Err(AuthError::Conflict(ConflictField::Email));
        }

        if self.store.find_by_username(&request.username).await?.is_some() {
            tracing::warn!(
                target: TRACING_TARGET,
                username = %request.username,
                "registration rejected: username already taken"
            );
            return Err(AuthError::Conflict(ConflictField::Username));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let identity = self
            .store
            .create(NewIdentity {
                email,
                username: request.username,
                password_hash,
            })
            .await?;

        let token = self.signer.issue(identity.id)?;

        tracing::info!(
            target: TRACING_TARGET,
            id = %identity.id,
            username = %identity.username,
            "identity registered"
        );

        Ok(AuthSession {
            token,
            user: identity.profile(),
        })
    }

    /// Authenticates an email/password pair and issues a session token.
    ///
    /// Unknown email and wrong password produce the same
    /// [`AuthError::InvalidCredentials`], and the unknown-email path burns a
    /// dummy verification so the two are not distinguishable by timing
    /// either.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for missing or malformed fields
    /// - [`AuthError::InvalidCredentials`] for unknown email or mismatch
    /// - [`AuthError::StoreUnavailable`] if the store fails
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        request.validate().map_err(into_validation_error)?;

        let email = normalize_email(&request.email);
        let identity = self.store.find_by_email(&email).await?;

        let password_valid = match &identity {
            Some(identity) => self.hasher.verify(&request.password, &identity.password_hash),
            None => self.hasher.verify_dummy(&request.password),
        };

        let Some(identity) = identity.filter(|_| password_valid) else {
            tracing::warn!(
                target: TRACING_TARGET,
                email = %email,
                "login failed"
            );
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.signer.issue(identity.id)?;

        tracing::info!(
            target: TRACING_TARGET,
            id = %identity.id,
            "login successful"
        );

        Ok(AuthSession {
            token,
            user: identity.profile(),
        })
    }

    /// Verifies a session token and returns the subject it vouches for.
    ///
    /// Exposed for use as request middleware by an outer routing layer.
    ///
    /// # Errors
    ///
    /// Propagates the token taxonomy: [`AuthError::TokenExpired`],
    /// [`AuthError::TokenInvalid`] or [`AuthError::TokenMalformed`].
    pub fn authenticate(&self, token: &str) -> Result<Uuid> {
        self.signer.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn test_service() -> (AuthService, MemoryStore) {
        let store = MemoryStore::new();
        // Reduced work factor; cost tuning is covered in credential tests.
        let hasher = CredentialHasher::with_params(4096, 1, 1).unwrap();
        let signer = TokenSigner::new("0123456789abcdef0123456789abcdef").unwrap();
        let service = AuthService::new(Arc::new(store.clone()), hasher, signer);
        (service, store)
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "a@x.com".to_owned(),
            password: "abcdefgh".to_owned(),
            username: "abc".to_owned(),
        }
    }

    #[tokio::test]
    async fn register_issues_verifiable_token() -> anyhow::Result<()> {
        let (service, _store) = test_service();

        let session = service.register(register_request()).await?;
        assert_eq!(session.user.email, "a@x.com");
        assert_eq!(session.user.username, "abc");

        let subject = service.authenticate(&session.token)?;
        assert_eq!(subject, session.user.id);

        Ok(())
    }

    #[tokio::test]
    async fn register_normalizes_email() -> anyhow::Result<()> {
        let (service, _store) = test_service();

        let session = service
            .register(RegisterRequest {
                email: "User@Example.COM".to_owned(),
                ..register_request()
            })
            .await?;
        assert_eq!(session.user.email, "user@example.com");

        // Login with any casing reaches the same identity.
        let login = service
            .login(LoginRequest {
                email: "user@EXAMPLE.com".to_owned(),
                password: "abcdefgh".to_owned(),
            })
            .await?;
        assert_eq!(login.user.id, session.user.id);

        Ok(())
    }

    #[tokio::test]
    async fn register_twice_conflicts_on_email() -> anyhow::Result<()> {
        let (service, _store) = test_service();

        service.register(register_request()).await?;

        let error = service
            .register(RegisterRequest {
                username: "other_name".to_owned(),
                ..register_request()
            })
            .await
            .unwrap_err();

        assert!(matches!(error, AuthError::Conflict(ConflictField::Email)));

        Ok(())
    }

    #[tokio::test]
    async fn register_conflicts_on_username() -> anyhow::Result<()> {
        let (service, _store) = test_service();

        service.register(register_request()).await?;

        let error = service
            .register(RegisterRequest {
                email: "b@x.com".to_owned(),
                ..register_request()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            AuthError::Conflict(ConflictField::Username)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn register_reports_every_violation() {
        let (service, _store) = test_service();

        let error = service
            .register(RegisterRequest {
                email: "not-an-email".to_owned(),
                password: "short".to_owned(),
                username: "a".to_owned(),
            })
            .await
            .unwrap_err();

        let violations = error.violations().expect("expected validation error");
        assert_eq!(violations.len(), 3);

        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
        assert!(fields.contains(&"username"));
    }

    #[tokio::test]
    async fn register_rejects_bad_username_chars() {
        let (service, _store) = test_service();

        let error = service
            .register(RegisterRequest {
                username: "not valid!".to_owned(),
                ..register_request()
            })
            .await
            .unwrap_err();

        let violations = error.violations().expect("expected validation error");
        assert!(violations.iter().any(|v| v.code == "username_chars"));
    }

    #[tokio::test]
    async fn login_unknown_email_and_wrong_password_match() -> anyhow::Result<()> {
        let (service, _store) = test_service();

        service.register(register_request()).await?;

        let unknown = service
            .login(LoginRequest {
                email: "nobody@x.com".to_owned(),
                password: "abcdefgh".to_owned(),
            })
            .await
            .unwrap_err();

        let wrong = service
            .login(LoginRequest {
                email: "a@x.com".to_owned(),
                password: "wrong-password".to_owned(),
            })
            .await
            .unwrap_err();

        // Externally indistinguishable failure classes.
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn login_missing_password_fails_validation() {
        let (service, _store) = test_service();

        let error = service
            .login(LoginRequest {
                email: "a@x.com".to_owned(),
                password: String::new(),
            })
            .await
            .unwrap_err();

        let violations = error.violations().expect("expected validation error");
        assert_eq!(violations[0].field, "password");
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_unavailable() -> anyhow::Result<()> {
        let (service, store) = test_service();

        store.set_available(false);

        let register = service.register(register_request()).await.unwrap_err();
        assert!(matches!(register, AuthError::StoreUnavailable(_)));

        let login = service
            .login(LoginRequest {
                email: "a@x.com".to_owned(),
                password: "abcdefgh".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(login, AuthError::StoreUnavailable(_)));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_registration_has_one_winner() -> anyhow::Result<()> {
        let (service, store) = test_service();

        let first = RegisterRequest {
            username: "user_one".to_owned(),
            ..register_request()
        };
        let second = RegisterRequest {
            username: "user_two".to_owned(),
            ..register_request()
        };

        let (a, b) = tokio::join!(service.register(first), service.register(second));

        let results = [a, b];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::Conflict(ConflictField::Email))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn authenticate_rejects_expired_tokens() -> anyhow::Result<()> {
        // A signer with a 1-second lifetime; sleep past the expiry.
        let store = MemoryStore::new();
        let hasher = CredentialHasher::with_params(4096, 1, 1)?;
        let signer = TokenSigner::with_ttl(
            "0123456789abcdef0123456789abcdef",
            Duration::from_secs(1),
        )?;
        let service = AuthService::new(Arc::new(store), hasher, signer);

        let session = service.register(register_request()).await?;
        assert!(service.authenticate(&session.token).is_ok());

        tokio::time::sleep(Duration::from_millis(1_100)).await;

        assert!(matches!(
            service.authenticate(&session.token),
            Err(AuthError::TokenExpired)
        ));

        Ok(())
    }
}
