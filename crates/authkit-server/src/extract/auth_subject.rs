//! Bearer-token subject extractor.
//!
//! This is the `authenticate` operation exposed to the routing layer: pull
//! the bearer token off the `Authorization` header, verify it against the
//! process signer and hand the handler the subject id it vouches for.

use authkit_core::AuthService;
use axum::RequestPartsExt;
use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use uuid::Uuid;

use crate::handler::{Error, ErrorKind};

/// Tracing target for subject extraction.
const TRACING_TARGET: &str = "authkit_server::extract::auth_subject";

/// The verified subject of the request's bearer token.
///
/// Extraction fails with the token taxonomy mapped to 401s:
/// missing header, expired, invalid signature or malformed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSubject(pub Uuid);

impl AuthSubject {
    /// Returns the subject identifier.
    #[inline]
    #[must_use]
    pub fn id(self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthSubject
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(bearer_auth) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "request without usable Authorization header"
                );
                ErrorKind::MissingAuthToken.into_error()
            })?;

        let auth_service = AuthService::from_ref(state);
        let subject = auth_service.authenticate(bearer_auth.token())?;

        Ok(Self(subject))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthSubject
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if parts.headers.get(axum::http::header::AUTHORIZATION).is_none() {
            return Ok(None);
        }

        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
