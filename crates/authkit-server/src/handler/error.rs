//! HTTP error type and response mapping.
//!
//! Every [`AuthError`] is recovered here into a stable response envelope:
//! `{ success: false, error: <name>, message, details? }`. Nothing in this
//! module panics; unexpected internals become opaque 500s with the source
//! logged server-side only.

use std::borrow::Cow;
use std::fmt;

use authkit_core::{AuthError, FieldViolation};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Tracing target for error mapping.
const TRACING_TARGET: &str = "authkit_server::handler::error";

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Enumeration of the error kinds this API can answer with.
///
/// Each variant has a fixed wire name, status code and default message.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 - One or more request fields failed validation.
    ValidationFailed,
    /// 400 - Email or username already taken.
    ///
    /// Conflicts surface as 400 to match the public API contract.
    Conflict,
    /// 401 - Unknown identity or wrong password.
    InvalidCredentials,
    /// 401 - No bearer token on the request.
    MissingAuthToken,
    /// 401 - Bearer token has expired.
    ExpiredAuthToken,
    /// 401 - Bearer token signature does not check out.
    InvalidAuthToken,
    /// 401 - Bearer token could not be parsed.
    MalformedAuthToken,

    // 5xx Server Errors
    /// 500 - The identity store could not be reached.
    StoreUnavailable,
    /// 500 - Unexpected server error.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Returns the stable wire name of this error kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::Conflict => "conflict",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingAuthToken => "missing_auth_token",
            Self::ExpiredAuthToken => "expired_auth_token",
            Self::InvalidAuthToken => "invalid_auth_token",
            Self::MalformedAuthToken => "malformed_auth_token",
            Self::StoreUnavailable => "store_unavailable",
            Self::InternalServerError => "internal_server_error",
        }
    }

    /// Returns the HTTP status code for this error kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::ValidationFailed | Self::Conflict => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::MissingAuthToken
            | Self::ExpiredAuthToken
            | Self::InvalidAuthToken
            | Self::MalformedAuthToken => StatusCode::UNAUTHORIZED,
            Self::StoreUnavailable | Self::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the default user-facing message for this error kind.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation failed",
            Self::Conflict => "Resource already exists",
            Self::InvalidCredentials => "Invalid credentials",
            Self::MissingAuthToken => "Authentication token is missing",
            Self::ExpiredAuthToken => "Authentication session has expired",
            Self::InvalidAuthToken => "Authentication token is invalid",
            Self::MalformedAuthToken => "Authentication token is malformed",
            Self::StoreUnavailable => "Service temporarily unavailable. Please try again later",
            Self::InternalServerError => {
                "An internal server error occurred. Please try again later"
            }
        }
    }

    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Creates an [`Error`] with a custom user-facing message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The error type for HTTP handlers.
#[must_use = "errors do nothing unless serialized"]
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    details: Option<Vec<FieldViolation>>,
}

impl Error {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            details: None,
        }
    }

    /// Sets a custom user-facing message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches per-field violation details.
    #[inline]
    pub fn with_details(mut self, details: Vec<FieldViolation>) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self
            .message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message());
        write!(
            f,
            "{} ({}): {}",
            self.kind.name(),
            self.kind.status_code(),
            message
        )
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Wire representation of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldViolation>>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self
            .message
            .unwrap_or_else(|| Cow::Borrowed(self.kind.default_message()));

        let body = ErrorBody {
            success: false,
            error: self.kind.name(),
            message,
            details: self.details,
        };

        (self.kind.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.into_error().into_response()
    }
}

impl From<AuthError> for Error {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(violations) => {
                ErrorKind::ValidationFailed.into_error().with_details(violations)
            }
            AuthError::Conflict(field) => ErrorKind::Conflict
                .with_message(format!("{field} is already taken"))
                .with_details(vec![FieldViolation::new(
                    field.as_ref(),
                    "conflict",
                    "is already taken",
                )]),
            AuthError::InvalidCredentials => ErrorKind::InvalidCredentials.into_error(),
            AuthError::TokenExpired => ErrorKind::ExpiredAuthToken.into_error(),
            AuthError::TokenInvalid => ErrorKind::InvalidAuthToken.into_error(),
            AuthError::TokenMalformed => ErrorKind::MalformedAuthToken.into_error(),
            AuthError::StoreUnavailable(source) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %source,
                    "identity store unavailable"
                );
                ErrorKind::StoreUnavailable.into_error()
            }
            AuthError::Configuration(message) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %message,
                    "configuration error reached a request handler"
                );
                ErrorKind::InternalServerError.into_error()
            }
            AuthError::Internal(source) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %source,
                    "internal authentication error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use authkit_core::ConflictField;

    use super::*;

    #[test]
    fn status_codes_match_contract() {
        assert_eq!(
            ErrorKind::ValidationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorKind::Conflict.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorKind::StoreUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_error_keeps_all_details() {
        let error: Error = AuthError::Validation(vec![
            FieldViolation::new("email", "email", "must be a valid email address"),
            FieldViolation::new("password", "length", "too short"),
            FieldViolation::new("username", "length", "too short"),
        ])
        .into();

        assert_eq!(error.kind(), ErrorKind::ValidationFailed);
        assert_eq!(error.details.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn conflict_names_the_field() {
        let error: Error = AuthError::Conflict(ConflictField::Email).into();

        assert_eq!(error.kind(), ErrorKind::Conflict);
        let details = error.details.as_ref().unwrap();
        assert_eq!(details[0].field, "email");
    }

    #[test]
    fn display_includes_name_and_status() {
        let error = ErrorKind::InvalidCredentials.into_error();
        let display = error.to_string();
        assert!(display.contains("invalid_credentials"));
        assert!(display.contains("401"));
    }
}
