//! JSON extractor with contract-shaped rejections.
//!
//! Axum's stock [`Json`] rejection answers with its own plain-text bodies
//! and a 422 for deserialization failures. The public contract wants every
//! shape problem reported as a 400 `validation_failed` envelope, so this
//! wrapper re-maps the rejection.
//!
//! [`Json`]: axum::Json

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// JSON extractor whose rejections follow the API error envelope.
#[must_use]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T> ApiJson<T> {
    /// Returns the inner deserialized value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <axum::Json<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(axum::Json(data)) => Ok(Self(data)),
            Err(rejection) => Err(map_rejection(rejection)),
        }
    }
}

fn map_rejection(rejection: JsonRejection) -> Error {
    match rejection {
        JsonRejection::JsonDataError(error) => {
            ErrorKind::ValidationFailed.with_message(error.body_text())
        }
        JsonRejection::JsonSyntaxError(error) => {
            ErrorKind::ValidationFailed.with_message(error.body_text())
        }
        JsonRejection::MissingJsonContentType(_) => ErrorKind::ValidationFailed
            .with_message("Expected request with `Content-Type: application/json`"),
        rejection => ErrorKind::ValidationFailed.with_message(rejection.body_text()),
    }
}
