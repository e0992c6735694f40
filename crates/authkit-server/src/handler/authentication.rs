//! Authentication handlers: registration, login and the subject probe.
//!
//! `register` and `login` accept JSON credential payloads and answer with a
//! session token plus the hash-free user projection. `me` demonstrates the
//! `authenticate` operation as an extractor; the same extractor backs the
//! [`require_authentication`](crate::middleware::require_authentication)
//! guard for arbitrary routes.

use authkit_core::{AuthService, LoginRequest, RegisterRequest};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::extract::{ApiJson, AuthSubject};
use crate::handler::{AuthResponse, Result, SubjectResponse};
use crate::state::AppState;

/// Tracing target for authentication handlers.
const TRACING_TARGET: &str = "authkit_server::handler::authentication";

/// Registers a new user and issues their first session token.
async fn register(
    State(auth_service): State<AuthService>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        email = %request.email,
        username = %request.username,
        "registration attempt"
    );

    let session = auth_service.register(request).await?;

    tracing::info!(
        target: TRACING_TARGET,
        id = %session.user.id,
        "registration successful"
    );

    Ok((StatusCode::CREATED, Json(AuthResponse::registered(session))))
}

/// Authenticates an email/password pair and issues a session token.
async fn login(
    State(auth_service): State<AuthService>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    tracing::trace!(
        target: TRACING_TARGET,
        email = %request.email,
        "login attempt"
    );

    let session = auth_service.login(request).await?;

    tracing::info!(
        target: TRACING_TARGET,
        id = %session.user.id,
        "login successful"
    );

    Ok(Json(AuthResponse::logged_in(session)))
}

/// Returns the subject id the presented bearer token vouches for.
async fn me(AuthSubject(subject): AuthSubject) -> Json<SubjectResponse> {
    Json(SubjectResponse::new(subject))
}

/// Returns a [`Router`] with all authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
