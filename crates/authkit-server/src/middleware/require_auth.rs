//! Authentication guard middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthSubject;

/// Requires a valid bearer token to proceed with the request.
///
/// #### Notes
///
/// - [`AuthSubject`] can't be extracted from requests without a *verified*
///   `Authorization` token, so the guard rejects before `next` runs.
///
/// #### Examples
///
/// ```rust,no_run
/// use axum::Router;
/// use axum::middleware::from_fn_with_state;
/// use authkit_server::AppState;
/// use authkit_server::middleware::require_authentication;
///
/// fn guard(router: Router<AppState>, state: AppState) -> Router<AppState> {
///     router.layer(from_fn_with_state(state, require_authentication))
/// }
/// ```
pub async fn require_authentication(
    AuthSubject(_): AuthSubject,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
