//! Authentication middleware for protected endpoints.
//!
//! [`auth_middleware`] validates the bearer token and stores the caller's
//! [`AuthContext`] in request extensions. The role guards run after it and
//! reject callers early; the engine repeats the role check on every call.
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use league_engine::auth::AuthContext;
//!
//! async fn protected_handler(Extension(ctx): Extension<AuthContext>) -> String {
//!     format!("Authenticated as user {}", ctx.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use league_engine::auth::AuthContext;

use super::{ApiError, AppState, ErrorResponse};

/// Validate `Authorization: Bearer <token>` and inject the caller.
///
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Invalid/expired token**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized("Missing bearer token");
    };

    match state.tokens.verify(token) {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// Reject callers without the admin role
pub async fn require_admin(request: Request, next: Next) -> Response {
    match caller(&request).map(|ctx| ctx.require_admin()) {
        Some(Ok(())) => next.run(request).await,
        Some(Err(e)) => ApiError(e).into_response(),
        None => unauthorized("Missing bearer token"),
    }
}

/// Reject callers that do not captain a team
pub async fn require_captain(request: Request, next: Next) -> Response {
    match caller(&request).map(|ctx| ctx.require_captain()) {
        Some(Ok(_)) => next.run(request).await,
        Some(Err(e)) => ApiError(e).into_response(),
        None => unauthorized("Missing bearer token"),
    }
}

fn caller(request: &Request) -> Option<AuthContext> {
    request.extensions().get::<AuthContext>().copied()
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
