//! Bearer-token middleware for protected routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::error::AppError;
use super::state::AppState;
use crate::models::UserId;
use crate::services::{self, ServiceError};

/// Identity attached to a request once its token has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Reject requests without a valid session token and expose [`AuthUser`] to handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)?.to_owned();
    let user_id = services::authenticate(state.repository.as_ref(), &state.auth, &token)
        .await
        .map_err(|e| match e {
            ServiceError::Repository(_) | ServiceError::Internal(_) => AppError::from(e),
            _ => AppError::Unauthorized(ServiceError::unauthorized().to_string()),
        })?;

    req.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Result<&str, AppError> {
    let unauthorized = || AppError::Unauthorized(ServiceError::unauthorized().to_string());

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(unauthorized)?;

    if token.is_empty() {
        return Err(unauthorized());
    }
    Ok(token)
}
