//! Authenticated-request context

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use melodex_core::models::User;

use crate::error::HttpAppError;
use melodex_core::AppError;

/// The account behind the current request. Inserted by the auth middleware;
/// handlers extract it as an argument.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            })
    }
}
