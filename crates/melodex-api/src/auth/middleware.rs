//! Bearer-token middleware and role gates
//!
//! `auth_middleware` validates the token and loads the account fresh from
//! the database, so a deleted account or changed role takes effect on the
//! next request, not at token expiry. The role gates run after it and match
//! on [`UserRole`] exhaustively.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use melodex_core::models::UserRole;
use melodex_db::UserRepository;
use std::sync::Arc;

use crate::auth::jwt::JwtService;
use crate::auth::models::CurrentUser;
use crate::error::error_response;

pub struct AuthState {
    pub jwt: JwtService,
    pub users: UserRepository,
}

fn unauthorized(message: &str) -> Response {
    error_response(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
}

fn forbidden(message: &str) -> Response {
    error_response(StatusCode::FORBIDDEN, message, "FORBIDDEN")
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn auth_middleware(
    State(auth): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return unauthorized("Authentication required");
    };

    let claims = match auth.jwt.verify(token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized("Invalid or expired token"),
    };

    let user = match auth.users.get_by_id(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Invalid or expired token"),
        Err(err) => {
            tracing::error!(error = %err, "failed to load user for auth");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
                "INTERNAL_ERROR",
            );
        }
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Gate: creators and admins only (upload, edit, delete).
pub async fn require_creator_or_admin(request: Request, next: Next) -> Response {
    let Some(CurrentUser(user)) = request.extensions().get::<CurrentUser>() else {
        return unauthorized("Authentication required");
    };
    let allowed = match user.role {
        UserRole::Creator | UserRole::Admin => true,
        UserRole::User => false,
    };
    if !allowed {
        return forbidden("Creator access required");
    }
    next.run(request).await
}

/// Gate: creators only (my-uploads, creator stats).
pub async fn require_creator(request: Request, next: Next) -> Response {
    let Some(CurrentUser(user)) = request.extensions().get::<CurrentUser>() else {
        return unauthorized("Authentication required");
    };
    let allowed = match user.role {
        UserRole::Creator => true,
        UserRole::User | UserRole::Admin => false,
    };
    if !allowed {
        return forbidden("Creator access required");
    }
    next.run(request).await
}

/// Gate: admins only.
pub async fn require_admin(request: Request, next: Next) -> Response {
    let Some(CurrentUser(user)) = request.extensions().get::<CurrentUser>() else {
        return unauthorized("Authentication required");
    };
    let allowed = match user.role {
        UserRole::Admin => true,
        UserRole::User | UserRole::Creator => false,
    };
    if !allowed {
        return forbidden("Admin access required");
    }
    next.run(request).await
}
