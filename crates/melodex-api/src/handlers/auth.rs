//! Registration and login

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use melodex_core::models::{UserResponse, UserRole};
use melodex_core::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

use crate::auth::password;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Self-service registration. Only `user` and `creator` accounts can be
/// created here; admin accounts are provisioned out of band.
#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let role = match request.role.as_deref() {
        None => UserRole::User,
        Some(s) => match UserRole::from_str(s) {
            Ok(UserRole::User) => UserRole::User,
            Ok(UserRole::Creator) => UserRole::Creator,
            Ok(UserRole::Admin) | Err(_) => {
                return Err(HttpAppError(AppError::Validation(
                    "role must be 'user' or 'creator'".to_string(),
                )))
            }
        },
    };

    let password_hash = password::hash_password(&request.password)?;
    let user = state
        .users
        .create(&request.name, &request.email, &password_hash, role)
        .await?;

    let token = state.jwt.issue(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Login. The same message is returned whether the email is unknown or the
/// password is wrong, so accounts cannot be enumerated.
#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .users
        .get_by_email(&request.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&request.password, &user.password_hash)? {
        return Err(HttpAppError(invalid()));
    }

    let token = state.jwt.issue(&user)?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
