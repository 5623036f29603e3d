//! Profile and wishlist endpoints

use axum::extract::{Path, State};
use axum::Json;
use melodex_core::models::UserResponse;
use melodex_core::AppError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{password, CurrentUser};
use crate::error::HttpAppError;
use crate::state::AppState;

/// Profile plus full download history, newest first.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Value>, HttpAppError> {
    let history = state.users.history_for_user(user.0.id).await?;
    Ok(Json(json!({
        "user": UserResponse::from(user.0),
        "downloadHistory": history,
    })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Partial profile update; a supplied password is re-hashed.
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.0.id))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = match &request.password {
        Some(password) => Some(password::hash_password(password)?),
        None => None,
    };

    let updated = state
        .users
        .update_profile(
            user.0.id,
            request.name.as_deref(),
            request.email.as_deref(),
            password_hash.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": UserResponse::from(updated) })))
}

/// Add a track to the wishlist. Re-adding is a no-op, not an error.
pub async fn wishlist_add(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(track_id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    state
        .tracks
        .get_row(track_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;

    let added = state.users.wishlist_add(user.0.id, track_id).await?;
    let message = if added {
        "Added to wishlist"
    } else {
        "Already in wishlist"
    };
    Ok(Json(json!({ "message": message })))
}

pub async fn wishlist_remove(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(track_id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    let removed = state.users.wishlist_remove(user.0.id, track_id).await?;
    if !removed {
        return Err(HttpAppError(AppError::NotFound(
            "Track not in wishlist".to_string(),
        )));
    }
    Ok(Json(json!({ "message": "Removed from wishlist" })))
}

/// Wishlisted tracks, most recently added first.
pub async fn get_wishlist(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Value>, HttpAppError> {
    let tracks = state.tracks.list_wishlist(user.0.id).await?;
    Ok(Json(json!({ "data": tracks })))
}
