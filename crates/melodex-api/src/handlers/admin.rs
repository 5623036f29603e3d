//! Admin endpoints: user management, moderation, platform stats

use axum::extract::{Path, State};
use axum::Json;
use melodex_core::models::{PlatformStats, TrackSort, UserResponse, UserRole};
use melodex_core::AppError;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, HttpAppError> {
    let users: Vec<UserResponse> = state
        .users
        .list_all()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(json!({ "data": users })))
}

/// One user with their uploads and the distinct tracks they downloaded.
pub async fn get_user_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    let user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let uploads = state.tracks.list_by_owner(id).await?;
    let downloads = state.tracks.list_downloaded(id).await?;

    Ok(Json(json!({
        "user": UserResponse::from(user),
        "uploads": uploads,
        "downloads": downloads,
    })))
}

/// Delete an account. The user's tracks, wishlist entries, and download
/// history cascade in the database.
#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    if !state.users.delete(id).await? {
        return Err(HttpAppError(AppError::NotFound(
            "User not found".to_string(),
        )));
    }
    tracing::info!("user deleted");
    Ok(Json(json!({ "message": "User deleted" })))
}

/// Flip an account between user and creator. Admin accounts are never
/// toggled.
#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn toggle_creator(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    let user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let new_role = match user.role {
        UserRole::User => UserRole::Creator,
        UserRole::Creator => UserRole::User,
        UserRole::Admin => {
            return Err(HttpAppError(AppError::BadRequest(
                "Admin role cannot be changed".to_string(),
            )))
        }
    };

    let updated = state
        .users
        .set_role(id, new_role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(role = %updated.role, "role toggled");
    Ok(Json(json!({ "user": UserResponse::from(updated) })))
}

pub async fn list_all_tracks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, HttpAppError> {
    let tracks = state.tracks.list(None, TrackSort::Newest).await?;
    Ok(Json(json!({ "data": tracks })))
}

#[tracing::instrument(skip(state), fields(track_id = %id))]
pub async fn delete_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    if !state.tracks.delete(id).await? {
        return Err(HttpAppError(AppError::NotFound(
            "Track not found".to_string(),
        )));
    }
    tracing::info!("track deleted by admin");
    Ok(Json(json!({ "message": "Track deleted" })))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<Value>, HttpAppError> {
    let stats = PlatformStats {
        total_users: state.users.count_by_role(UserRole::User).await?,
        total_creators: state.users.count_by_role(UserRole::Creator).await?,
        total_tracks: state.tracks.count_all().await?,
        total_downloads: state.tracks.total_downloads().await?,
    };
    Ok(Json(json!({ "stats": stats })))
}
