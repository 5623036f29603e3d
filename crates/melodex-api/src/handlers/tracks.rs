//! Track endpoints: upload, listing, detail, edit, delete

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use melodex_core::models::{Category, TrackRow, TrackSort, UserRole};
use melodex_core::AppError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::services::upload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Upload a new track. Files are written to the media store before the
/// database record is created; a mid-sequence storage failure leaves no
/// record, and the already-written keys are logged as orphaned.
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.0.id))]
pub async fn upload_track(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), HttpAppError> {
    let parsed = upload::parse_upload(&mut multipart, state.config.max_upload_size_bytes).await?;

    let stored = match upload::store_upload(&state.storage, &parsed).await {
        Ok(stored) => stored,
        Err(failure) => {
            tracing::error!(
                error = %failure.error,
                orphaned_keys = ?failure.orphaned_keys,
                "upload aborted mid-sequence; stored objects are orphaned"
            );
            return Err(failure.error.into());
        }
    };

    let cover_url = stored
        .cover_url
        .ok_or_else(|| AppError::Internal("Upload produced no cover URL".to_string()))?;

    let track = state
        .tracks
        .create(
            user.0.id,
            &parsed.title,
            &parsed.artist,
            parsed.category,
            &cover_url,
            &stored.variants,
        )
        .await?;

    tracing::info!(track_id = %track.id, "track uploaded");
    Ok((StatusCode::CREATED, Json(json!({ "data": track }))))
}

/// Public listing with optional category filter and sort order.
pub async fn list_tracks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, HttpAppError> {
    let category = match query.category.as_deref() {
        None => None,
        Some(s) => Some(Category::from_str(s).map_err(AppError::Validation)?),
    };
    let sort = match query.sort.as_deref() {
        None => TrackSort::default(),
        Some(s) => TrackSort::from_str(s).map_err(AppError::Validation)?,
    };

    let tracks = state.tracks.list(category, sort).await?;
    Ok(Json(json!({ "data": tracks })))
}

pub async fn get_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    let track = state
        .tracks
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;
    Ok(Json(json!({ "data": track })))
}

/// The calling creator's own uploads, newest first.
pub async fn my_uploads(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Value>, HttpAppError> {
    let tracks = state.tracks.list_by_owner(user.0.id).await?;
    Ok(Json(json!({ "data": tracks })))
}

/// Owner-or-admin check shared by edit and delete.
fn check_ownership(row: &TrackRow, user: &CurrentUser) -> Result<(), AppError> {
    let allowed = match user.0.role {
        UserRole::Admin => true,
        UserRole::Creator | UserRole::User => row.owner_id == user.0.id,
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You can only modify your own uploads".to_string(),
        ))
    }
}

/// Partial edit. Supplied files replace the stored rendition for their
/// slot; omitted fields and files are left untouched.
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.0.id, track_id = %id))]
pub async fn update_track(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Value>, HttpAppError> {
    let row = state
        .tracks
        .get_row(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;
    check_ownership(&row, &user)?;

    let edit = upload::parse_edit(&mut multipart, state.config.max_upload_size_bytes).await?;

    let stored = match upload::store_edit(&state.storage, &edit).await {
        Ok(stored) => stored,
        Err(failure) => {
            tracing::error!(
                error = %failure.error,
                orphaned_keys = ?failure.orphaned_keys,
                "edit upload aborted mid-sequence; stored objects are orphaned"
            );
            return Err(failure.error.into());
        }
    };

    let track = state
        .tracks
        .update(
            id,
            edit.title.as_deref(),
            edit.artist.as_deref(),
            edit.category,
            stored.cover_url.as_deref(),
            &stored.variants,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;

    tracing::info!("track updated");
    Ok(Json(json!({ "data": track })))
}

/// Delete a track record. Variant and wishlist rows cascade in the
/// database; stored media objects are left in place.
#[tracing::instrument(skip(state, user), fields(user_id = %user.0.id, track_id = %id))]
pub async fn delete_track(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    let row = state
        .tracks
        .get_row(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;
    check_ownership(&row, &user)?;

    state.tracks.delete(id).await?;
    tracing::info!("track deleted");
    Ok(Json(json!({ "message": "Track deleted" })))
}
