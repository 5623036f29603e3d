//! Track download endpoint
//!
//! Download order is fixed: verify the variant exists, bump the track's
//! download counter, then append the history row. The counter update is a
//! single atomic SQL increment, so concurrent downloads never lose counts.

use axum::extract::{Path, State};
use axum::Json;
use melodex_core::models::VariantType;
use melodex_core::AppError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    /// Which rendition to download; defaults to the full track.
    #[serde(default)]
    pub track_type: Option<String>,
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.0.id, track_id = %id))]
pub async fn download_track(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<Value>, HttpAppError> {
    let variant_type = match request.track_type.as_deref() {
        None | Some("") => VariantType::Full,
        Some(s) => VariantType::from_str(s).map_err(AppError::Validation)?,
    };

    // Verify before recording anything.
    let url = state
        .tracks
        .variant_url(id, variant_type)
        .await?
        .ok_or_else(|| AppError::NotFound("Track variant not found".to_string()))?;

    if !state.tracks.increment_download_count(id).await? {
        return Err(HttpAppError(AppError::NotFound(
            "Track not found".to_string(),
        )));
    }
    state.users.history_append(user.0.id, id).await?;

    tracing::info!(track_type = %variant_type, "download recorded");
    Ok(Json(json!({ "url": url })))
}
