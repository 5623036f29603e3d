//! Creator dashboard stats

use axum::extract::State;
use axum::Json;
use melodex_core::models::CreatorStats;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn creator_stats(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Value>, HttpAppError> {
    let total_downloads = state.tracks.total_downloads_by_owner(user.0.id).await?;
    let stats = CreatorStats {
        total_uploads: state.tracks.count_by_owner(user.0.id).await?,
        total_downloads,
        // No separate play counter exists; listens mirror downloads.
        total_listens: total_downloads,
    };
    Ok(Json(json!({ "stats": stats })))
}
