//! Aggregate statistics for the admin and creator dashboards

use serde::Serialize;

/// Platform-wide totals (admin dashboard).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_creators: i64,
    pub total_tracks: i64,
    pub total_downloads: i64,
}

/// Per-creator totals. `total_listens` mirrors downloads; there is no
/// separate play counter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorStats {
    pub total_uploads: i64,
    pub total_downloads: i64,
    pub total_listens: i64,
}
