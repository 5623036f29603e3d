//! Track record and its closed enumerations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Music category. A track's category must be a member of this enumeration
/// at all times; the database column is a Postgres enum with matching labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "track_category", rename_all = "snake_case")]
pub enum Category {
    All,
    Pop,
    Rock,
    Jazz,
    Classical,
    Electronic,
    #[serde(rename = "Hip Hop")]
    HipHop,
    Folk,
    Ambient,
    #[serde(rename = "R&B")]
    Rnb,
    Country,
    Blues,
    Reggae,
}

impl Default for Category {
    fn default() -> Self {
        Category::All
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::All => "All",
            Category::Pop => "Pop",
            Category::Rock => "Rock",
            Category::Jazz => "Jazz",
            Category::Classical => "Classical",
            Category::Electronic => "Electronic",
            Category::HipHop => "Hip Hop",
            Category::Folk => "Folk",
            Category::Ambient => "Ambient",
            Category::Rnb => "R&B",
            Category::Country => "Country",
            Category::Blues => "Blues",
            Category::Reggae => "Reggae",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Category::All),
            "Pop" => Ok(Category::Pop),
            "Rock" => Ok(Category::Rock),
            "Jazz" => Ok(Category::Jazz),
            "Classical" => Ok(Category::Classical),
            "Electronic" => Ok(Category::Electronic),
            "Hip Hop" => Ok(Category::HipHop),
            "Folk" => Ok(Category::Folk),
            "Ambient" => Ok(Category::Ambient),
            "R&B" => Ok(Category::Rnb),
            "Country" => Ok(Category::Country),
            "Blues" => Ok(Category::Blues),
            "Reggae" => Ok(Category::Reggae),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// Track variant type. At most one variant per type exists on a track
/// (primary key on `(track_id, variant_type)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "variant_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    Full,
    Vocal,
    Instrumental,
}

impl VariantType {
    /// Response ordering: full, then vocal, then instrumental.
    pub const ALL: [VariantType; 3] = [
        VariantType::Full,
        VariantType::Vocal,
        VariantType::Instrumental,
    ];
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantType::Full => write!(f, "full"),
            VariantType::Vocal => write!(f, "vocal"),
            VariantType::Instrumental => write!(f, "instrumental"),
        }
    }
}

impl FromStr for VariantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(VariantType::Full),
            "vocal" => Ok(VariantType::Vocal),
            "instrumental" => Ok(VariantType::Instrumental),
            other => Err(format!("Unknown track type: {}", other)),
        }
    }
}

/// One stored rendition of a track (external URL in the media store).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackVariant {
    #[serde(rename = "type")]
    pub variant_type: VariantType,
    pub url: String,
}

/// Raw `tracks` row, without variants.
#[derive(Debug, Clone, FromRow)]
pub struct TrackRow {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub category: Category,
    pub cover_image_url: String,
    pub download_count: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full track record as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub category: Category,
    pub cover_image_url: String,
    pub variants: Vec<TrackVariant>,
    pub download_count: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Track {
    pub fn from_row(row: TrackRow, variants: Vec<TrackVariant>) -> Self {
        Track {
            id: row.id,
            title: row.title,
            artist: row.artist,
            category: row.category,
            cover_image_url: row.cover_image_url,
            variants,
            download_count: row.download_count,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    pub fn variant(&self, variant_type: VariantType) -> Option<&TrackVariant> {
        self.variants.iter().find(|v| v.variant_type == variant_type)
    }
}

/// Sort order for track listings. Every mode breaks ties on `id` so listing
/// order is deterministic for equal timestamps or counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSort {
    Newest,
    Oldest,
    Popular,
}

impl Default for TrackSort {
    fn default() -> Self {
        TrackSort::Newest
    }
}

impl FromStr for TrackSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(TrackSort::Newest),
            "oldest" => Ok(TrackSort::Oldest),
            "popular" => Ok(TrackSort::Popular),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

impl TrackSort {
    /// ORDER BY clause for this sort mode.
    pub fn order_by(&self) -> &'static str {
        match self {
            TrackSort::Newest => "created_at DESC, id",
            TrackSort::Oldest => "created_at ASC, id",
            TrackSort::Popular => "download_count DESC, id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for name in [
            "All", "Pop", "Rock", "Jazz", "Classical", "Electronic", "Hip Hop", "Folk",
            "Ambient", "R&B", "Country", "Blues", "Reggae",
        ] {
            let parsed: Category = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("Techno".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_display_names() {
        assert_eq!(
            serde_json::to_string(&Category::HipHop).unwrap(),
            "\"Hip Hop\""
        );
        assert_eq!(serde_json::to_string(&Category::Rnb).unwrap(), "\"R&B\"");
        let parsed: Category = serde_json::from_str("\"R&B\"").unwrap();
        assert_eq!(parsed, Category::Rnb);
    }

    #[test]
    fn test_variant_type_parse() {
        assert_eq!("full".parse::<VariantType>().unwrap(), VariantType::Full);
        assert_eq!("VOCAL".parse::<VariantType>().unwrap(), VariantType::Vocal);
        assert!("karaoke".parse::<VariantType>().is_err());
    }

    #[test]
    fn test_variant_serializes_as_type_field() {
        let v = TrackVariant {
            variant_type: VariantType::Full,
            url: "https://cdn.example.com/music-tracks/a.mp3".to_string(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "full");
        assert!(json.get("variant_type").is_none());
    }

    #[test]
    fn test_sort_order_has_id_tiebreak() {
        for sort in [TrackSort::Newest, TrackSort::Oldest, TrackSort::Popular] {
            assert!(sort.order_by().ends_with("id"));
        }
        assert_eq!("popular".parse::<TrackSort>().unwrap(), TrackSort::Popular);
    }
}
