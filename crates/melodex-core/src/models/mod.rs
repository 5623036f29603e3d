//! Domain models

pub mod stats;
pub mod track;
pub mod user;

pub use stats::{CreatorStats, PlatformStats};
pub use track::{Category, Track, TrackRow, TrackSort, TrackVariant, VariantType};
pub use user::{DownloadRecord, User, UserResponse, UserRole};
