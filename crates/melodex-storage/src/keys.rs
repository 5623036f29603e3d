//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{filename}`, e.g. `music-tracks/3f2a….mp3`.

use crate::traits::MediaFolder;

/// Generate a storage key for the given folder and filename.
///
/// Both backends must use this format so keys stay portable between them.
pub fn generate_storage_key(folder: MediaFolder, filename: &str) -> String {
    format!("{}/{}", folder.as_str(), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(
            generate_storage_key(MediaFolder::Tracks, "a.mp3"),
            "music-tracks/a.mp3"
        );
        assert_eq!(
            generate_storage_key(MediaFolder::Covers, "b.png"),
            "music-covers/b.png"
        );
    }
}
