//! Track upload pipeline
//!
//! Multipart requests are fully buffered, validated, and only then written
//! to the media store. Validation order is fixed: required text fields,
//! then required files, then per-file size and content-type rules. No
//! storage write happens if any check fails.
//!
//! Files are stored one at a time: cover image, full, vocal, instrumental.
//! If a later write fails, the keys already written are reported on the
//! failure so they can be logged as orphaned; no rollback is attempted.

use axum::extract::multipart::Multipart;
use melodex_core::models::{Category, VariantType};
use melodex_core::validation::FileRules;
use melodex_core::AppError;
use melodex_storage::{MediaFolder, Storage, StorageError};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// One buffered multipart file.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A fully parsed upload request. `cover` and `full` are mandatory; the
/// vocal and instrumental renditions are optional.
#[derive(Debug)]
pub struct TrackUpload {
    pub title: String,
    pub artist: String,
    pub category: Category,
    pub cover: FilePart,
    pub full: FilePart,
    pub vocal: Option<FilePart>,
    pub instrumental: Option<FilePart>,
}

/// A parsed edit request. Everything is optional; supplied files replace
/// the stored rendition for their slot.
#[derive(Debug, Default)]
pub struct TrackEdit {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub category: Option<Category>,
    pub cover: Option<FilePart>,
    pub full: Option<FilePart>,
    pub vocal: Option<FilePart>,
    pub instrumental: Option<FilePart>,
}

/// Raw field collection before validation.
#[derive(Debug, Default)]
struct RawFields {
    title: Option<String>,
    artist: Option<String>,
    category: Option<String>,
    cover: Option<FilePart>,
    full: Option<FilePart>,
    vocal: Option<FilePart>,
    instrumental: Option<FilePart>,
}

/// URLs produced by a successful store sequence.
#[derive(Debug)]
pub struct StoredTrackFiles {
    pub cover_url: Option<String>,
    pub variants: Vec<(VariantType, String)>,
}

/// A partially completed store sequence. `orphaned_keys` are objects that
/// were written before the failing one; they are not referenced by any
/// record and are reported for cleanup.
#[derive(Debug)]
pub struct UploadFailure {
    pub error: StorageError,
    pub orphaned_keys: Vec<String>,
}

async fn read_fields(multipart: &mut Multipart) -> Result<RawFields, AppError> {
    let mut raw = RawFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" | "artist" | "category" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed field '{}': {}", name, e)))?;
                match name.as_str() {
                    "title" => raw.title = Some(value),
                    "artist" => raw.artist = Some(value),
                    _ => raw.category = Some(value),
                }
            }
            "image" | "fullTrack" | "vocalTrack" | "instrumentalTrack" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed field '{}': {}", name, e)))?
                    .to_vec();
                let part = FilePart {
                    filename,
                    content_type,
                    data,
                };
                match name.as_str() {
                    "image" => raw.cover = Some(part),
                    "fullTrack" => raw.full = Some(part),
                    "vocalTrack" => raw.vocal = Some(part),
                    _ => raw.instrumental = Some(part),
                }
            }
            // Unknown fields are ignored, same as unknown JSON keys.
            _ => {}
        }
    }

    Ok(raw)
}

fn require_text(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", name))),
    }
}

fn check_file(part: &FilePart, rules: &FileRules) -> Result<(), AppError> {
    rules
        .check(&part.content_type, part.data.len())
        .map_err(AppError::from)
}

/// Parse and validate an upload request. Checks run in a fixed order so
/// error responses are deterministic: text fields, category, full track,
/// cover image, then per-file rules (audio files first).
pub async fn parse_upload(
    multipart: &mut Multipart,
    max_file_bytes: usize,
) -> Result<TrackUpload, AppError> {
    let raw = read_fields(multipart).await?;

    let title = require_text(raw.title, "title")?;
    let artist = require_text(raw.artist, "artist")?;
    let category_str = require_text(raw.category, "category")?;
    let category = Category::from_str(&category_str).map_err(AppError::Validation)?;

    let full = raw
        .full
        .ok_or_else(|| AppError::Validation("fullTrack is required".to_string()))?;
    let cover = raw
        .cover
        .ok_or_else(|| AppError::Validation("image is required".to_string()))?;

    let audio = FileRules::audio(max_file_bytes);
    let image = FileRules::image(max_file_bytes);

    check_file(&full, &audio)?;
    if let Some(part) = &raw.vocal {
        check_file(part, &audio)?;
    }
    if let Some(part) = &raw.instrumental {
        check_file(part, &audio)?;
    }
    check_file(&cover, &image)?;

    Ok(TrackUpload {
        title,
        artist,
        category,
        cover,
        full,
        vocal: raw.vocal,
        instrumental: raw.instrumental,
    })
}

/// Parse and validate an edit request. Any subset of fields may be present.
pub async fn parse_edit(
    multipart: &mut Multipart,
    max_file_bytes: usize,
) -> Result<TrackEdit, AppError> {
    let raw = read_fields(multipart).await?;

    let category = match raw.category {
        Some(s) => Some(Category::from_str(&s).map_err(AppError::Validation)?),
        None => None,
    };

    let audio = FileRules::audio(max_file_bytes);
    let image = FileRules::image(max_file_bytes);

    if let Some(part) = &raw.full {
        check_file(part, &audio)?;
    }
    if let Some(part) = &raw.vocal {
        check_file(part, &audio)?;
    }
    if let Some(part) = &raw.instrumental {
        check_file(part, &audio)?;
    }
    if let Some(part) = &raw.cover {
        check_file(part, &image)?;
    }

    Ok(TrackEdit {
        title: raw.title.filter(|s| !s.trim().is_empty()),
        artist: raw.artist.filter(|s| !s.trim().is_empty()),
        category,
        cover: raw.cover,
        full: raw.full,
        vocal: raw.vocal,
        instrumental: raw.instrumental,
    })
}

/// Random object name that keeps the original extension.
fn object_filename(part: &FilePart) -> String {
    let ext = std::path::Path::new(&part.filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    format!("{}.{}", Uuid::new_v4(), ext)
}

async fn store_one(
    storage: &Arc<dyn Storage>,
    folder: MediaFolder,
    part: &FilePart,
    written: &mut Vec<String>,
) -> Result<String, UploadFailure> {
    let filename = object_filename(part);
    match storage
        .upload(folder, &filename, &part.content_type, part.data.clone())
        .await
    {
        Ok((key, url)) => {
            written.push(key);
            Ok(url)
        }
        Err(error) => Err(UploadFailure {
            error,
            orphaned_keys: std::mem::take(written),
        }),
    }
}

/// Write a validated upload to the media store, in order: cover image,
/// full track, vocal, instrumental.
pub async fn store_upload(
    storage: &Arc<dyn Storage>,
    upload: &TrackUpload,
) -> Result<StoredTrackFiles, UploadFailure> {
    let mut written = Vec::new();

    let cover_url = store_one(storage, MediaFolder::Covers, &upload.cover, &mut written).await?;

    let mut variants = Vec::new();
    let url = store_one(storage, MediaFolder::Tracks, &upload.full, &mut written).await?;
    variants.push((VariantType::Full, url));

    if let Some(part) = &upload.vocal {
        let url = store_one(storage, MediaFolder::Tracks, part, &mut written).await?;
        variants.push((VariantType::Vocal, url));
    }
    if let Some(part) = &upload.instrumental {
        let url = store_one(storage, MediaFolder::Tracks, part, &mut written).await?;
        variants.push((VariantType::Instrumental, url));
    }

    Ok(StoredTrackFiles {
        cover_url: Some(cover_url),
        variants,
    })
}

/// Write whichever files an edit request supplied, same order as uploads.
pub async fn store_edit(
    storage: &Arc<dyn Storage>,
    edit: &TrackEdit,
) -> Result<StoredTrackFiles, UploadFailure> {
    let mut written = Vec::new();

    let cover_url = match &edit.cover {
        Some(part) => Some(store_one(storage, MediaFolder::Covers, part, &mut written).await?),
        None => None,
    };

    let mut variants = Vec::new();
    let slots = [
        (VariantType::Full, edit.full.as_ref()),
        (VariantType::Vocal, edit.vocal.as_ref()),
        (VariantType::Instrumental, edit.instrumental.as_ref()),
    ];
    for (variant_type, part) in slots {
        if let Some(part) = part {
            let url = store_one(storage, MediaFolder::Tracks, part, &mut written).await?;
            variants.push((variant_type, url));
        }
    }

    Ok(StoredTrackFiles { cover_url, variants })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use melodex_storage::{StorageBackend, StorageResult};
    use std::sync::Mutex;

    /// In-memory backend that fails after a configurable number of uploads.
    struct FlakyStorage {
        fail_after: usize,
        uploads: Mutex<Vec<String>>,
    }

    impl FlakyStorage {
        fn failing_after(n: usize) -> Arc<dyn Storage> {
            Arc::new(FlakyStorage {
                fail_after: n,
                uploads: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Storage for FlakyStorage {
        async fn upload(
            &self,
            folder: MediaFolder,
            filename: &str,
            _content_type: &str,
            _data: Vec<u8>,
        ) -> StorageResult<(String, String)> {
            let mut uploads = self.uploads.lock().unwrap();
            if uploads.len() >= self.fail_after {
                return Err(StorageError::UploadFailed("backend unavailable".into()));
            }
            let key = format!("{}/{}", folder.as_str(), filename);
            uploads.push(key.clone());
            let url = format!("https://cdn.example.com/{}", key);
            Ok((key, url))
        }

        async fn delete(&self, _storage_key: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
            Ok(true)
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    fn audio_part(name: &str) -> FilePart {
        FilePart {
            filename: format!("{}.mp3", name),
            content_type: "audio/mpeg".to_string(),
            data: vec![1, 2, 3],
        }
    }

    fn image_part() -> FilePart {
        FilePart {
            filename: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        }
    }

    fn full_upload() -> TrackUpload {
        TrackUpload {
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            category: Category::Jazz,
            cover: image_part(),
            full: audio_part("full"),
            vocal: Some(audio_part("vocal")),
            instrumental: Some(audio_part("instrumental")),
        }
    }

    #[tokio::test]
    async fn test_store_upload_orders_cover_then_variants() {
        let storage = FlakyStorage::failing_after(usize::MAX);
        let stored = store_upload(&storage, &full_upload()).await.unwrap();

        assert!(stored.cover_url.unwrap().contains("music-covers/"));
        let types: Vec<VariantType> = stored.variants.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            types,
            vec![VariantType::Full, VariantType::Vocal, VariantType::Instrumental]
        );
        for (_, url) in &stored.variants {
            assert!(url.contains("music-tracks/"));
        }
    }

    #[tokio::test]
    async fn test_failure_midway_reports_orphaned_keys() {
        // Cover and full succeed, vocal fails.
        let storage = FlakyStorage::failing_after(2);
        let failure = store_upload(&storage, &full_upload()).await.unwrap_err();

        assert_eq!(failure.orphaned_keys.len(), 2);
        assert!(failure.orphaned_keys[0].starts_with("music-covers/"));
        assert!(failure.orphaned_keys[1].starts_with("music-tracks/"));
        assert!(matches!(failure.error, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_first_write_failure_orphans_nothing() {
        let storage = FlakyStorage::failing_after(0);
        let failure = store_upload(&storage, &full_upload()).await.unwrap_err();
        assert!(failure.orphaned_keys.is_empty());
    }

    #[tokio::test]
    async fn test_store_edit_only_writes_supplied_files() {
        let storage = FlakyStorage::failing_after(usize::MAX);
        let edit = TrackEdit {
            title: Some("New title".to_string()),
            vocal: Some(audio_part("vocal")),
            ..TrackEdit::default()
        };
        let stored = store_edit(&storage, &edit).await.unwrap();

        assert!(stored.cover_url.is_none());
        assert_eq!(stored.variants.len(), 1);
        assert_eq!(stored.variants[0].0, VariantType::Vocal);
    }

    const BOUNDARY: &str = "----melodex-form-boundary";

    /// Build a multipart/form-data request from text fields and files,
    /// in the order given.
    fn multipart_request(
        texts: &[(&str, &str)],
        files: &[(&str, &str, &str, &[u8])],
    ) -> axum::extract::Request {
        let mut body = Vec::new();
        for (name, value) in texts {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        for (name, filename, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, name, filename, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        axum::http::Request::builder()
            .header(
                axum::http::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(axum::body::Body::from(body))
            .unwrap()
    }

    async fn parse(request: axum::extract::Request) -> Result<TrackUpload, AppError> {
        use axum::extract::FromRequest;
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        parse_upload(&mut multipart, 10 * 1024 * 1024).await
    }

    #[tokio::test]
    async fn test_parse_rejects_missing_full_track() {
        let request = multipart_request(
            &[("title", "Song"), ("artist", "Artist"), ("category", "Pop")],
            &[("image", "cover.png", "image/png", &[1, 2, 3])],
        );
        match parse(request).await {
            Err(AppError::Validation(msg)) => assert!(msg.contains("fullTrack")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_parse_reports_text_fields_before_files() {
        // Title missing and no files at all: the text-field error wins.
        let request = multipart_request(&[("artist", "Artist"), ("category", "Pop")], &[]);
        match parse(request).await {
            Err(AppError::Validation(msg)) => assert!(msg.contains("title")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_parse_rejects_unknown_category() {
        let request = multipart_request(
            &[("title", "Song"), ("artist", "Artist"), ("category", "Techno")],
            &[
                ("fullTrack", "full.mp3", "audio/mpeg", &[1, 2, 3]),
                ("image", "cover.png", "image/png", &[1, 2, 3]),
            ],
        );
        assert!(matches!(parse(request).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_parse_accepts_category_all() {
        let request = multipart_request(
            &[("title", "Song"), ("artist", "Artist"), ("category", "All")],
            &[
                ("fullTrack", "full.mp3", "audio/mpeg", &[1, 2, 3]),
                ("image", "cover.png", "image/png", &[1, 2, 3]),
            ],
        );
        let parsed = parse(request).await.unwrap();
        assert_eq!(parsed.category, Category::All);
        assert!(parsed.vocal.is_none());
        assert!(parsed.instrumental.is_none());
    }

    #[test]
    fn test_object_filename_keeps_extension() {
        let name = object_filename(&audio_part("take-1"));
        assert!(name.ends_with(".mp3"));
        let name = object_filename(&FilePart {
            filename: "noext".to_string(),
            content_type: "audio/mpeg".to_string(),
            data: vec![1],
        });
        assert!(name.ends_with(".bin"));
    }
}
