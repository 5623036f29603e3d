//! Upload validation rules
//!
//! Per-file checks applied before any storage write: size cap and a
//! MIME-prefix allow-list (audio files for track fields, image files for
//! the cover).

use thiserror::Error;

use crate::AppError;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes exceeds max {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type '{content_type}', expected '{expected_prefix}*'")]
    InvalidContentType {
        content_type: String,
        expected_prefix: String,
    },

    #[error("File is empty")]
    EmptyFile,

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

/// Size and content-type rules for one upload field.
#[derive(Debug, Clone)]
pub struct FileRules {
    pub max_size_bytes: usize,
    /// Accepted MIME prefix, e.g. "audio/" or "image/"
    pub content_type_prefix: &'static str,
}

impl FileRules {
    pub fn audio(max_size_bytes: usize) -> Self {
        FileRules {
            max_size_bytes,
            content_type_prefix: "audio/",
        }
    }

    pub fn image(max_size_bytes: usize) -> Self {
        FileRules {
            max_size_bytes,
            content_type_prefix: "image/",
        }
    }

    /// Validate a buffered file against these rules.
    pub fn check(&self, content_type: &str, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size > self.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }
        if !content_type
            .to_lowercase()
            .starts_with(self.content_type_prefix)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                expected_prefix: self.content_type_prefix.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_rules_accept_audio() {
        let rules = FileRules::audio(10 * 1024 * 1024);
        assert!(rules.check("audio/mpeg", 1024).is_ok());
        assert!(rules.check("AUDIO/WAV", 1024).is_ok());
    }

    #[test]
    fn test_rejects_wrong_content_type() {
        let rules = FileRules::audio(1024);
        match rules.check("video/mp4", 10) {
            Err(ValidationError::InvalidContentType { content_type, .. }) => {
                assert_eq!(content_type, "video/mp4")
            }
            other => panic!("Expected InvalidContentType, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_oversized_and_empty_files() {
        let rules = FileRules::image(100);
        assert!(matches!(
            rules.check("image/png", 101),
            Err(ValidationError::FileTooLarge { size: 101, max: 100 })
        ));
        assert!(matches!(
            rules.check("image/png", 0),
            Err(ValidationError::EmptyFile)
        ));
        assert!(rules.check("image/png", 100).is_ok());
    }
}
