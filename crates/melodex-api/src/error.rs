//! HTTP rendering for application errors.
//!
//! `AppError` lives in melodex-core and knows nothing about axum. The
//! newtype below attaches `IntoResponse` so handlers can return
//! `Result<_, HttpAppError>` and bubble errors with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use melodex_core::error::{ErrorMetadata, LogLevel};
use melodex_core::AppError;
use melodex_core::validation::ValidationError;
use melodex_storage::StorageError;
use serde::Serialize;

/// JSON body for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub code: String,
}

pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        Self(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        Self(AppError::from(err))
    }
}

impl From<sqlx::Error> for HttpAppError {
    fn from(err: sqlx::Error) -> Self {
        Self(AppError::Database(err))
    }
}

fn is_production_label(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn is_production() -> bool {
    let env = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_default();
    is_production_label(&env)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = &self.0;

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "request failed"),
            LogLevel::Error => tracing::error!(error = ?err, code = err.error_code(), "request failed"),
        }

        // Internal details are only exposed outside production.
        let details = if err.is_sensitive() && is_production() {
            None
        } else if err.is_sensitive() {
            Some(err.to_string())
        } else {
            None
        };

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorResponse {
            error: err.client_message(),
            details,
            code: err.error_code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Build the same JSON error body without going through `AppError`.
/// Used by middleware that rejects before a handler runs.
pub fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    let body = ErrorResponse {
        error: message.to_string(),
        details: None,
        code: code.to_string(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_label_detection() {
        assert!(is_production_label("production"));
        assert!(is_production_label("Production"));
        assert!(is_production_label("prod"));
        assert!(!is_production_label("development"));
        assert!(!is_production_label(""));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = HttpAppError(AppError::NotFound("Track not found".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = HttpAppError(AppError::Validation("fullTrack is required".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_error_maps_to_500() {
        let err = HttpAppError::from(StorageError::UploadFailed("bucket gone".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_file_too_large_maps_to_413() {
        let err = HttpAppError::from(ValidationError::FileTooLarge {
            size: 11 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
