//! Application-wide constants

/// Prefix for all API routes
pub const API_PREFIX: &str = "/api";

/// Default per-file upload limit in megabytes
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 10;

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default JWT expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
