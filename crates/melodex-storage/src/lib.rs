//! Melodex Storage Library
//!
//! Media store adapter: wraps an object store behind the [`Storage`] trait.
//! Backends: S3 (and S3-compatible providers) via `object_store`, and the
//! local filesystem for development.
//!
//! # Storage key format
//!
//! Keys are folder-scoped: `music-tracks/{filename}` for audio and
//! `music-covers/{filename}` for cover art. Keys must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module so both
//! backends stay consistent.

pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use melodex_core::StorageBackend;
pub use s3::S3Storage;
pub use traits::{MediaFolder, Storage, StorageError, StorageResult};
