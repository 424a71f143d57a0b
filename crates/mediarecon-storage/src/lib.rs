//! Mediarecon Storage Library
//!
//! Object storage for the uploader. Objects live in a flat namespace: the key is the
//! file's base name and every object is uploaded publicly readable.

pub mod s3;
pub mod traits;

pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, UploadReceipt};
