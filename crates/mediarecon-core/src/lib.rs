//! Mediarecon Core Library
//!
//! This crate provides the domain models, error types, configuration, and path helpers
//! shared by the database, storage, probing, and flow crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::{AwsConfig, Config, SshConfig, StageTarget};
pub use error::{AppError, AppResult};
pub use models::{MediaKind, MediaPatch, MediaRecord, Stage, UpdateOutcome};
pub use paths::{file_extension, file_name};
