//! Error types module
//!
//! Startup failures (configuration) are reported through `AppError`. Each I/O crate
//! defines its own error enum for the operations it wraps.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} must be set")]
    MissingConfig(&'static str),

    #[error("{key} has an invalid value: {value}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("Unknown stage: {0} (expected dev, staging or production)")]
    UnknownStage(String),
}

pub type AppResult<T> = Result<T, AppError>;
