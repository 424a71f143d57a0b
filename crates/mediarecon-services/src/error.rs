use mediarecon_db::DbError;
use mediarecon_processing::ProbeError;
use mediarecon_storage::StorageError;

/// Errors that end a flow. Per-item failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Failed to list files: {0}")]
    Listing(#[from] walkdir::Error),
}

/// Why a single record or file failed.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
