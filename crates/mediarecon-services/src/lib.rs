//! Mediarecon Services
//!
//! The three reconciliation flows. Each runs sequentially over its input, isolates
//! per-item failures, and returns a [`RunSummary`] describing what happened to every item.
//!
//! - [`DimensionAuditor`]: probe image records missing dimensions and report, no writes
//! - [`DimensionFixer`]: probe the same records and write the dimensions back
//! - [`AssetUploader`]: upload a directory tree and record each file's metadata

pub mod asset;
pub mod audit;
pub mod error;
pub mod fix;
pub mod summary;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use asset::RemoteAsset;
pub use audit::DimensionAuditor;
pub use error::{FlowError, ItemError};
pub use fix::DimensionFixer;
pub use summary::{ItemOutcome, ItemReport, RunSummary};
pub use upload::{list_files, AssetUploader};

use mediarecon_core::{Config, Stage};
use mediarecon_db::{DbResult, MediaRepository, MongoMediaRepository};
use std::sync::Arc;

/// Open the media collection of a stage. Shared by all flows.
pub async fn connect_media_store(
    config: &Config,
    stage: Stage,
) -> DbResult<Arc<dyn MediaRepository>> {
    let repo = MongoMediaRepository::connect(
        &config.target(stage).mongo_uri,
        &config.database_name,
        &config.collection_name,
    )
    .await?;
    Ok(Arc::new(repo))
}
