//! Asset upload: push a local directory tree to object storage and record each file's
//! metadata on the matching media record.

use crate::error::{FlowError, ItemError};
use crate::summary::{ItemOutcome, RunSummary};
use mediarecon_core::{file_extension, file_name, MediaKind, MediaPatch};
use mediarecon_db::MediaRepository;
use mediarecon_processing::MediaProbe;
use mediarecon_storage::Storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// All regular files under `root`, depth-first in file-name order. Directories are
/// traversed but never returned.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub struct AssetUploader {
    storage: Arc<dyn Storage>,
    repo: Arc<dyn MediaRepository>,
    prober: Arc<dyn MediaProbe>,
}

impl AssetUploader {
    pub fn new(
        storage: Arc<dyn Storage>,
        repo: Arc<dyn MediaRepository>,
        prober: Arc<dyn MediaProbe>,
    ) -> Self {
        Self {
            storage,
            repo,
            prober,
        }
    }

    /// Upload every file under `root`. Listing errors end the run; per-file errors are
    /// logged with the path and counted.
    pub async fn run(&self, root: &Path) -> Result<RunSummary, FlowError> {
        let files = list_files(root)?;
        let total = files.len();
        let mut summary = RunSummary::new(total as u64);
        tracing::info!(root = %root.display(), files = total, "Uploading directory");

        for (index, path) in files.into_iter().enumerate() {
            tracing::info!(
                "Processing file {}/{} ({})",
                index + 1,
                total,
                path.display()
            );
            let outcome = match self.upload_one(&path).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "[x] Upload failed");
                    ItemOutcome::Failed(e.to_string())
                }
            };
            summary.push(path.display().to_string(), outcome);
        }

        match summary.error_count() {
            0 => tracing::info!("The process has ended without errors."),
            n => tracing::warn!("The process ended with {} errors.", n),
        }

        Ok(summary)
    }

    async fn upload_one(&self, path: &Path) -> Result<ItemOutcome, ItemError> {
        let path_str = path.to_string_lossy();
        let name = file_name(&path_str).to_string();

        let data = tokio::fs::read(path).await?;
        let size = tokio::fs::metadata(path).await?.len();

        let receipt = self.storage.upload_public(&name, data).await?;
        tracing::info!(key = %receipt.key, url = %receipt.url, "Uploaded");

        let patch = match MediaKind::from_extension(file_extension(&name).as_deref()) {
            Some(MediaKind::Image) => {
                let info = self.prober.probe_file(path).await?;
                MediaPatch::image(
                    receipt.etag,
                    info.width.unwrap_or(0),
                    info.height.unwrap_or(0),
                    size,
                )
            }
            Some(MediaKind::Video) => {
                let info = self.prober.probe_file(path).await?;
                MediaPatch::video(receipt.etag, info.duration, size)
            }
            None => {
                tracing::debug!(key = %name, "No record fields for this file type");
                return Ok(ItemOutcome::UploadedOnly);
            }
        };

        let outcome = self.repo.update_by_key(&name, &patch).await?;
        tracing::info!(
            "{} - Found: {} - Modified: {}",
            name,
            outcome.matched_count,
            outcome.modified_count
        );

        Ok(ItemOutcome::Updated(outcome))
    }
}
