//! Dimension audit: report image records missing height or width without writing.

use crate::asset::RemoteAsset;
use crate::error::FlowError;
use crate::summary::{ItemOutcome, RunSummary};
use futures::TryStreamExt;
use mediarecon_db::MediaRepository;
use mediarecon_processing::ImageProbe;
use std::sync::Arc;

pub struct DimensionAuditor {
    repo: Arc<dyn MediaRepository>,
    prober: Arc<dyn ImageProbe>,
    bucket_url: String,
}

impl DimensionAuditor {
    pub fn new(
        repo: Arc<dyn MediaRepository>,
        prober: Arc<dyn ImageProbe>,
        bucket_url: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            prober,
            bucket_url: bucket_url.into(),
        }
    }

    /// Run the audit. Scan-level errors end the run early and are recorded in
    /// [`RunSummary::aborted`]; they are never returned.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        if let Err(e) = self.scan(&mut summary).await {
            tracing::error!(error = %e, "[x] Found an error");
            summary.aborted = Some(e.to_string());
        }
        summary
    }

    async fn scan(&self, summary: &mut RunSummary) -> Result<(), FlowError> {
        let total = self.repo.count_missing_dimensions().await?;
        summary.total = total;

        let mut records = self.repo.find_missing_dimensions().await?;
        let mut current: u64 = 0;

        while let Some(record) = records.try_next().await? {
            current += 1;
            tracing::info!("Processing {}/{} - {}", current, total, record.key);

            let asset = RemoteAsset::new(&self.bucket_url, &record.key);
            let outcome = self.audit_one(&asset).await;
            summary.push(record.key, outcome);
        }

        Ok(())
    }

    async fn audit_one(&self, asset: &RemoteAsset) -> ItemOutcome {
        if !asset.is_image() {
            tracing::debug!(url = %asset.url, extension = ?asset.extension, "Skipping non-image key");
            return ItemOutcome::Unsupported;
        }

        tracing::info!(url = %asset.url, "Probing url");
        match self.prober.probe(&asset.url).await {
            Ok(dimensions) => match dimensions.both() {
                Some((width, height)) => {
                    tracing::info!(
                        "Key: {} - Dimensions: height ({}) width ({})",
                        asset.file_name,
                        height,
                        width
                    );
                    ItemOutcome::Measured { width, height }
                }
                None => {
                    tracing::warn!("[x] Result has no dimensions for {}.", asset.url);
                    ItemOutcome::MissingDimensions
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "[x] Caught an error - {}", asset.file_name);
                ItemOutcome::Failed(e.to_string())
            }
        }
    }
}
