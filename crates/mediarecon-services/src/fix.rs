//! Dimension repair: probe image records missing height or width and write both back.

use crate::asset::RemoteAsset;
use crate::error::{FlowError, ItemError};
use crate::summary::{ItemOutcome, RunSummary};
use futures::TryStreamExt;
use mediarecon_core::{MediaPatch, MediaRecord};
use mediarecon_db::MediaRepository;
use mediarecon_processing::ImageProbe;
use std::sync::Arc;

pub struct DimensionFixer {
    repo: Arc<dyn MediaRepository>,
    prober: Arc<dyn ImageProbe>,
    bucket_url: String,
}

impl DimensionFixer {
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

    /// Repair every selected record. A failing record is logged and counted; only count or
    /// cursor errors end the run.
    pub async fn run(&self) -> Result<RunSummary, FlowError> {
        let total = self.repo.count_missing_dimensions().await?;
        let mut summary = RunSummary::new(total);

        let mut records = self.repo.find_missing_dimensions().await?;
        let mut current: u64 = 0;

        while let Some(record) = records.try_next().await? {
            current += 1;
            tracing::info!("Processing {}/{} - {}", current, total, record.key);

            let outcome = match self.fix_one(&record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "[x] Thrown error for {}", record.key);
                    ItemOutcome::Failed(e.to_string())
                }
            };
            summary.push(record.key, outcome);
        }

        let errors = summary.error_count();
        if errors > 0 {
            tracing::warn!(">>> Process finished with {} errors.", errors);
        } else {
            tracing::info!(updated = summary.updated_count(), ">>> Process finished.");
        }

        Ok(summary)
    }

    async fn fix_one(&self, record: &MediaRecord) -> Result<ItemOutcome, ItemError> {
        let asset = RemoteAsset::new(&self.bucket_url, &record.key);
        if !asset.is_image() {
            tracing::debug!(url = %asset.url, extension = ?asset.extension, "Skipping non-image key");
            return Ok(ItemOutcome::Unsupported);
        }

        let dimensions = self.prober.probe(&asset.url).await?;
        let Some((width, height)) = dimensions.both() else {
            tracing::warn!("[x] Result has no dimensions for {}.", asset.url);
            return Ok(ItemOutcome::MissingDimensions);
        };

        let outcome = self
            .repo
            .update_by_key(&record.key, &MediaPatch::dimensions(width, height))
            .await?;

        tracing::info!(
            "Key: {} - Found: {} - Modified: {}",
            record.key,
            outcome.matched_count,
            outcome.modified_count
        );

        Ok(ItemOutcome::Updated(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockImageProbe, MockMediaRepository};
    use mediarecon_core::UpdateOutcome;
    use mediarecon_processing::ImageDimensions;

    const BASE: &str = "https://prod.example.com/";

    fn url(key: &str) -> String {
        format!("{}{}", BASE, key)
    }

    fn updated(matched: u64, modified: u64) -> ItemOutcome {
        ItemOutcome::Updated(UpdateOutcome {
            matched_count: matched,
            modified_count: modified,
        })
    }

    #[tokio::test]
    async fn writes_measured_dimensions() {
        let repo = Arc::new(MockMediaRepository::new(vec![
            MediaRecord::new("a.png", "image/png"),
            MediaRecord::new("b.jpg", "image/jpg").with_dimensions("10", ""),
            MediaRecord::new("c.mp4", "video/mp4"),
        ]));
        let prober = Arc::new(
            MockImageProbe::default()
                .with(&url("a.png"), ImageDimensions::new(200, 100))
                .with(&url("b.jpg"), ImageDimensions::new(10, 20)),
        );

        let summary = DimensionFixer::new(repo.clone(), prober, BASE)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.error_count(), 0);
        assert_eq!(summary.outcome_for("a.png"), Some(&updated(1, 1)));
        assert_eq!(summary.outcome_for("b.jpg"), Some(&updated(1, 1)));
        assert_eq!(
            repo.updates(),
            vec![
                ("a.png".to_string(), MediaPatch::dimensions(200, 100)),
                ("b.jpg".to_string(), MediaPatch::dimensions(10, 20)),
            ]
        );

        let a = repo.record("a.png").unwrap();
        assert_eq!((a.width.as_str(), a.height.as_str()), ("200", "100"));
        // The video record is never selected
        assert!(repo.record("c.mp4").unwrap().width.is_empty());
    }

    #[tokio::test]
    async fn partial_dimensions_are_not_written() {
        let repo = Arc::new(MockMediaRepository::new(vec![MediaRecord::new(
            "a.png",
            "image/png",
        )]));
        let prober = Arc::new(MockImageProbe::default().with(
            &url("a.png"),
            ImageDimensions {
                width: Some(200),
                height: None,
            },
        ));

        let summary = DimensionFixer::new(repo.clone(), prober, BASE)
            .run()
            .await
            .unwrap();

        assert_eq!(
            summary.outcome_for("a.png"),
            Some(&ItemOutcome::MissingDimensions)
        );
        assert_eq!(summary.error_count(), 0);
        assert!(repo.updates().is_empty());
    }

    #[tokio::test]
    async fn failures_do_not_stop_later_records() {
        let repo = Arc::new(MockMediaRepository::new(vec![
            MediaRecord::new("broken.png", "image/png"),
            MediaRecord::new("locked.png", "image/png"),
            MediaRecord::new("fine.png", "image/png"),
        ]));
        repo.fail_update_for("locked.png");
        let prober = Arc::new(
            MockImageProbe::default()
                .with(&url("locked.png"), ImageDimensions::new(1, 1))
                .with(&url("fine.png"), ImageDimensions::new(30, 40)),
        );

        let summary = DimensionFixer::new(repo.clone(), prober, BASE)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.processed(), 3);
        assert_eq!(summary.error_count(), 2);
        assert!(summary.outcome_for("broken.png").unwrap().is_failure());
        assert!(summary.outcome_for("locked.png").unwrap().is_failure());
        assert_eq!(summary.outcome_for("fine.png"), Some(&updated(1, 1)));
        assert!(!repo.record("fine.png").unwrap().needs_dimensions());
    }

    #[tokio::test]
    async fn second_run_finds_nothing() {
        let repo = Arc::new(MockMediaRepository::new(vec![MediaRecord::new(
            "a.png",
            "image/png",
        )]));
        let prober = Arc::new(MockImageProbe::default().with(&url("a.png"), ImageDimensions::new(5, 6)));
        let fixer = DimensionFixer::new(repo.clone(), prober.clone(), BASE);

        fixer.run().await.unwrap();
        let second = fixer.run().await.unwrap();

        assert_eq!(second.total, 0);
        assert_eq!(second.processed(), 0);
        assert_eq!(repo.updates().len(), 1);
        assert_eq!(prober.calls().len(), 1);
    }

    #[tokio::test]
    async fn key_without_extension_is_skipped() {
        let repo = Arc::new(MockMediaRepository::new(vec![MediaRecord::new(
            "legacy-upload",
            "image/jpeg",
        )]));
        let prober = Arc::new(MockImageProbe::default());

        let summary = DimensionFixer::new(repo.clone(), prober.clone(), BASE)
            .run()
            .await
            .unwrap();

        assert_eq!(
            summary.outcome_for("legacy-upload"),
            Some(&ItemOutcome::Unsupported)
        );
        assert_eq!(summary.error_count(), 0);
        assert!(prober.calls().is_empty());
        assert!(repo.updates().is_empty());
    }

    #[tokio::test]
    async fn scan_errors_end_the_run() {
        let records = vec![
            MediaRecord::new("a.png", "image/png"),
            MediaRecord::new("b.png", "image/png"),
        ];

        let repo = Arc::new(MockMediaRepository::new(records.clone()));
        repo.fail_scan();
        let prober = Arc::new(MockImageProbe::default());
        let err = DimensionFixer::new(repo, prober, BASE)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Database(_)));

        let repo = Arc::new(MockMediaRepository::new(records));
        repo.fail_cursor_after(1);
        let prober = Arc::new(MockImageProbe::default().with(&url("a.png"), ImageDimensions::new(2, 2)));
        let result = DimensionFixer::new(repo.clone(), prober, BASE).run().await;
        assert!(matches!(result, Err(FlowError::Database(_))));
        // The record read before the failure was still written
        assert_eq!(repo.updates().len(), 1);
    }
}
