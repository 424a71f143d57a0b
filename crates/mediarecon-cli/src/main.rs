//! mediarecon: repairs media records and uploads assets for a deployment stage.
//!
//! Configuration comes from the environment or a `.env` file. Unless `--no-tunnel` is set,
//! an SSH tunnel to the stage host is opened before the flow connects to the database.

use anyhow::Context;
use clap::Parser;
use mediarecon_cli::{Cli, Commands};
use mediarecon_core::{Config, Stage};
use mediarecon_infra::{init_tracing, SshTunnel, TunnelSpec};
use mediarecon_processing::{FfprobeProber, RemoteImageProber};
use mediarecon_services::{
    connect_media_store, AssetUploader, DimensionAuditor, DimensionFixer, RunSummary,
};
use mediarecon_storage::S3Storage;
use std::sync::Arc;

/// Open the tunnel for `stage`. Only an unreadable key is an error; anything else is
/// logged and the flow runs without a confirmed tunnel.
async fn open_tunnel(config: &Config, stage: Stage) -> anyhow::Result<Option<SshTunnel>> {
    let spec = TunnelSpec::from_config(config, stage);
    let mut tunnel = match SshTunnel::spawn(&spec).await {
        Ok(tunnel) => tunnel,
        Err(e) if e.is_fatal() => return Err(e).context("Failed to open SSH tunnel"),
        Err(e) => {
            tracing::error!(error = %e, host = %spec.host, "SSH tunnel could not be started");
            return Ok(None);
        }
    };

    if let Err(e) = tunnel.wait_ready().await {
        tracing::error!(error = %e, host = %spec.host, "SSH tunnel is not ready");
    }
    Ok(Some(tunnel))
}

fn log_summary(flow: &str, summary: &RunSummary) {
    tracing::info!(
        flow,
        total = summary.total,
        processed = summary.processed(),
        updated = summary.updated_count(),
        errors = summary.error_count(),
        "Run finished"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let stage = cli.command.stage();
    let target = config.target(stage);

    let _tunnel = if cli.no_tunnel {
        None
    } else {
        open_tunnel(&config, stage).await?
    };

    match cli.command {
        Commands::Audit { .. } => {
            let repo = match connect_media_store(&config, stage).await {
                Ok(repo) => repo,
                Err(e) => {
                    tracing::error!(error = %e, %stage, "[x] Found an error");
                    return Ok(());
                }
            };
            let prober = RemoteImageProber::new(config.probe_timeout)
                .context("Failed to build HTTP client")?;
            let summary = DimensionAuditor::new(repo, Arc::new(prober), target.bucket_url.clone())
                .run()
                .await;
            log_summary("audit", &summary);
        }
        Commands::Fix { .. } => {
            let repo = connect_media_store(&config, stage)
                .await
                .with_context(|| format!("Failed to connect to the {} database", stage))?;
            let prober = RemoteImageProber::new(config.probe_timeout)
                .context("Failed to build HTTP client")?;
            let summary = DimensionFixer::new(repo, Arc::new(prober), target.bucket_url.clone())
                .run()
                .await
                .context("Fix run failed")?;
            log_summary("fix", &summary);
        }
        Commands::Upload { dir, .. } => {
            let repo = connect_media_store(&config, stage)
                .await
                .with_context(|| format!("Failed to connect to the {} database", stage))?;
            let storage = S3Storage::new(&config.aws, config.upload_timeout)
                .context("Failed to configure S3 storage")?;
            let prober = FfprobeProber::new(config.ffprobe_path.clone(), config.ffprobe_timeout);
            let summary = AssetUploader::new(Arc::new(storage), repo, Arc::new(prober))
                .run(&dir)
                .await
                .with_context(|| format!("Upload of {} failed", dir.display()))?;
            log_summary("upload", &summary);
        }
    }

    Ok(())
}
