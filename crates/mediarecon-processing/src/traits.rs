//! Probe traits used by the flows

use crate::error::ProbeError;
use crate::metadata::{ImageDimensions, MediaInfo};
use async_trait::async_trait;
use std::path::Path;

/// Reads image dimensions from a remote asset.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ImageDimensions, ProbeError>;
}

/// Reads stream and format metadata from a local file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe_file(&self, path: &Path) -> Result<MediaInfo, ProbeError>;
}
