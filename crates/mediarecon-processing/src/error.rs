use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffprobe exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),
}
