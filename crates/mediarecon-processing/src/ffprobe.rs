//! Local media probe backed by the `ffprobe` executable
//!
//! The tool runs with `-v error -show_format -show_streams` and its default text output
//! is scanned with regular expressions. The first match of each field wins.

use crate::error::ProbeError;
use crate::metadata::MediaInfo;
use crate::traits::MediaProbe;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;

static WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"width="?([0-9]*)"?"#).expect("valid width pattern"));
static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"height="?([0-9]*)"?"#).expect("valid height pattern"));
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"duration="?(\d*\.\d*)"?"#).expect("valid duration pattern"));

fn first_capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

/// Extract width, height and duration from `ffprobe` text output.
///
/// An empty capture (`width=` with no digits) counts as absent.
pub fn parse_ffprobe_output(text: &str) -> MediaInfo {
    MediaInfo {
        width: first_capture(&WIDTH_RE, text).and_then(|s| s.parse().ok()),
        height: first_capture(&HEIGHT_RE, text).and_then(|s| s.parse().ok()),
        duration: first_capture(&DURATION_RE, text)
            .filter(|s| *s != ".")
            .map(str::to_string),
    }
}

pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Option<Duration>,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe_file(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-show_format", "-show_streams"])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, output)
                .await
                .map_err(|_| ProbeError::Timeout(timeout))??,
            None => output.await?,
        };

        if !output.status.success() {
            return Err(ProbeError::CommandFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let info = parse_ffprobe_output(&String::from_utf8_lossy(&output.stdout));

        tracing::debug!(
            width = ?info.width,
            height = ?info.height,
            duration = ?info.duration,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffprobe finished"
        );

        Ok(info)
    }
}
