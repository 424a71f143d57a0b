//! Remote image dimension probe
//!
//! The body is streamed chunk by chunk and the header is re-parsed after each chunk, so
//! a probe usually stops after the first few kilobytes instead of downloading the asset.

use crate::error::ProbeError;
use crate::metadata::ImageDimensions;
use crate::traits::ImageProbe;
use async_trait::async_trait;
use image::ImageReader;
use std::io::Cursor;
use std::time::Duration;

/// Bytes needed before an unknown signature is treated as "not an image".
const MIN_SNIFF_BYTES: usize = 16;

/// Upper bound on bytes read while looking for the header.
const DEFAULT_MAX_HEADER_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
enum HeaderProbe {
    Found(u32, u32),
    NeedMore,
    Unrecognized,
}

fn dimensions_from_prefix(data: &[u8]) -> HeaderProbe {
    let reader = match ImageReader::new(Cursor::new(data)).with_guessed_format() {
        Ok(reader) => reader,
        Err(_) => return HeaderProbe::NeedMore,
    };

    if reader.format().is_none() {
        return if data.len() < MIN_SNIFF_BYTES {
            HeaderProbe::NeedMore
        } else {
            HeaderProbe::Unrecognized
        };
    }

    match reader.into_dimensions() {
        Ok((width, height)) => HeaderProbe::Found(width, height),
        // Usually a truncated header; more bytes may complete it
        Err(_) => HeaderProbe::NeedMore,
    }
}

pub struct RemoteImageProber {
    client: reqwest::Client,
    max_header_bytes: usize,
}

impl RemoteImageProber {
    /// `timeout` bounds the whole request when set; otherwise the client default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ProbeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        })
    }

    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }
}

#[async_trait]
impl ImageProbe for RemoteImageProber {
    #[tracing::instrument(skip(self), fields(http.url = %url))]
    async fn probe(&self, url: &str) -> Result<ImageDimensions, ProbeError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            buffer.extend_from_slice(&chunk);

            match dimensions_from_prefix(&buffer) {
                HeaderProbe::Found(width, height) => {
                    tracing::debug!(bytes_read = buffer.len(), width, height, "Image header parsed");
                    return Ok(ImageDimensions::new(width, height));
                }
                HeaderProbe::Unrecognized => {
                    return Err(ProbeError::InvalidImage(format!(
                        "unrecognized image signature at {}",
                        url
                    )));
                }
                HeaderProbe::NeedMore => {}
            }

            if buffer.len() >= self.max_header_bytes {
                return Err(ProbeError::InvalidImage(format!(
                    "no image header within the first {} bytes",
                    self.max_header_bytes
                )));
            }
        }

        match dimensions_from_prefix(&buffer) {
            HeaderProbe::Found(width, height) => Ok(ImageDimensions::new(width, height)),
            _ => Err(ProbeError::InvalidImage(format!(
                "could not read image header from {} bytes",
                buffer.len()
            ))),
        }
    }
}
