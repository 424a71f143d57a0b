//! Mediarecon Media Probing Library
//!
//! Probes read just enough of an asset to report its structure: pixel dimensions of a
//! remote image, or width, height and duration of a local file via `ffprobe`.

pub mod error;
pub mod ffprobe;
pub mod image_probe;
pub mod metadata;
pub mod traits;

pub use error::ProbeError;
pub use ffprobe::{parse_ffprobe_output, FfprobeProber};
pub use image_probe::RemoteImageProber;
pub use metadata::{ImageDimensions, MediaInfo};
pub use traits::{ImageProbe, MediaProbe};
