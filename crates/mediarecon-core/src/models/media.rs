//! Media record model and the partial updates applied to it.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{IMAGE_EXTENSIONS, IMAGE_MIME_TYPES, VIDEO_EXTENSIONS};

/// A document of the media collection.
///
/// `height` and `width` are stored as strings; an empty string marks an unknown value.
/// Every field decodes leniently so one malformed document cannot fail a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: String,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub height: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub width: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub etag: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub size: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub duration: Option<String>,
}

impl MediaRecord {
    pub fn new(key: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            mimetype: mimetype.into(),
            height: String::new(),
            width: String::new(),
            etag: None,
            size: None,
            duration: None,
        }
    }

    pub fn with_dimensions(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.width = width.into();
        self.height = height.into();
        self
    }

    pub fn is_image(&self) -> bool {
        IMAGE_MIME_TYPES.contains(&self.mimetype.as_str())
    }

    /// Whether the dimension flows select this record: an image with an empty height or width.
    pub fn needs_dimensions(&self) -> bool {
        self.is_image() && (self.height.is_empty() || self.width.is_empty())
    }

    /// Apply a patch in place, returning whether any field changed.
    pub fn apply(&mut self, patch: &MediaPatch) -> bool {
        let before = self.clone();
        if let Some(height) = &patch.height {
            self.height = height.clone();
        }
        if let Some(width) = &patch.width {
            self.width = width.clone();
        }
        if let Some(etag) = &patch.etag {
            self.etag = Some(etag.clone());
        }
        if let Some(size) = &patch.size {
            self.size = Some(size.clone());
        }
        if let Some(duration) = &patch.duration {
            self.duration = Some(duration.clone());
        }
        *self != before
    }
}

/// Scalar written by older clients without a fixed type.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

impl Loose {
    fn into_string(self) -> Option<String> {
        match self {
            Loose::Text(s) => Some(s),
            Loose::Int(i) => Some(i.to_string()),
            Loose::Float(f) => Some(f.to_string()),
            Loose::Other(_) => None,
        }
    }
}

/// Strings and numbers are kept as text; null, absent or any other type become `""`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_opt_string(deserializer).map(Option::unwrap_or_default)
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?.and_then(Loose::into_string))
}

/// Fields written by a merge-patch (`$set`) update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl MediaPatch {
    pub fn dimensions(width: u32, height: u32) -> Self {
        Self {
            height: Some(height.to_string()),
            width: Some(width.to_string()),
            ..Default::default()
        }
    }

    pub fn image(etag: Option<String>, width: u32, height: u32, size: u64) -> Self {
        Self {
            etag,
            size: Some(size.to_string()),
            ..Self::dimensions(width, height)
        }
    }

    pub fn video(etag: Option<String>, duration: Option<String>, size: u64) -> Self {
        Self {
            etag,
            duration,
            size: Some(size.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of an update addressed by key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Kind of asset, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// `None` for unknown or missing extensions.
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        let ext = ext?;
        if IMAGE_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}
