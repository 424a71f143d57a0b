use mediarecon_core::{file_extension, file_name, MediaKind};

/// A record's asset as seen through the public bucket URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAsset {
    pub url: String,
    pub file_name: String,
    pub extension: Option<String>,
}

impl RemoteAsset {
    /// The URL is the base URL and key concatenated as-is.
    pub fn new(bucket_url: &str, key: &str) -> Self {
        let url = format!("{}{}", bucket_url, key);
        let file_name = file_name(&url).to_string();
        let extension = file_extension(&file_name);
        Self {
            url,
            file_name,
            extension,
        }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_extension(self.extension.as_deref())
    }

    pub fn is_image(&self) -> bool {
        self.kind() == Some(MediaKind::Image)
    }
}
