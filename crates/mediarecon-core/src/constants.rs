//! Application constants

/// Database holding the media collection.
pub const DEFAULT_DATABASE: &str = "nikkei";

/// Collection holding one document per stored asset.
pub const DEFAULT_COLLECTION: &str = "media";

/// Placeholder in the connection URIs replaced by the local tunnel port.
pub const LOCAL_PORT_PLACEHOLDER: &str = "local_port";

/// MongoDB default port on the remote side of the tunnel.
pub const REMOTE_DATABASE_PORT: u16 = 27017;

pub const DEFAULT_SSH_PORT: u16 = 22;

pub const DEFAULT_TUNNEL_READY_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_AWS_REGION: &str = "us-east-1";

pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";

/// Image MIME types selected for dimension repair.
pub const IMAGE_MIME_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

/// Extensions probed as images.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Extensions probed as video.
pub const VIDEO_EXTENSIONS: [&str; 1] = ["mp4"];
