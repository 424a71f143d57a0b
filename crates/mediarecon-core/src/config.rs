//! Configuration module
//!
//! Configuration is read once from the environment (and a `.env` file when present) and
//! passed by reference into each flow. Every key the tunnel, database, and storage
//! adapters need is required; a missing key fails startup with the key's name.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_FFPROBE_PATH,
    DEFAULT_SSH_PORT, DEFAULT_TUNNEL_READY_TIMEOUT_SECS, LOCAL_PORT_PLACEHOLDER,
};
use crate::error::{AppError, AppResult};
use crate::models::Stage;

/// Connection details for one stage.
#[derive(Clone, Debug)]
pub struct StageTarget {
    /// Connection URI with the local tunnel port already substituted.
    pub mongo_uri: String,
    /// Public base URL of the stage bucket; record keys are appended to it.
    pub bucket_url: String,
    /// SSH host the tunnel is opened through.
    pub host: String,
}

#[derive(Clone, Debug)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub upload_bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers. Path-style addressing is used when set.
    pub endpoint_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SshConfig {
    pub username: String,
    pub private_key_path: PathBuf,
    pub port: u16,
    pub ready_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub local_port: u16,
    pub dev: StageTarget,
    pub staging: StageTarget,
    pub production: StageTarget,
    pub aws: AwsConfig,
    pub ssh: SshConfig,
    pub database_name: String,
    pub collection_name: String,
    pub ffprobe_path: String,
    pub probe_timeout: Option<Duration>,
    pub upload_timeout: Option<Duration>,
    pub ffprobe_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(AppError::MissingConfig(key));

        let local_port_raw = required("LOCAL_PORT")?;
        let local_port = parse_value::<u16>("LOCAL_PORT", &local_port_raw)?;

        let stage = |uri_key: &'static str, bucket_key: &'static str, host_key: &'static str| {
            Ok::<_, AppError>(StageTarget {
                mongo_uri: required(uri_key)?.replacen(
                    LOCAL_PORT_PLACEHOLDER,
                    &local_port_raw,
                    1,
                ),
                bucket_url: required(bucket_key)?,
                host: required(host_key)?,
            })
        };

        let dev = stage("MONGO_URI_DEV", "BUCKET_DEV_URL", "HOST_DEV")?;
        let staging = stage("MONGO_URI_STAG", "BUCKET_STAG_URL", "HOST_STAG")?;
        let production = stage("MONGO_URI_PROD", "BUCKET_PROD_URL", "HOST_PROD")?;

        let aws = AwsConfig {
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            upload_bucket: required("AWS_BUCKET_UPLOAD")?,
            region: lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            endpoint_url: lookup("AWS_ENDPOINT_URL"),
        };

        let ssh = SshConfig {
            private_key_path: PathBuf::from(required("AWS_PEM_FILE")?),
            username: required("LINUX_USERNAME")?,
            port: optional_value("SSH_PORT", &lookup)?.unwrap_or(DEFAULT_SSH_PORT),
            ready_timeout: Duration::from_secs(
                optional_value("TUNNEL_READY_TIMEOUT_SECS", &lookup)?
                    .unwrap_or(DEFAULT_TUNNEL_READY_TIMEOUT_SECS),
            ),
        };

        Ok(Config {
            local_port,
            dev,
            staging,
            production,
            aws,
            ssh,
            database_name: lookup("MONGO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection_name: lookup("MONGO_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| DEFAULT_FFPROBE_PATH.to_string()),
            probe_timeout: optional_value("PROBE_TIMEOUT_SECS", &lookup)?.map(Duration::from_secs),
            upload_timeout: optional_value("UPLOAD_TIMEOUT_SECS", &lookup)?
                .map(Duration::from_secs),
            ffprobe_timeout: optional_value("FFPROBE_TIMEOUT_SECS", &lookup)?
                .map(Duration::from_secs),
        })
    }

    pub fn target(&self, stage: Stage) -> &StageTarget {
        match stage {
            Stage::Dev => &self.dev,
            Stage::Staging => &self.staging,
            Stage::Production => &self.production,
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> AppResult<T> {
    raw.trim().parse().map_err(|_| AppError::InvalidConfig {
        key,
        value: raw.to_string(),
    })
}

fn optional_value<T, F>(key: &'static str, lookup: &F) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|raw| parse_value(key, &raw)).transpose()
}
