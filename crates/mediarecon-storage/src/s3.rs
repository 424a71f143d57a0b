use crate::traits::{Storage, StorageError, StorageResult, UploadReceipt};
use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use mediarecon_core::AwsConfig;
use std::time::Duration;

const CREDENTIALS_PROVIDER: &str = "mediarecon";

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create an S3 client for the upload bucket with explicit credentials.
    ///
    /// Requests are not retried. `timeout` bounds each operation when set.
    pub fn new(config: &AwsConfig, timeout: Option<Duration>) -> StorageResult<Self> {
        if config.upload_bucket.is_empty() {
            return Err(StorageError::ConfigError(
                "upload bucket must not be empty".to_string(),
            ));
        }

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());

        if let Some(timeout) = timeout {
            builder =
                builder.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
        }

        // Path-style addressing for S3-compatible providers
        if let Some(ref endpoint) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(S3Storage {
            client: Client::from_conf(builder.build()),
            bucket: config.upload_bucket.clone(),
            region: config.region.clone(),
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    /// Public URL for an object.
    ///
    /// AWS: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// Custom endpoint: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains('/') || key == "." || key == ".." {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_public(&self, key: &str, data: Vec<u8>) -> StorageResult<UploadReceipt> {
        validate_key(key)?;

        let size = data.len() as u64;
        let body = ByteStream::from(Bytes::from(data));
        let start = std::time::Instant::now();

        // The canned ACL travels as a signed x-amz-acl header
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let e = DisplayErrorContext(&e);
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let etag = output.e_tag().map(str::to_string);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            etag = etag.as_deref().unwrap_or(""),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(UploadReceipt {
            key: key.to_string(),
            etag,
            url: self.generate_url(key),
        })
    }
}
