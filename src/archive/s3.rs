//! S3-compatible object store backend for the archiver.
//!
//! Works against AWS S3 and path-style S3-compatible stores (MinIO, etc.)
//! via a custom endpoint.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use super::{ArchiveError, ObjectStore};

/// Configuration for the S3 archive backend.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Target bucket (required).
    pub bucket: String,
    /// AWS region; defaults to us-east-1 when unset.
    pub region: String,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
    /// Use path-style addressing (required by most S3-compatible stores).
    pub force_path_style: bool,
}

impl S3Config {
    /// Read configuration from environment variables.
    ///
    /// - `ARCHIVE_BUCKET` (required)
    /// - `ARCHIVE_REGION` (default: us-east-1)
    /// - `ARCHIVE_ENDPOINT` (optional, for S3-compatible stores)
    /// - `ARCHIVE_FORCE_PATH_STYLE` (default: false)
    pub fn from_env() -> Result<Self, String> {
        let bucket = std::env::var("ARCHIVE_BUCKET")
            .map_err(|_| "ARCHIVE_BUCKET must be set".to_string())?;
        let region = std::env::var("ARCHIVE_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let endpoint = std::env::var("ARCHIVE_ENDPOINT").ok();
        let force_path_style = std::env::var("ARCHIVE_FORCE_PATH_STYLE")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            bucket,
            region,
            endpoint,
            force_path_style,
        })
    }
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a store from configuration, loading AWS credentials from the
    /// default provider chain.
    pub async fn new(config: S3Config) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        let client = S3Client::from_conf(builder.build());

        Self {
            client,
            bucket: config.bucket,
        }
    }

    /// Wrap an existing client; used when the caller manages AWS config.
    pub fn with_client(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), ArchiveError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| ArchiveError::Storage(format!("put {}: {}", key, e)))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| ArchiveError::Storage(format!("read {}: {}", key, e)))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_no_such_key() => Ok(None),
            Err(e) => Err(ArchiveError::Storage(format!("get {}: {}", key, e))),
        }
    }

    async fn object_exists(&self, key: &str) -> Result<bool, ArchiveError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_not_found() => Ok(false),
            Err(e) => Err(ArchiveError::Storage(format!("head {}: {}", key, e))),
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ArchiveError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let output = request
                .send()
                .await
                .map_err(|e| ArchiveError::Storage(format!("list {}: {}", prefix, e)))?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            match output.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }
}
