//! S3-compatible object storage reader and writer

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

use crate::config::S3BucketConfig;
use crate::domain::document::S3Location;
use crate::domain::storage::{DataReader, DataWriter, StorageKind};
use crate::domain::DomainError;

/// Trait for S3 client operations (for mocking)
#[async_trait]
pub trait S3ClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, DomainError>;

    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), DomainError>;
}

/// Real S3 client wrapper
#[derive(Debug, Clone)]
pub struct RealS3Client {
    client: S3Client,
}

impl RealS3Client {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Client with static credentials against a custom endpoint.
    /// Path-style addressing keeps MinIO-like endpoints working.
    pub async fn from_bucket_config(config: &S3BucketConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "docparse-gateway",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self::new(S3Client::from_conf(s3_config))
    }
}

#[async_trait]
impl S3ClientTrait for RealS3Client {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, DomainError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                DomainError::storage(format!("S3 get_object s3://{}/{} failed: {}", bucket, key, e))
            })?;

        let body = response.body.collect().await.map_err(|e| {
            DomainError::storage(format!("S3 body read s3://{}/{} failed: {}", bucket, key, e))
        })?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), DomainError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                DomainError::storage(format!("S3 put_object s3://{}/{} failed: {}", bucket, key, e))
            })?;

        Ok(())
    }
}

/// Join a key prefix and a relative path with exactly one `/`
fn object_key(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_start_matches('/');

    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Reads objects from one bucket
#[derive(Debug, Clone)]
pub struct S3DataReader {
    client: Arc<dyn S3ClientTrait>,
    bucket: String,
}

impl S3DataReader {
    pub fn new(client: Arc<dyn S3ClientTrait>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl DataReader for S3DataReader {
    /// `path` is either a full `s3://bucket/key` URI or a key in this
    /// reader's bucket
    async fn read(&self, path: &str) -> Result<Vec<u8>, DomainError> {
        let (bucket, key) = if S3Location::is_s3_uri(path) {
            let location = S3Location::parse(path)?;
            (location.bucket, location.key)
        } else {
            (self.bucket.clone(), object_key("", path))
        };

        self.client.get_object(&bucket, &key).await
    }
}

/// Writes objects under a key prefix of one bucket
#[derive(Debug, Clone)]
pub struct S3DataWriter {
    client: Arc<dyn S3ClientTrait>,
    bucket: String,
    prefix: String,
}

impl S3DataWriter {
    pub fn new(
        client: Arc<dyn S3ClientTrait>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

}

#[async_trait]
impl DataWriter for S3DataWriter {
    async fn write(&self, path: &str, data: &[u8]) -> Result<(), DomainError> {
        let key = object_key(&self.prefix, path);
        self.client.put_object(&self.bucket, &key, data.to_vec()).await?;

        debug!(bucket = %self.bucket, key = %key, bytes = data.len(), "Object written");
        Ok(())
    }

    fn kind(&self) -> StorageKind {
        StorageKind::ObjectStore
    }

    fn root(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// In-memory bucket store keyed by (bucket, key)
    #[derive(Debug, Default)]
    pub struct MockS3Client {
        objects: RwLock<HashMap<(String, String), Vec<u8>>>,
        error: RwLock<Option<String>>,
    }

    impl MockS3Client {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_object(self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) -> Self {
            self.objects
                .write()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), data.into());
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.write().unwrap() = Some(error.into());
            self
        }

        pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
            self.objects
                .read()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
        }

        pub fn keys(&self, bucket: &str) -> Vec<String> {
            let mut keys: Vec<_> = self
                .objects
                .read()
                .unwrap()
                .keys()
                .filter(|(b, _)| b == bucket)
                .map(|(_, k)| k.clone())
                .collect();
            keys.sort();
            keys
        }
    }

    #[async_trait]
    impl S3ClientTrait for MockS3Client {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, DomainError> {
            if let Some(error) = self.error.read().unwrap().clone() {
                return Err(DomainError::storage(error));
            }

            self.object(bucket, key).ok_or_else(|| {
                DomainError::storage(format!("NoSuchKey: s3://{}/{}", bucket, key))
            })
        }

        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            data: Vec<u8>,
        ) -> Result<(), DomainError> {
            if let Some(error) = self.error.read().unwrap().clone() {
                return Err(DomainError::storage(error));
            }

            self.objects
                .write()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), data);
            Ok(())
        }
    }
}
