//! Writer initialization: picks storage for a document source and acquires
//! its bytes

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use crate::config::S3StorageConfig;
use crate::domain::document::{DocumentSource, S3Location};
use crate::domain::storage::{DataReader, DataWriter, StorageKind};
use crate::domain::DomainError;

use super::local::{FileBasedDataReader, FileBasedDataWriter};
use super::s3::{RealS3Client, S3ClientTrait, S3DataReader, S3DataWriter};

/// Sinks and input bytes for one request
#[derive(Debug, Clone)]
pub struct WriterBundle {
    /// Rooted at `<output_dir>/<name>`
    pub artifact_writer: Arc<dyn DataWriter>,
    /// Rooted at `<output_dir>/<name>/images`
    pub image_writer: Arc<dyn DataWriter>,
    pub bytes: Bytes,
    /// File-type suffix with the leading dot, or empty
    pub extension: String,
}

impl WriterBundle {
    pub fn storage_kind(&self) -> StorageKind {
        self.artifact_writer.kind()
    }
}

/// Builds S3 clients for a bucket (for mocking)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait S3ClientProvider: Send + Sync + std::fmt::Debug {
    async fn client_for(&self, bucket: &str) -> Result<Arc<dyn S3ClientTrait>, DomainError>;
}

/// Client provider backed by the `storage.s3` configuration
#[derive(Debug, Clone)]
pub struct ConfiguredS3ClientProvider {
    config: S3StorageConfig,
}

impl ConfiguredS3ClientProvider {
    pub fn new(config: S3StorageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl S3ClientProvider for ConfiguredS3ClientProvider {
    async fn client_for(&self, bucket: &str) -> Result<Arc<dyn S3ClientTrait>, DomainError> {
        let bucket_config = self.config.bucket(bucket).ok_or_else(|| {
            DomainError::configuration(format!(
                "No S3 credentials configured for bucket '{}' and no default bucket entry",
                bucket
            ))
        })?;

        Ok(Arc::new(RealS3Client::from_bucket_config(bucket_config).await))
    }
}

/// Creates the artifact and image sinks for a document source
#[derive(Debug, Clone)]
pub struct WriterFactory {
    s3_clients: Arc<dyn S3ClientProvider>,
}

impl WriterFactory {
    pub fn new(s3_clients: Arc<dyn S3ClientProvider>) -> Self {
        Self { s3_clients }
    }

    pub fn from_config(config: S3StorageConfig) -> Self {
        Self::new(Arc::new(ConfiguredS3ClientProvider::new(config)))
    }

    /// Build sinks rooted at `output_dir` and `output_image_dir` on the
    /// storage matching `source`, and read the document bytes
    pub async fn initialize(
        &self,
        source: &DocumentSource,
        output_dir: &str,
        output_image_dir: &str,
    ) -> Result<WriterBundle, DomainError> {
        let extension = source.extension();

        match source {
            DocumentSource::ObjectStore(location) => {
                self.initialize_s3(location, extension, output_dir, output_image_dir)
                    .await
            }
            DocumentSource::Local(path) => {
                let (artifact_writer, image_writer) =
                    local_writers(output_dir, output_image_dir).await?;

                let path = path.to_string_lossy();
                let bytes = FileBasedDataReader.read(&path).await?;
                debug!(path = %path, bytes = bytes.len(), "Read local document");

                Ok(WriterBundle {
                    artifact_writer,
                    image_writer,
                    bytes: Bytes::from(bytes),
                    extension,
                })
            }
            DocumentSource::Upload { bytes, .. } => {
                let (artifact_writer, image_writer) =
                    local_writers(output_dir, output_image_dir).await?;

                Ok(WriterBundle {
                    artifact_writer,
                    image_writer,
                    bytes: bytes.clone(),
                    extension,
                })
            }
        }
    }

    async fn initialize_s3(
        &self,
        location: &S3Location,
        extension: String,
        output_dir: &str,
        output_image_dir: &str,
    ) -> Result<WriterBundle, DomainError> {
        let client = self.s3_clients.client_for(&location.bucket).await?;

        let artifact_writer: Arc<dyn DataWriter> = Arc::new(S3DataWriter::new(
            client.clone(),
            &location.bucket,
            output_dir,
        ));
        let image_writer: Arc<dyn DataWriter> = Arc::new(S3DataWriter::new(
            client.clone(),
            &location.bucket,
            output_image_dir,
        ));

        let bytes = S3DataReader::new(client, &location.bucket)
            .read(&location.key)
            .await?;
        info!(uri = %location.uri(), bytes = bytes.len(), "Read document from S3");

        Ok(WriterBundle {
            artifact_writer,
            image_writer,
            bytes: Bytes::from(bytes),
            extension,
        })
    }
}

async fn local_writers(
    output_dir: &str,
    output_image_dir: &str,
) -> Result<(Arc<dyn DataWriter>, Arc<dyn DataWriter>), DomainError> {
    tokio::fs::create_dir_all(output_image_dir).await.map_err(|e| {
        DomainError::storage(format!(
            "Failed to create image directory {}: {}",
            output_image_dir, e
        ))
    })?;

    Ok((
        Arc::new(FileBasedDataWriter::new(output_dir)),
        Arc::new(FileBasedDataWriter::new(output_image_dir)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::s3::mock::MockS3Client;
    use tempfile::TempDir;

    fn unconfigured() -> Arc<MockS3ClientProvider> {
        let mut provider = MockS3ClientProvider::new();
        provider.expect_client_for().returning(|bucket| {
            Err(DomainError::configuration(format!(
                "No S3 credentials for bucket '{}'",
                bucket
            )))
        });
        Arc::new(provider)
    }

    fn dirs(root: &TempDir) -> (String, String) {
        let output = root.path().join("output/report");
        let images = output.join("images");
        (
            output.to_string_lossy().into_owned(),
            images.to_string_lossy().into_owned(),
        )
    }

    #[tokio::test]
    async fn test_upload_uses_local_writers() {
        let root = TempDir::new().unwrap();
        let (output, images) = dirs(&root);
        let factory = WriterFactory::new(unconfigured());
        let source = DocumentSource::upload(
            Bytes::from_static(b"%PDF-1.7"),
            Some("report.PDF".to_string()),
        );

        let bundle = factory.initialize(&source, &output, &images).await.unwrap();

        assert_eq!(bundle.storage_kind(), StorageKind::Local);
        assert_eq!(bundle.image_writer.kind(), StorageKind::Local);
        assert_eq!(bundle.bytes.as_ref(), b"%PDF-1.7");
        assert_eq!(bundle.extension, ".PDF");
        assert_eq!(bundle.artifact_writer.root(), output);
        assert!(std::path::Path::new(&images).is_dir());
    }

    #[tokio::test]
    async fn test_local_path_reads_file() {
        let root = TempDir::new().unwrap();
        let (output, images) = dirs(&root);
        let input = root.path().join("scan.png");
        std::fs::write(&input, b"\x89PNG").unwrap();

        let factory = WriterFactory::new(unconfigured());
        let source = DocumentSource::from_path(&input.to_string_lossy()).unwrap();

        let bundle = factory.initialize(&source, &output, &images).await.unwrap();

        assert_eq!(bundle.bytes.as_ref(), b"\x89PNG");
        assert_eq!(bundle.extension, ".png");
        assert!(std::path::Path::new(&images).is_dir());
    }

    #[tokio::test]
    async fn test_local_path_missing_file() {
        let root = TempDir::new().unwrap();
        let (output, images) = dirs(&root);
        let factory = WriterFactory::new(unconfigured());
        let source = DocumentSource::from_path("/definitely/not/here.pdf").unwrap();

        let err = factory
            .initialize(&source, &output, &images)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_object_store_uses_s3_writers() {
        let client = Arc::new(MockS3Client::new().with_object(
            "papers",
            "2024/attention.pdf",
            b"%PDF-1.7".to_vec(),
        ));
        let shared: Arc<dyn S3ClientTrait> = client.clone();
        let mut provider = MockS3ClientProvider::new();
        provider
            .expect_client_for()
            .withf(|bucket| bucket == "papers")
            .times(1)
            .returning(move |_| Ok(shared.clone()));
        let factory = WriterFactory::new(Arc::new(provider));
        let source = DocumentSource::from_path("s3://papers/2024/attention.pdf").unwrap();

        let bundle = factory
            .initialize(&source, "output/attention", "output/attention/images")
            .await
            .unwrap();

        assert_eq!(bundle.storage_kind(), StorageKind::ObjectStore);
        assert_eq!(bundle.extension, ".pdf");
        assert_eq!(bundle.bytes.as_ref(), b"%PDF-1.7");

        bundle
            .artifact_writer
            .write_string("attention.md", "# Attention")
            .await
            .unwrap();
        assert_eq!(
            client.object("papers", "output/attention/attention.md"),
            Some(b"# Attention".to_vec())
        );
    }

    #[tokio::test]
    async fn test_object_store_without_credentials() {
        let factory = WriterFactory::new(unconfigured());
        let source = DocumentSource::from_path("s3://papers/a.pdf").unwrap();

        let err = factory
            .initialize(&source, "output/a", "output/a/images")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_configured_provider_rejects_unknown_bucket() {
        let provider = ConfiguredS3ClientProvider::new(S3StorageConfig::default());

        let err = provider.client_for("papers").await.unwrap_err();
        assert!(err.to_string().contains("papers"));
    }
}
