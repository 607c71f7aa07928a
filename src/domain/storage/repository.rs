//! Reader and writer capability traits

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::kind::StorageKind;

/// Read access to documents by path
#[async_trait]
pub trait DataReader: Send + Sync + Debug {
    /// Reads the full content at `path`
    async fn read(&self, path: &str) -> Result<Vec<u8>, DomainError>;
}

/// Write access rooted under a parent directory or key prefix
#[async_trait]
pub trait DataWriter: Send + Sync + Debug {
    /// Writes `data` to `path`, relative to the writer's root.
    /// Existing content at the same path is replaced.
    async fn write(&self, path: &str, data: &[u8]) -> Result<(), DomainError>;

    /// Writes UTF-8 text to `path`
    async fn write_string(&self, path: &str, content: &str) -> Result<(), DomainError> {
        self.write(path, content.as_bytes()).await
    }

    /// The storage this writer targets
    fn kind(&self) -> StorageKind;

    /// Directory or key prefix that relative paths resolve against
    fn root(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-memory writer for testing
    #[derive(Debug)]
    pub struct MockDataWriter {
        root: String,
        kind: StorageKind,
        files: Mutex<BTreeMap<String, Vec<u8>>>,
        error: Mutex<Option<String>>,
    }

    impl MockDataWriter {
        pub fn new(root: impl Into<String>, kind: StorageKind) -> Self {
            Self {
                root: root.into(),
                kind,
                files: Mutex::new(BTreeMap::new()),
                error: Mutex::new(None),
            }
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn get(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().unwrap().get(path).cloned()
        }

        pub fn get_string(&self, path: &str) -> Option<String> {
            self.get(path).map(|b| String::from_utf8(b).unwrap())
        }

        pub fn paths(&self) -> Vec<String> {
            self.files.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait]
    impl DataWriter for MockDataWriter {
        async fn write(&self, path: &str, data: &[u8]) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }

            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn kind(&self) -> StorageKind {
            self.kind
        }

        fn root(&self) -> &str {
            &self.root
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_writer_overwrites() {
            let writer = MockDataWriter::new("output/doc", StorageKind::Local);

            writer.write_string("doc.md", "first").await.unwrap();
            writer.write_string("doc.md", "second").await.unwrap();

            assert_eq!(writer.get_string("doc.md").as_deref(), Some("second"));
            assert_eq!(writer.paths(), vec!["doc.md".to_string()]);
        }

        #[tokio::test]
        async fn test_mock_writer_error() {
            let writer = MockDataWriter::new("output", StorageKind::ObjectStore)
                .with_error("bucket unreachable");

            let result = writer.write("a.json", b"{}").await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));
            assert_eq!(writer.kind(), StorageKind::ObjectStore);
        }
    }
}
