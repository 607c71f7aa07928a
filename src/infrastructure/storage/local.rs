//! Local filesystem reader and writer

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::storage::{DataReader, DataWriter, StorageKind};
use crate::domain::DomainError;

/// Resolve `path` against `root`; absolute paths and an empty root leave it
/// untouched
fn resolve(root: &str, path: &str) -> PathBuf {
    let path = Path::new(path);

    if root.is_empty() || path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(root).join(path)
    }
}

/// Reads files from the local filesystem; relative paths resolve against
/// the working directory
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBasedDataReader;

#[async_trait]
impl DataReader for FileBasedDataReader {
    async fn read(&self, path: &str) -> Result<Vec<u8>, DomainError> {
        let full_path = Path::new(path);

        tokio::fs::read(full_path).await.map_err(|e| {
            DomainError::storage(format!("Failed to read {}: {}", full_path.display(), e))
        })
    }
}

/// Writes files under a root directory, creating parents as needed
#[derive(Debug, Clone)]
pub struct FileBasedDataWriter {
    root: String,
}

impl FileBasedDataWriter {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataWriter for FileBasedDataWriter {
    async fn write(&self, path: &str, data: &[u8]) -> Result<(), DomainError> {
        let full_path = resolve(&self.root, path);

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&full_path, data).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", full_path.display(), e))
        })?;

        debug!(path = %full_path.display(), bytes = data.len(), "File written");
        Ok(())
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    fn root(&self) -> &str {
        &self.root
    }
}

/// Files directly inside `dir` whose name ends with `suffix`, sorted by name.
/// A missing directory yields no files.
pub async fn list_files_with_suffix(dir: &str, suffix: &str) -> Result<Vec<PathBuf>, DomainError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(DomainError::storage(format!(
                "Failed to list {}: {}",
                dir, e
            )))
        }
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let is_file = entry.file_type().await?.is_file();
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));

        if is_file && matches {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}
