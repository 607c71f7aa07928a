//! Storage kind shared by a reader/writer pair

use std::fmt;

/// Physical storage behind a reader or writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Local filesystem
    Local,
    /// S3-compatible object storage
    ObjectStore,
}

impl StorageKind {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::ObjectStore => write!(f, "s3"),
        }
    }
}
