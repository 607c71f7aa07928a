//! Parse request validation errors

use std::fmt;

use crate::domain::backend::SUPPORTED_BACKENDS;
use crate::domain::DomainError;

/// Reasons a `/file_parse` request is rejected before any work is done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseValidationError {
    /// Neither or both of `file` and `file_path` were supplied
    SourceNotExclusive,
    /// Backend identifier outside of the supported set
    UnsupportedBackend { backend: String },
    /// `vlm-sglang-client` without a server URL
    MissingServerUrl,
    /// No file name on the upload or path
    UnknownFileName,
    /// File type outside of the supported document and image types
    UnsupportedFileType { extension: String },
    /// `file_path` uses the object-store scheme but is not `s3://bucket/key`
    InvalidObjectPath { path: String },
    /// A form field could not be interpreted
    InvalidField { field: String, value: String },
}

impl fmt::Display for ParseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotExclusive => write!(f, "Must provide either file or file_path"),
            Self::UnsupportedBackend { backend } => write!(
                f,
                "Unsupported backend: {}. Supported: [{}]",
                backend,
                SUPPORTED_BACKENDS.join(", ")
            ),
            Self::MissingServerUrl => {
                write!(f, "server_url is required for vlm-sglang-client backend")
            }
            Self::UnknownFileName => write!(f, "Could not determine filename."),
            Self::UnsupportedFileType { extension } => {
                write!(f, "File type {} is not supported.", extension)
            }
            Self::InvalidObjectPath { path } => write!(
                f,
                "Invalid S3 path '{}': expected s3://<bucket>/<key>",
                path
            ),
            Self::InvalidField { field, value } => {
                write!(f, "Invalid value '{}' for field '{}'", value, field)
            }
        }
    }
}

impl std::error::Error for ParseValidationError {}

impl From<ParseValidationError> for DomainError {
    fn from(err: ParseValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}
