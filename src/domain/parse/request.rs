//! Parse request as received and as validated

use bytes::Bytes;

use super::validation::ParseValidationError;
use crate::domain::backend::{Backend, PipelineOptions};
use crate::domain::document::{
    document_image_dir, document_name, document_output_dir, is_supported_extension,
    DocumentSource,
};

/// Default root for persisted artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// A file part of the multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub filename: Option<String>,
}

/// Optional fields of the success payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseFields {
    pub layout: bool,
    pub info: bool,
    pub content_list: bool,
    pub images: bool,
}

/// Unvalidated request, straight from the form
#[derive(Debug, Clone)]
pub struct RawParseRequest {
    pub file: Option<UploadedFile>,
    pub file_path: Option<String>,
    pub backend: String,
    pub pipeline: PipelineOptions,
    pub server_url: Option<String>,
    pub is_json_md_dump: bool,
    pub output_dir: String,
    pub fields: ResponseFields,
}

impl Default for RawParseRequest {
    fn default() -> Self {
        Self {
            file: None,
            file_path: None,
            backend: "pipeline".to_string(),
            pipeline: PipelineOptions::default(),
            server_url: None,
            is_json_md_dump: false,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            fields: ResponseFields::default(),
        }
    }
}

/// A validated parse request; immutable for the rest of the request
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub source: DocumentSource,
    pub backend: Backend,
    /// Base file name cut at its first dot; names every artifact
    pub document_name: String,
    pub extension: String,
    pub output_dir: String,
    pub dump_artifacts: bool,
    pub fields: ResponseFields,
}

impl ParseRequest {
    /// Validate a raw request. Checks run in a fixed order and the first
    /// failure wins; nothing here touches storage or the engine.
    pub fn validate(raw: RawParseRequest) -> Result<Self, ParseValidationError> {
        let file_path = raw.file_path.filter(|p| !p.is_empty());

        let backend = |raw_backend: &str| {
            Backend::resolve(raw_backend, raw.pipeline.clone(), raw.server_url.as_deref())
        };

        let (source, backend) = match (raw.file, file_path) {
            (Some(file), None) => (
                DocumentSource::upload(file.bytes, file.filename),
                backend(&raw.backend)?,
            ),
            (None, Some(path)) => {
                let backend = backend(&raw.backend)?;
                (DocumentSource::from_path(&path)?, backend)
            }
            _ => return Err(ParseValidationError::SourceNotExclusive),
        };

        let file_name = source
            .file_name()
            .ok_or(ParseValidationError::UnknownFileName)?;
        let document_name =
            document_name(&file_name).ok_or(ParseValidationError::UnknownFileName)?;

        let extension = source.extension();
        if !is_supported_extension(&extension) {
            return Err(ParseValidationError::UnsupportedFileType { extension });
        }

        let output_dir = if raw.output_dir.is_empty() {
            DEFAULT_OUTPUT_DIR.to_string()
        } else {
            raw.output_dir
        };

        Ok(Self {
            source,
            backend,
            document_name,
            extension,
            output_dir,
            dump_artifacts: raw.is_json_md_dump,
            fields: raw.fields,
        })
    }

    /// `<output_dir>/<document_name>`
    pub fn output_path(&self) -> String {
        document_output_dir(&self.output_dir, &self.document_name)
    }

    /// `<output_dir>/<document_name>/images`
    pub fn output_image_path(&self) -> String {
        document_image_dir(&self.output_path())
    }
}
