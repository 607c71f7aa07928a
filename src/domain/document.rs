//! Input document sources and file-name rules

use std::path::PathBuf;

use bytes::Bytes;

use crate::domain::storage::StorageKind;
use crate::domain::parse::ParseValidationError;

/// Page-based document formats (only the first page is analyzed)
pub const PDF_EXTENSIONS: [&str; 1] = [".pdf"];

/// Every file type accepted by `/file_parse`
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".pdf", ".png", ".jpg", ".jpeg"];

const S3_SCHEME: &str = "s3://";

/// Location of an object in a bucket, parsed from an `s3://bucket/key` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    pub fn parse(uri: &str) -> Result<Self, ParseValidationError> {
        let invalid = || ParseValidationError::InvalidObjectPath {
            path: uri.to_string(),
        };
        let rest = uri.trim().strip_prefix(S3_SCHEME).ok_or_else(invalid)?;
        let rest = rest.trim_start_matches('/');

        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    pub fn is_s3_uri(path: &str) -> bool {
        path.starts_with(S3_SCHEME)
    }

    pub fn uri(&self) -> String {
        format!("{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}

/// Where the document to parse comes from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Bytes uploaded with the request
    Upload {
        bytes: Bytes,
        filename: Option<String>,
    },
    /// A path on the server's filesystem
    Local(PathBuf),
    /// An object in S3-compatible storage
    ObjectStore(S3Location),
}

impl DocumentSource {
    pub fn upload(bytes: impl Into<Bytes>, filename: Option<String>) -> Self {
        Self::Upload {
            bytes: bytes.into(),
            filename: filename.filter(|name| !name.is_empty()),
        }
    }

    /// Classify a `file_path` form value as an object-store or local source
    pub fn from_path(path: &str) -> Result<Self, ParseValidationError> {
        if S3Location::is_s3_uri(path) {
            Ok(Self::ObjectStore(S3Location::parse(path)?))
        } else {
            Ok(Self::Local(PathBuf::from(path)))
        }
    }

    /// Base name of the source file, if one can be determined
    pub fn file_name(&self) -> Option<String> {
        let name = match self {
            Self::Upload { filename, .. } => filename.as_deref().map(base_name),
            Self::Local(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            Self::ObjectStore(location) => Some(base_name(&location.key)),
        }?;

        if name.is_empty() { None } else { Some(name) }
    }

    /// File-type suffix including the leading dot, or empty
    pub fn extension(&self) -> String {
        self.file_name()
            .map(|name| file_extension(&name))
            .unwrap_or_default()
    }

    pub fn storage_kind(&self) -> StorageKind {
        match self {
            Self::ObjectStore(_) => StorageKind::ObjectStore,
            Self::Upload { .. } | Self::Local(_) => StorageKind::Local,
        }
    }
}

fn base_name(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}

/// Suffix of a file name starting at its last dot; leading dots do not count
pub fn file_extension(file_name: &str) -> String {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();

    match file_name[stem_start..].rfind('.') {
        Some(idx) => file_name[stem_start + idx..].to_string(),
        None => String::new(),
    }
}

/// Name under which a document's artifacts are stored: the base name cut at
/// its first dot. Leading dots of hidden files are skipped so `.draft.pdf`
/// is stored as `draft`.
pub fn document_name(file_name: &str) -> Option<String> {
    let name = file_name
        .trim_start_matches('.')
        .split('.')
        .next()
        .unwrap_or_default();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Suffixes match exactly; `.PDF` is not a supported type
pub fn is_pdf_extension(extension: &str) -> bool {
    PDF_EXTENSIONS.contains(&extension)
}

pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension)
}

/// Output directory for one document: `<output_dir>/<name>`
pub fn document_output_dir(output_dir: &str, name: &str) -> String {
    let root = output_dir.trim_end_matches('/');
    let root = if root.is_empty() { "output" } else { root };
    format!("{}/{}", root, name)
}

/// Image output directory for one document: `<document_dir>/images`
pub fn document_image_dir(document_dir: &str) -> String {
    format!("{}/images", document_dir.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_location() {
        let location = S3Location::parse("s3://docs-bucket/incoming/report.pdf").unwrap();
        assert_eq!(location.bucket, "docs-bucket");
        assert_eq!(location.key, "incoming/report.pdf");
        assert_eq!(location.uri(), "s3://docs-bucket/incoming/report.pdf");
    }

    #[test]
    fn test_parse_s3_location_without_key_fails() {
        assert!(S3Location::parse("s3://docs-bucket").is_err());
        assert!(S3Location::parse("s3://docs-bucket/").is_err());
        assert!(S3Location::parse("/tmp/report.pdf").is_err());
    }

    #[test]
    fn test_source_classification() {
        let s3 = DocumentSource::from_path("s3://bucket/a/b/paper.pdf").unwrap();
        assert_eq!(s3.storage_kind(), StorageKind::ObjectStore);
        assert_eq!(s3.file_name().as_deref(), Some("paper.pdf"));
        assert_eq!(s3.extension(), ".pdf");

        let local = DocumentSource::from_path("/data/scans/page.PNG").unwrap();
        assert_eq!(local.storage_kind(), StorageKind::Local);
        assert_eq!(local.file_name().as_deref(), Some("page.PNG"));
        assert_eq!(local.extension(), ".PNG");
    }

    #[test]
    fn test_upload_without_filename() {
        let upload = DocumentSource::upload(vec![1u8, 2, 3], None);
        assert_eq!(upload.file_name(), None);
        assert_eq!(upload.extension(), "");
        assert_eq!(upload.storage_kind(), StorageKind::Local);

        let empty_name = DocumentSource::upload(vec![1u8], Some(String::new()));
        assert_eq!(empty_name.file_name(), None);
    }

    #[test]
    fn test_upload_filename_is_reduced_to_base_name() {
        let upload = DocumentSource::upload(Vec::new(), Some("C:\\scans\\invoice.jpg".into()));
        assert_eq!(upload.file_name().as_deref(), Some("invoice.jpg"));
        assert_eq!(upload.extension(), ".jpg");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.pdf"), ".pdf");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".hidden"), "");
        assert_eq!(file_extension("..pdf"), "");
    }

    #[test]
    fn test_document_name_cuts_at_first_dot() {
        assert_eq!(document_name("report.pdf").as_deref(), Some("report"));
        assert_eq!(document_name("v1.2.report.pdf").as_deref(), Some("v1"));
        assert_eq!(document_name("noext").as_deref(), Some("noext"));
        assert_eq!(document_name(".draft.pdf").as_deref(), Some("draft"));
        assert_eq!(document_name("..."), None);
        assert_eq!(document_name(""), None);
    }

    #[test]
    fn test_supported_extensions() {
        for ext in [".pdf", ".png", ".jpg", ".jpeg"] {
            assert!(is_supported_extension(ext), "{ext} should be supported");
        }
        for ext in ["", ".docx", ".gif", "pdf", ".PDF", ".Jpeg", ".PNG"] {
            assert!(!is_supported_extension(ext), "{ext} should be rejected");
        }
        assert!(is_pdf_extension(".pdf"));
        assert!(!is_pdf_extension(".png"));
        assert!(!is_pdf_extension(".PDF"));
    }

    #[test]
    fn test_output_dirs() {
        let dir = document_output_dir("output/", "report");
        assert_eq!(dir, "output/report");
        assert_eq!(document_image_dir(&dir), "output/report/images");
        assert_eq!(document_output_dir("", "report"), "output/report");
    }
}
