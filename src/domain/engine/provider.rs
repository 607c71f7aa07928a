use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::fmt::Debug;

use super::types::{MakeMode, PipelineAnalyzeRequest, PipelineInference, RenderFlavor, VlmOutput};
use crate::domain::backend::VlmBackend;
use crate::domain::storage::DataWriter;
use crate::domain::DomainError;

/// Classical OCR/layout analysis
#[async_trait]
pub trait PipelineEngine: Send + Sync + Debug {
    /// Analyze a batch of documents, returning one inference per document
    async fn doc_analyze(
        &self,
        request: PipelineAnalyzeRequest,
    ) -> Result<Vec<PipelineInference>, DomainError>;

    /// Build the intermediate representation of one analyzed document.
    /// Extracted images are persisted through `image_writer`.
    async fn result_to_middle_json(
        &self,
        inference: &PipelineInference,
        image_writer: &dyn DataWriter,
        formula_enable: bool,
    ) -> Result<Value, DomainError>;
}

/// Vision-language-model analysis
#[async_trait]
pub trait VlmEngine: Send + Sync + Debug {
    /// Analyze one document. Extracted images are persisted through
    /// `image_writer`.
    async fn doc_analyze(
        &self,
        pdf_bytes: &[u8],
        image_writer: &dyn DataWriter,
        backend: &VlmBackend,
    ) -> Result<VlmOutput, DomainError>;
}

/// Projection of the per-page intermediate representation into markdown or
/// a content list
#[async_trait]
pub trait ContentRenderer: Send + Sync + Debug {
    async fn union_make(
        &self,
        flavor: RenderFlavor,
        pdf_info: &Value,
        mode: MakeMode,
        img_dir: &str,
    ) -> Result<Value, DomainError>;
}

/// Bounding-box visualization written next to the other artifacts
#[async_trait]
pub trait BboxVisualizer: Send + Sync + Debug {
    /// Draw layout blocks into `<output_dir>/<file_name>`
    async fn draw_layout_bbox(
        &self,
        pdf_info: &Value,
        pdf_bytes: &[u8],
        output_dir: &str,
        file_name: &str,
    ) -> Result<(), DomainError>;

    /// Draw individual spans into `<output_dir>/<file_name>`
    async fn draw_span_bbox(
        &self,
        pdf_info: &Value,
        pdf_bytes: &[u8],
        output_dir: &str,
        file_name: &str,
    ) -> Result<(), DomainError>;
}

/// Copies a page range of a PDF into a new document
#[async_trait]
pub trait PageExtractor: Send + Sync + Debug {
    /// Pages are zero-based and `end_page` is inclusive; `None` means the
    /// last page.
    async fn extract_pages(
        &self,
        pdf_bytes: Bytes,
        start_page: u32,
        end_page: Option<u32>,
    ) -> Result<Vec<u8>, DomainError>;
}
