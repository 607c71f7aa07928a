use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rendering mode of the content projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MakeMode {
    /// Markdown with image references
    MmMarkdown,
    /// Ordered list of content blocks
    ContentList,
}

/// Which intermediate-representation dialect is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFlavor {
    Pipeline,
    Vlm,
}

/// Batch input of the pipeline analysis; all vectors are index-aligned
#[derive(Debug, Clone)]
pub struct PipelineAnalyzeRequest {
    pub documents: Vec<Vec<u8>>,
    pub langs: Vec<String>,
    pub parse_method: String,
    pub formula_enable: bool,
    pub table_enable: bool,
}

impl PipelineAnalyzeRequest {
    /// A batch holding exactly one document
    pub fn single(
        document: Vec<u8>,
        lang: impl Into<String>,
        parse_method: impl Into<String>,
        formula_enable: bool,
        table_enable: bool,
    ) -> Self {
        Self {
            documents: vec![document],
            langs: vec![lang.into()],
            parse_method: parse_method.into(),
            formula_enable,
            table_enable,
        }
    }
}

/// Per-document output of a pipeline analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInference {
    /// Raw per-page inference records
    pub model_list: Value,
    /// Engine-side handle to the rendered page images
    #[serde(default)]
    pub images: Value,
    /// Engine-side handle to the loaded document
    #[serde(default)]
    pub pdf_doc: Value,
    pub lang: String,
    pub ocr_enable: bool,
}

/// Output of a VLM analysis
#[derive(Debug, Clone, PartialEq)]
pub struct VlmOutput {
    pub middle_json: Value,
    pub model_output: Value,
}
