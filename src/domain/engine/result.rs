use bytes::Bytes;
use serde_json::{json, Value};

/// Uniform result of any analysis backend
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Raw model output (pipeline records, or a VLM envelope)
    pub model_json: Value,
    /// Page-indexed intermediate representation
    pub middle_json: Value,
    pub content_list: Value,
    pub md_content: String,
    /// Input bytes after page normalization
    pub processed_bytes: Bytes,
}

impl AnalysisResult {
    /// The per-page section of the intermediate representation
    pub fn pdf_info(&self) -> &Value {
        &self.middle_json["pdf_info"]
    }

    /// Envelope that makes a VLM model output look like any other backend's
    pub fn vlm_model_json(model_output: Value, backend: &str) -> Value {
        json!({
            "model_output": model_output,
            "backend": backend,
        })
    }
}
