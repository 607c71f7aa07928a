//! Analysis engine reached over HTTP
//!
//! Every stage is a JSON `POST` against the engine service. Binary payloads
//! (documents, extracted images, rendered PDFs) travel base64-encoded.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::backend::VlmBackend;
use crate::domain::engine::{
    BboxVisualizer, ContentRenderer, MakeMode, PipelineAnalyzeRequest, PipelineEngine,
    PipelineInference, RenderFlavor, VlmEngine, VlmOutput,
};
use crate::domain::storage::DataWriter;
use crate::domain::DomainError;
use crate::infrastructure::storage::FileBasedDataWriter;

/// An image produced by the engine, relative to the image sink
#[derive(Debug, Deserialize)]
struct EngineImage {
    path: String,
    data: String,
}

/// Index-aligned per-document lists of a batch analysis
#[derive(Debug, Deserialize)]
struct PipelineAnalyzeResponse {
    infer_results: Vec<Value>,
    #[serde(default)]
    all_image_lists: Vec<Value>,
    #[serde(default)]
    all_pdf_docs: Vec<Value>,
    lang_list: Vec<String>,
    ocr_enabled_list: Vec<bool>,
}

#[derive(Debug, Deserialize)]
struct MiddleJsonResponse {
    middle_json: Value,
    #[serde(default)]
    images: Vec<EngineImage>,
}

#[derive(Debug, Deserialize)]
struct VlmAnalyzeResponse {
    middle_json: Value,
    model_output: Value,
    #[serde(default)]
    images: Vec<EngineImage>,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct DrawResponse {
    pdf: String,
}

/// Engine client implementing every analysis collaborator
#[derive(Debug)]
pub struct HttpEngineClient<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> HttpEngineClient<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, DomainError> {
        let response = self.client.post_json(&self.url(path), body).await?;

        serde_json::from_value(response).map_err(|e| {
            DomainError::engine(path.trim_start_matches('/'), format!("Unexpected response: {}", e))
        })
    }

    async fn draw(
        &self,
        path: &str,
        pdf_info: &Value,
        pdf_bytes: &[u8],
        output_dir: &str,
        file_name: &str,
    ) -> Result<(), DomainError> {
        let body = json!({
            "pdf_info": pdf_info,
            "document": BASE64.encode(pdf_bytes),
        });

        let response: DrawResponse = self.call(path, &body).await?;
        let pdf = decode(path, &response.pdf)?;

        FileBasedDataWriter::new(output_dir)
            .write(file_name, &pdf)
            .await
    }
}

fn decode(stage: &str, data: &str) -> Result<Vec<u8>, DomainError> {
    BASE64.decode(data).map_err(|e| {
        DomainError::engine(stage.trim_start_matches('/'), format!("Invalid base64 payload: {}", e))
    })
}

async fn write_images(
    stage: &str,
    images: &[EngineImage],
    writer: &dyn DataWriter,
) -> Result<(), DomainError> {
    for image in images {
        writer.write(&image.path, &decode(stage, &image.data)?).await?;
    }

    if !images.is_empty() {
        debug!(stage, count = images.len(), root = writer.root(), "Engine images written");
    }
    Ok(())
}

#[async_trait]
impl<C: HttpClientTrait> PipelineEngine for HttpEngineClient<C> {
    async fn doc_analyze(
        &self,
        request: PipelineAnalyzeRequest,
    ) -> Result<Vec<PipelineInference>, DomainError> {
        let documents: Vec<String> = request.documents.iter().map(|d| BASE64.encode(d)).collect();
        let body = json!({
            "documents": documents,
            "langs": request.langs,
            "parse_method": request.parse_method,
            "formula_enable": request.formula_enable,
            "table_enable": request.table_enable,
        });

        let response: PipelineAnalyzeResponse = self.call("/pipeline/analyze", &body).await?;

        let count = response.infer_results.len();
        if response.lang_list.len() != count || response.ocr_enabled_list.len() != count {
            return Err(DomainError::engine(
                "pipeline/analyze",
                "Per-document result lists differ in length",
            ));
        }

        let mut images = response.all_image_lists.into_iter();
        let mut pdf_docs = response.all_pdf_docs.into_iter();

        Ok(response
            .infer_results
            .into_iter()
            .zip(response.lang_list)
            .zip(response.ocr_enabled_list)
            .map(|((model_list, lang), ocr_enable)| PipelineInference {
                model_list,
                images: images.next().unwrap_or_default(),
                pdf_doc: pdf_docs.next().unwrap_or_default(),
                lang,
                ocr_enable,
            })
            .collect())
    }

    async fn result_to_middle_json(
        &self,
        inference: &PipelineInference,
        image_writer: &dyn DataWriter,
        formula_enable: bool,
    ) -> Result<Value, DomainError> {
        let body = json!({
            "model_list": inference.model_list,
            "images": inference.images,
            "pdf_doc": inference.pdf_doc,
            "lang": inference.lang,
            "ocr_enable": inference.ocr_enable,
            "formula_enable": formula_enable,
        });

        let response: MiddleJsonResponse = self.call("/pipeline/middle_json", &body).await?;
        write_images("/pipeline/middle_json", &response.images, image_writer).await?;

        Ok(response.middle_json)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VlmEngine for HttpEngineClient<C> {
    async fn doc_analyze(
        &self,
        pdf_bytes: &[u8],
        image_writer: &dyn DataWriter,
        backend: &VlmBackend,
    ) -> Result<VlmOutput, DomainError> {
        let body = json!({
            "document": BASE64.encode(pdf_bytes),
            "backend": backend.name(),
            "server_url": backend.server_url(),
        });

        let response: VlmAnalyzeResponse = self.call("/vlm/analyze", &body).await?;
        write_images("/vlm/analyze", &response.images, image_writer).await?;

        Ok(VlmOutput {
            middle_json: response.middle_json,
            model_output: response.model_output,
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> ContentRenderer for HttpEngineClient<C> {
    async fn union_make(
        &self,
        flavor: RenderFlavor,
        pdf_info: &Value,
        mode: MakeMode,
        img_dir: &str,
    ) -> Result<Value, DomainError> {
        let body = json!({
            "flavor": flavor,
            "pdf_info": pdf_info,
            "mode": mode,
            "img_dir": img_dir,
        });

        let response: RenderResponse = self.call("/render", &body).await?;
        Ok(response.result)
    }
}

#[async_trait]
impl<C: HttpClientTrait> BboxVisualizer for HttpEngineClient<C> {
    async fn draw_layout_bbox(
        &self,
        pdf_info: &Value,
        pdf_bytes: &[u8],
        output_dir: &str,
        file_name: &str,
    ) -> Result<(), DomainError> {
        self.draw("/draw/layout", pdf_info, pdf_bytes, output_dir, file_name)
            .await
    }

    async fn draw_span_bbox(
        &self,
        pdf_info: &Value,
        pdf_bytes: &[u8],
        output_dir: &str,
        file_name: &str,
    ) -> Result<(), DomainError> {
        self.draw("/draw/span", pdf_info, pdf_bytes, output_dir, file_name)
            .await
    }
}
