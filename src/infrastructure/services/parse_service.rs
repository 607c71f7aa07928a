//! Document parse service: acquire writers, dispatch to a backend, persist
//! artifacts and assemble the response

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Value};
use tracing::{debug, info, warn};

use crate::domain::backend::{Backend, PipelineOptions, VlmBackend};
use crate::domain::document::is_pdf_extension;
use crate::domain::engine::{
    AnalysisResult, BboxVisualizer, ContentRenderer, MakeMode, PageExtractor,
    PipelineAnalyzeRequest, PipelineEngine, RenderFlavor, VlmEngine,
};
use crate::domain::parse::{ParseRequest, ParseResponse};
use crate::domain::storage::DataWriter;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_parse;
use crate::infrastructure::storage::{list_files_with_suffix, WriterBundle, WriterFactory};

/// Image directory name used in rendered markdown and content lists
const IMAGE_DIR: &str = "images";

/// External collaborators doing the actual document analysis
#[derive(Debug, Clone)]
pub struct AnalysisEngines {
    pub pipeline: Arc<dyn PipelineEngine>,
    pub vlm: Arc<dyn VlmEngine>,
    pub renderer: Arc<dyn ContentRenderer>,
    pub visualizer: Arc<dyn BboxVisualizer>,
    pub pages: Arc<dyn PageExtractor>,
}

/// Serialize as JSON with a four-space indent; non-ASCII text is kept as is
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DomainError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;

    String::from_utf8(buffer)
        .map_err(|e| DomainError::internal(format!("JSON output is not UTF-8: {}", e)))
}

/// Markdown comes back from the renderer as a JSON string; anything else is
/// rendered as its JSON text
fn markdown_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Orchestrates one `/file_parse` request
#[derive(Debug, Clone)]
pub struct ParseService {
    writers: WriterFactory,
    engines: AnalysisEngines,
}

impl ParseService {
    pub fn new(writers: WriterFactory, engines: AnalysisEngines) -> Self {
        Self { writers, engines }
    }

    /// Run a validated request to completion
    pub async fn parse(&self, request: &ParseRequest) -> Result<ParseResponse, DomainError> {
        let start = Instant::now();
        let storage = request.source.storage_kind().to_string();

        let result = self.run(request).await;

        record_parse(
            request.backend.as_str(),
            &storage,
            result.is_ok(),
            start.elapsed(),
        );
        if result.is_ok() {
            info!(
                backend = %request.backend,
                document = %request.document_name,
                storage = %storage,
                duration_ms = start.elapsed().as_millis() as u64,
                "Document parsed"
            );
        }

        result
    }

    async fn run(&self, request: &ParseRequest) -> Result<ParseResponse, DomainError> {
        let output_path = request.output_path();
        let output_image_path = request.output_image_path();

        let bundle = self
            .writers
            .initialize(&request.source, &output_path, &output_image_path)
            .await?;

        let result = self
            .analyze(
                bundle.bytes.clone(),
                &bundle.extension,
                bundle.image_writer.as_ref(),
                &request.backend,
            )
            .await?;

        if request.dump_artifacts {
            self.persist(request, &bundle, &result, &output_path).await?;
        }

        self.assemble(request, &bundle, result, &output_image_path)
            .await
    }

    /// Normalize the input and run it through the requested backend
    pub async fn analyze(
        &self,
        raw: Bytes,
        extension: &str,
        image_writer: &dyn DataWriter,
        backend: &Backend,
    ) -> Result<AnalysisResult, DomainError> {
        let processed = self.normalize(raw, extension).await?;

        match backend {
            Backend::Pipeline(options) => {
                self.analyze_pipeline(processed, image_writer, options)
                    .await
            }
            Backend::Vlm(variant) => self.analyze_vlm(processed, image_writer, variant).await,
        }
    }

    /// Page-based documents are cut down to their first page
    async fn normalize(&self, raw: Bytes, extension: &str) -> Result<Bytes, DomainError> {
        if !is_pdf_extension(extension) {
            return Ok(raw);
        }

        let original_len = raw.len();
        let first_page = self.engines.pages.extract_pages(raw, 0, Some(0)).await?;
        debug!(original_len, first_page_len = first_page.len(), "Kept first PDF page");

        Ok(Bytes::from(first_page))
    }

    async fn analyze_pipeline(
        &self,
        processed: Bytes,
        image_writer: &dyn DataWriter,
        options: &PipelineOptions,
    ) -> Result<AnalysisResult, DomainError> {
        let batch = PipelineAnalyzeRequest::single(
            processed.to_vec(),
            &options.lang,
            &options.parse_method,
            options.formula_enable,
            options.table_enable,
        );

        let inference = self
            .engines
            .pipeline
            .doc_analyze(batch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::engine("pipeline", "Analysis returned no documents"))?;

        let model_json = inference.model_list.clone();
        let middle_json = self
            .engines
            .pipeline
            .result_to_middle_json(&inference, image_writer, options.formula_enable)
            .await?;

        self.render(RenderFlavor::Pipeline, model_json, middle_json, processed)
            .await
    }

    async fn analyze_vlm(
        &self,
        processed: Bytes,
        image_writer: &dyn DataWriter,
        variant: &VlmBackend,
    ) -> Result<AnalysisResult, DomainError> {
        let output = self
            .engines
            .vlm
            .doc_analyze(&processed, image_writer, variant)
            .await?;

        let model_json = AnalysisResult::vlm_model_json(output.model_output, variant.name());

        self.render(RenderFlavor::Vlm, model_json, output.middle_json, processed)
            .await
    }

    async fn render(
        &self,
        flavor: RenderFlavor,
        model_json: Value,
        middle_json: Value,
        processed_bytes: Bytes,
    ) -> Result<AnalysisResult, DomainError> {
        let pdf_info = &middle_json["pdf_info"];

        let md_content = self
            .engines
            .renderer
            .union_make(flavor, pdf_info, MakeMode::MmMarkdown, IMAGE_DIR)
            .await?;
        let content_list = self
            .engines
            .renderer
            .union_make(flavor, pdf_info, MakeMode::ContentList, IMAGE_DIR)
            .await?;

        Ok(AnalysisResult {
            model_json,
            middle_json,
            content_list,
            md_content: markdown_text(md_content),
            processed_bytes,
        })
    }

    /// Write the artifact set; same-named files from earlier runs are
    /// replaced
    async fn persist(
        &self,
        request: &ParseRequest,
        bundle: &WriterBundle,
        result: &AnalysisResult,
        output_path: &str,
    ) -> Result<(), DomainError> {
        let name = &request.document_name;
        let writer = bundle.artifact_writer.as_ref();

        writer
            .write_string(
                &format!("{}_content_list.json", name),
                &to_pretty_json(&result.content_list)?,
            )
            .await?;
        writer
            .write_string(&format!("{}.md", name), &result.md_content)
            .await?;
        writer
            .write_string(
                &format!("{}_middle.json", name),
                &to_pretty_json(&result.middle_json)?,
            )
            .await?;
        writer
            .write_string(
                &format!("{}_model.json", name),
                &to_pretty_json(&result.model_json)?,
            )
            .await?;

        if request.backend.is_pipeline() && writer.kind().is_local() {
            let pdf_info = result.pdf_info();
            let pdf_bytes = result.processed_bytes.as_ref();
            let visualizer = &self.engines.visualizer;

            visualizer
                .draw_layout_bbox(pdf_info, pdf_bytes, output_path, &format!("{}_layout.pdf", name))
                .await?;
            visualizer
                .draw_span_bbox(pdf_info, pdf_bytes, output_path, &format!("{}_span.pdf", name))
                .await?;
        } else {
            debug!(
                backend = %request.backend,
                storage = %writer.kind(),
                "Skipping bounding-box visualization"
            );
        }

        debug!(document = %name, root = writer.root(), "Artifacts persisted");
        Ok(())
    }

    async fn assemble(
        &self,
        request: &ParseRequest,
        bundle: &WriterBundle,
        result: AnalysisResult,
        output_image_path: &str,
    ) -> Result<ParseResponse, DomainError> {
        let fields = request.fields;
        let mut response = ParseResponse::new(result.md_content, request.backend.as_str());

        if fields.layout {
            response.layout = Some(result.model_json);
        }
        if fields.info {
            response.info = Some(result.middle_json);
        }
        if fields.content_list {
            response.content_list = Some(result.content_list);
        }
        if fields.images {
            response.images = Some(if bundle.storage_kind().is_local() {
                collect_images(output_image_path).await?
            } else {
                warn!(
                    document = %request.document_name,
                    "return_images is not supported for S3 storage yet"
                );
                BTreeMap::new()
            });
        }

        Ok(response)
    }
}

/// Every `*.jpg` in `dir`, keyed by file name, as a base64 data URL
async fn collect_images(dir: &str) -> Result<BTreeMap<String, String>, DomainError> {
    let mut images = BTreeMap::new();

    for path in list_files_with_suffix(dir, ".jpg").await? {
        let data = tokio::fs::read(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        images.insert(name, format!("data:image/jpeg;base64,{}", BASE64.encode(data)));
    }

    Ok(images)
}
