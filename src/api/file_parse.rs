//! `POST /file_parse` - parse one document with the requested backend

use axum::extract::State;
use axum::Json;
use tracing::{error, info, warn};

use super::state::AppState;
use super::types::{ApiError, ParseForm};
use crate::domain::parse::{ParseRequest, ParseResponse};

pub async fn file_parse(
    State(state): State<AppState>,
    form: ParseForm,
) -> Result<Json<ParseResponse>, ApiError> {
    let request = ParseRequest::validate(form.into_inner()).map_err(|e| {
        warn!(error = %e, "Rejected file_parse request");
        ApiError::from(e)
    })?;

    info!(
        backend = %request.backend,
        document = %request.document_name,
        storage = %request.source.storage_kind(),
        dump = request.dump_artifacts,
        "Parsing document"
    );

    match state.parse_service.parse(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(
                error = ?e,
                backend = %request.backend,
                document = %request.document_name,
                "File parse failed"
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::api::router::create_router_with_state;
    use crate::api::state::AppState;
    use crate::config::AppConfig;
    use crate::domain::engine::mock::{
        MockBboxVisualizer, MockContentRenderer, MockPageExtractor, MockPipelineEngine,
        MockVlmEngine,
    };
    use crate::infrastructure::logging::capture::capture;
    use crate::infrastructure::services::{AnalysisEngines, ParseService};
    use crate::infrastructure::storage::{MockS3ClientProvider, WriterFactory};

    const BOUNDARY: &str = "docparse-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn app(pipeline: MockPipelineEngine) -> Router {
        let mut provider = MockS3ClientProvider::new();
        provider.expect_client_for().never();

        let engines = AnalysisEngines {
            pipeline: Arc::new(pipeline),
            vlm: Arc::new(MockVlmEngine::new()),
            renderer: Arc::new(MockContentRenderer::new()),
            visualizer: Arc::new(MockBboxVisualizer::new()),
            pages: Arc::new(MockPageExtractor::new()),
        };
        let service = ParseService::new(WriterFactory::new(Arc::new(provider)), engines);

        create_router_with_state(AppState::new(service), &AppConfig::default(), None)
    }

    async fn post(app: Router, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/file_parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_neither_source_is_400() {
        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[Part::Text("backend", "pipeline")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Must provide either file or file_path");
    }

    #[tokio::test]
    async fn test_both_sources_is_400() {
        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[
                Part::File("a.pdf", b"%PDF"),
                Part::Text("file_path", "/tmp/a.pdf"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Must provide either file or file_path");
    }

    #[tokio::test]
    async fn test_unknown_backend_is_400() {
        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[Part::File("a.pdf", b"%PDF"), Part::Text("backend", "vlm-foo")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Unsupported backend: vlm-foo."));
    }

    #[tokio::test]
    async fn test_sglang_client_without_server_url_is_400() {
        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[
                Part::File("a.pdf", b"%PDF"),
                Part::Text("backend", "vlm-sglang-client"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "server_url is required for vlm-sglang-client backend"
        );
    }

    #[tokio::test]
    async fn test_unsupported_file_type_is_400() {
        let pipeline = MockPipelineEngine::new();
        let (status, body) = post(app(pipeline), &[Part::File("notes.docx", b"PK")]).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File type .docx is not supported.");
    }

    #[tokio::test]
    async fn test_invalid_boolean_is_400() {
        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[
                Part::File("a.pdf", b"%PDF"),
                Part::Text("return_layout", "sometimes"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("return_layout"));
    }

    #[tokio::test]
    async fn test_upload_pipeline_success() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().to_string_lossy().into_owned();

        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[
                Part::File("report.pdf", b"%PDF-1.7"),
                Part::Text("output_dir", &output_dir),
                Part::Text("return_content_list", "true"),
                Part::Text("return_layout", "1"),
                Part::Text("is_json_md_dump", "yes"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], "pipeline");
        assert!(!body["md_content"].as_str().unwrap().is_empty());
        assert!(body["content_list"].is_array());
        assert!(body["layout"].is_array());
        assert!(body.get("info").is_none());
        assert!(body.get("images").is_none());
        assert!(dir.path().join("report/report_model.json").is_file());
    }

    #[tokio::test]
    async fn test_engine_failure_is_500() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().to_string_lossy().into_owned();
        let (logs, _guard) = capture();

        let (status, body) = post(
            app(MockPipelineEngine::new().with_error("model weights missing")),
            &[
                Part::File("report.pdf", b"%PDF-1.7"),
                Part::Text("output_dir", &output_dir),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("model weights missing"));

        let event = logs.find("ERROR", "File parse failed").unwrap();
        assert_eq!(event["fields"]["backend"], "pipeline");
        assert_eq!(event["fields"]["document"], "report");
        assert!(event["fields"]["error"]
            .as_str()
            .unwrap()
            .contains("model weights missing"));
    }

    #[tokio::test]
    async fn test_missing_local_file_is_500() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().to_string_lossy().into_owned();

        let (status, body) = post(
            app(MockPipelineEngine::new()),
            &[
                Part::Text("file_path", "/definitely/not/here.pdf"),
                Part::Text("output_dir", &output_dir),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("here.pdf"));
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_rejected_as_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/file_parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(MockPipelineEngine::new()).oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].is_string());
    }
}
