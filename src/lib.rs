//! Document parsing gateway
//!
//! Accepts a PDF or image over `POST /file_parse`, runs it through the
//! pipeline or a VLM backend of the analysis engine, persists the artifacts
//! locally or in S3 and returns markdown plus optional structured results.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::engine::{HttpClient, HttpEngineClient, LopdfPageExtractor};
use infrastructure::services::{AnalysisEngines, ParseService};
use infrastructure::storage::WriterFactory;
use tracing::info;

/// Create the application state with custom configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    if config.engine.base_url.trim().is_empty() {
        anyhow::bail!("engine.base_url must not be empty");
    }

    let engine = Arc::new(HttpEngineClient::new(
        HttpClient::new(),
        config.engine.base_url.clone(),
    ));

    let engines = AnalysisEngines {
        pipeline: engine.clone(),
        vlm: engine.clone(),
        renderer: engine.clone(),
        visualizer: engine,
        pages: Arc::new(LopdfPageExtractor::new()),
    };

    let writers = WriterFactory::from_config(config.storage.s3.clone());
    info!(
        engine = %config.engine.base_url,
        s3_buckets = config.storage.s3.buckets.len(),
        s3_default = config.storage.s3.default_bucket.is_some(),
        "Parse service initialized"
    );

    Ok(AppState::new(ParseService::new(writers, engines)))
}
