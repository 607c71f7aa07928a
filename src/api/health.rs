//! Liveness and health endpoints

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::domain::backend::SUPPORTED_BACKENDS;
use crate::domain::document::SUPPORTED_EXTENSIONS;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Backends accepted by `/file_parse`
    pub backends: &'static [&'static str],
    /// File types accepted by `/file_parse`
    pub file_types: &'static [&'static str],
}

/// 200 while the process serves requests; the analysis engine is not contacted
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        backends: &SUPPORTED_BACKENDS,
        file_types: &SUPPORTED_EXTENSIONS,
    })
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
