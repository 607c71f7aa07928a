//! Parsing backend selection
//!
//! The form field `backend` is resolved exactly once into a [`Backend`],
//! which carries the options that are meaningful for that backend only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::parse::ParseValidationError;

/// Backend identifiers accepted by the `/file_parse` endpoint
pub const SUPPORTED_BACKENDS: [&str; 4] = [
    "pipeline",
    "vlm-transformers",
    "vlm-sglang-engine",
    "vlm-sglang-client",
];

/// Options of the classical OCR/layout pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub parse_method: String,
    pub lang: String,
    pub formula_enable: bool,
    pub table_enable: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parse_method: "auto".to_string(),
            lang: "ch".to_string(),
            formula_enable: true,
            table_enable: true,
        }
    }
}

/// Vision-language-model backend variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlmBackend {
    /// In-process transformers inference
    Transformers,
    /// In-process sglang serving engine
    SglangEngine,
    /// Remote sglang server
    SglangClient { server_url: String },
}

impl VlmBackend {
    /// Variant name as understood by the analysis engine
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transformers => "transformers",
            Self::SglangEngine => "sglang-engine",
            Self::SglangClient { .. } => "sglang-client",
        }
    }

    pub fn server_url(&self) -> Option<&str> {
        match self {
            Self::SglangClient { server_url } => Some(server_url),
            _ => None,
        }
    }
}

/// A fully resolved parsing backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Pipeline(PipelineOptions),
    Vlm(VlmBackend),
}

impl Backend {
    /// Resolve a backend identifier together with its per-backend options.
    ///
    /// `server_url` is required (non-empty) for `vlm-sglang-client` and
    /// ignored by every other backend.
    pub fn resolve(
        name: &str,
        pipeline: PipelineOptions,
        server_url: Option<&str>,
    ) -> Result<Self, ParseValidationError> {
        match name {
            "pipeline" => Ok(Self::Pipeline(pipeline)),
            "vlm-transformers" => Ok(Self::Vlm(VlmBackend::Transformers)),
            "vlm-sglang-engine" => Ok(Self::Vlm(VlmBackend::SglangEngine)),
            "vlm-sglang-client" => match server_url.map(str::trim) {
                Some(url) if !url.is_empty() => Ok(Self::Vlm(VlmBackend::SglangClient {
                    server_url: url.to_string(),
                })),
                _ => Err(ParseValidationError::MissingServerUrl),
            },
            other => Err(ParseValidationError::UnsupportedBackend {
                backend: other.to_string(),
            }),
        }
    }

    /// The identifier this backend was requested with
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline(_) => "pipeline",
            Self::Vlm(VlmBackend::Transformers) => "vlm-transformers",
            Self::Vlm(VlmBackend::SglangEngine) => "vlm-sglang-engine",
            Self::Vlm(VlmBackend::SglangClient { .. }) => "vlm-sglang-client",
        }
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline(_))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
