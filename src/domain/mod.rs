//! Domain layer - Core parsing types, collaborator traits and errors

pub mod backend;
pub mod document;
pub mod engine;
pub mod error;
pub mod parse;
pub mod storage;

pub use backend::{Backend, PipelineOptions, VlmBackend, SUPPORTED_BACKENDS};
pub use document::{DocumentSource, S3Location};
pub use engine::{
    AnalysisResult, BboxVisualizer, ContentRenderer, MakeMode, PageExtractor, PipelineEngine,
    RenderFlavor, VlmEngine,
};
pub use error::DomainError;
pub use parse::{ParseRequest, ParseResponse, ParseValidationError, RawParseRequest};
pub use storage::{DataReader, DataWriter, StorageKind};
