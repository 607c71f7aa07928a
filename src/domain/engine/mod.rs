//! Analysis engine domain - the opaque collaborators that do the actual
//! document understanding, and the uniform result they produce

mod provider;
mod result;
mod types;

pub use provider::{BboxVisualizer, ContentRenderer, PageExtractor, PipelineEngine, VlmEngine};
pub use result::AnalysisResult;
pub use types::{MakeMode, PipelineAnalyzeRequest, PipelineInference, RenderFlavor, VlmOutput};

#[cfg(test)]
pub use provider::mock;
