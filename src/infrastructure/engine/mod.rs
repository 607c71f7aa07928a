//! Analysis engine adapters

mod http_client;
mod http_engine;
mod pdf;

pub use http_client::{HttpClient, HttpClientTrait};
pub use http_engine::HttpEngineClient;
pub use pdf::LopdfPageExtractor;
