//! Infrastructure services

mod parse_service;

pub use parse_service::{to_pretty_json, AnalysisEngines, ParseService};
