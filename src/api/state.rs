//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::ParseService;

/// Application state shared by all handlers; holds no per-request data
#[derive(Clone)]
pub struct AppState {
    pub parse_service: Arc<ParseService>,
}

impl AppState {
    pub fn new(parse_service: ParseService) -> Self {
        Self {
            parse_service: Arc::new(parse_service),
        }
    }
}
