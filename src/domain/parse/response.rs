use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Success payload of `/file_parse`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_list: Option<Value>,
    /// Image file name to `data:image/jpeg;base64,...`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<String, String>>,
    pub md_content: String,
    pub backend: String,
}

impl ParseResponse {
    pub fn new(md_content: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            layout: None,
            info: None,
            content_list: None,
            images: None,
            md_content: md_content.into(),
            backend: backend.into(),
        }
    }
}
