//! Multipart form extractor for `/file_parse`
//!
//! Converts every multipart rejection into the API's error envelope and
//! collects the form fields into a [`RawParseRequest`].

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};
use tracing::debug;

use super::error::ApiError;
use crate::domain::parse::{RawParseRequest, UploadedFile};
use crate::domain::ParseValidationError;

/// Parsed `/file_parse` form
#[derive(Debug)]
pub struct ParseForm(pub RawParseRequest);

impl ParseForm {
    pub fn into_inner(self) -> RawParseRequest {
        self.0
    }
}

/// Form boolean: true/false, 1/0, yes/no, on/off in any case
pub fn parse_bool(field: &str, value: &str) -> Result<bool, ParseValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ParseValidationError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    let message = format!("Failed to read multipart field: {}", err.body_text());

    let err = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(message)
    } else {
        ApiError::bad_request(message)
    };
    debug!(status = %err.status, error = err.message(), "Rejected multipart body");
    err
}

impl<S> FromRequest<S> for ParseForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| {
                let err = ApiError::new(rejection.status(), rejection.body_text());
                debug!(
                    status = %err.status,
                    error = err.message(),
                    "Rejected non-multipart request"
                );
                err
            })?;

        let mut raw = RawParseRequest::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "file" {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // browsers send an empty part when no file was chosen
                let empty = bytes.is_empty() && filename.as_deref().is_none_or(str::is_empty);
                if !empty {
                    raw.file = Some(UploadedFile { bytes, filename });
                }
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;

            match name.as_str() {
                "file_path" => raw.file_path = Some(value),
                "backend" => raw.backend = value,
                "parse_method" => raw.pipeline.parse_method = value,
                "lang" => raw.pipeline.lang = value,
                "formula_enable" => raw.pipeline.formula_enable = parse_bool(&name, &value)?,
                "table_enable" => raw.pipeline.table_enable = parse_bool(&name, &value)?,
                "server_url" => raw.server_url = Some(value),
                "is_json_md_dump" => raw.is_json_md_dump = parse_bool(&name, &value)?,
                "output_dir" => raw.output_dir = value,
                "return_layout" => raw.fields.layout = parse_bool(&name, &value)?,
                "return_info" => raw.fields.info = parse_bool(&name, &value)?,
                "return_content_list" => raw.fields.content_list = parse_bool(&name, &value)?,
                "return_images" => raw.fields.images = parse_bool(&name, &value)?,
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(ParseForm(raw))
    }
}
