//! HTTP API types

pub mod error;
pub mod form;

pub use error::{ApiError, ApiErrorResponse};
pub use form::ParseForm;
