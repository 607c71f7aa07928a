//! The `/file_parse` request: raw form input, validation and the response
//! payload

mod request;
mod response;
mod validation;

pub use request::{ParseRequest, RawParseRequest, ResponseFields, UploadedFile, DEFAULT_OUTPUT_DIR};
pub use response::ParseResponse;
pub use validation::ParseValidationError;
