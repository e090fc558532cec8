//! Extraction error types

use routine_common::errors::{ErrorCode, ErrorResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Could not find the {marker} header in the first sheet")]
    HeaderNotFound { marker: String },

    #[error("Malformed time '{input}': {reason}")]
    MalformedTime { input: String, reason: String },

    #[error("Unsupported file type: {mime_type} ({file_name})")]
    UnsupportedFileType { mime_type: String, file_name: String },

    #[error("No courses found in {file_name}")]
    NoCoursesFound {
        file_type: String,
        file_name: String,
        attempted: Vec<String>,
        last_failure: Option<String>,
    },

    #[error("External service {service} failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("External service {service} timed out after {timeout_secs}s")]
    ExternalServiceTimeout { service: String, timeout_secs: u64 },

    #[error("Could not decode {format} content: {message}")]
    Decode { format: String, message: String },

    #[error("Could not encode {format} export: {message}")]
    Export { format: String, message: String },

    #[error("Upload is empty")]
    EmptyUpload,

    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExtractionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExtractionError::HeaderNotFound { .. } => ErrorCode::HeaderNotFound,
            ExtractionError::MalformedTime { .. } => ErrorCode::MalformedTime,
            ExtractionError::UnsupportedFileType { .. } => ErrorCode::UnsupportedFileType,
            ExtractionError::NoCoursesFound { .. } => ErrorCode::NoCoursesFound,
            ExtractionError::ExternalService { .. } => ErrorCode::ExternalServiceError,
            ExtractionError::ExternalServiceTimeout { .. } => ErrorCode::ExternalServiceTimeout,
            ExtractionError::Decode { .. } => ErrorCode::DecodeFailed,
            ExtractionError::Export { .. } => ErrorCode::ExportFailed,
            ExtractionError::EmptyUpload => ErrorCode::EmptyUpload,
            ExtractionError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            ExtractionError::IoError(_) => ErrorCode::InternalError,
        }
    }

    /// Short snake_case label used for failure metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::HeaderNotFound { .. } => "header_not_found",
            ExtractionError::MalformedTime { .. } => "malformed_time",
            ExtractionError::UnsupportedFileType { .. } => "unsupported_file_type",
            ExtractionError::NoCoursesFound { .. } => "no_courses_found",
            ExtractionError::ExternalService { .. } => "external_service",
            ExtractionError::ExternalServiceTimeout { .. } => "external_service_timeout",
            ExtractionError::Decode { .. } => "decode",
            ExtractionError::Export { .. } => "export",
            ExtractionError::EmptyUpload => "empty_upload",
            ExtractionError::PayloadTooLarge { .. } => "payload_too_large",
            ExtractionError::IoError(_) => "io",
        }
    }

    /// Build the failure body for the uploader, carrying enough context to
    /// fix the input file
    pub fn to_response(&self, file_name: &str, file_type: &str) -> ErrorResponse {
        let response = ErrorResponse::new(self.code(), self.to_string()).with_file(file_name, file_type);

        match self {
            ExtractionError::NoCoursesFound { attempted, last_failure, .. } => {
                let mut details = if attempted.is_empty() {
                    "No extraction method could run".to_string()
                } else {
                    format!("Attempted: {}", attempted.join(", "))
                };
                if let Some(failure) = last_failure {
                    details.push_str(&format!("; last failure: {}", failure));
                }
                response.with_details(details)
            }
            ExtractionError::HeaderNotFound { .. } => response.with_details(
                "The spreadsheet must contain a header row with Course(s), Time-WeekDay and Room columns",
            ),
            ExtractionError::UnsupportedFileType { .. } => {
                response.with_details("Supported: .xlsx, .xls, .ods, .csv, .pdf, .jpg, .jpeg, .png")
            }
            _ => response,
        }
    }
}
