//! Error types for Routine
//!
//! Provides:
//! - Machine-readable error codes grouped by failure family
//! - Client/server classification for callers that map onto HTTP
//! - The structured failure body returned to upload clients

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors (1xxx)
    UnsupportedFileType,
    EmptyUpload,
    PayloadTooLarge,

    // Extraction errors (4xxx)
    HeaderNotFound,
    MalformedTime,
    NoCoursesFound,
    DecodeFailed,

    // External service errors (8xxx)
    ExternalServiceError,
    ExternalServiceTimeout,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    ExportFailed,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Input (1xxx)
            ErrorCode::UnsupportedFileType => 1001,
            ErrorCode::EmptyUpload => 1002,
            ErrorCode::PayloadTooLarge => 1003,

            // Extraction (4xxx)
            ErrorCode::HeaderNotFound => 4001,
            ErrorCode::MalformedTime => 4002,
            ErrorCode::NoCoursesFound => 4003,
            ErrorCode::DecodeFailed => 4004,

            // External (8xxx)
            ErrorCode::ExternalServiceError => 8001,
            ErrorCode::ExternalServiceTimeout => 8002,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::ExportFailed => 9004,
        }
    }

    /// Failures the uploader can fix by changing the input file
    pub fn is_client_error(&self) -> bool {
        self.as_code() < 8000
    }

    /// HTTP-equivalent status for transports that need one
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::UnsupportedFileType => 415,
            ErrorCode::PayloadTooLarge => 413,
            ErrorCode::EmptyUpload
            | ErrorCode::HeaderNotFound
            | ErrorCode::MalformedTime
            | ErrorCode::DecodeFailed => 400,
            ErrorCode::NoCoursesFound => 422,
            ErrorCode::ExternalServiceError | ErrorCode::ExternalServiceTimeout => 502,
            ErrorCode::InternalError
            | ErrorCode::ConfigurationError
            | ErrorCode::SerializationError
            | ErrorCode::ExportFailed => 500,
        }
    }
}

/// Process-level failures outside the extraction taxonomy
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ::config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Configuration(_) => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }
}

/// Structured failure body returned to the uploader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
            file_type: None,
            file_name: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_file(mut self, file_name: &str, file_type: &str) -> Self {
        if !file_name.is_empty() {
            self.file_name = Some(file_name.to_string());
        }
        if !file_type.is_empty() {
            self.file_type = Some(file_type.to_string());
        }
        self
    }

    /// Log the failure at a level matching its classification
    pub fn log(&self) {
        if self.code.is_client_error() {
            tracing::warn!(
                error = %self.error,
                code = ?self.code,
                status = self.code.status(),
                "Client error"
            );
        } else {
            tracing::error!(
                error = %self.error,
                code = ?self.code,
                status = self.code.status(),
                "Server error"
            );
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_classification() {
        assert!(ErrorCode::HeaderNotFound.is_client_error());
        assert!(ErrorCode::NoCoursesFound.is_client_error());
        assert!(!ErrorCode::ExternalServiceError.is_client_error());
        assert_eq!(ErrorCode::UnsupportedFileType.status(), 415);
        assert_eq!(ErrorCode::NoCoursesFound.as_code(), 4003);
    }

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse::new(ErrorCode::NoCoursesFound, "No courses found")
            .with_details("tried pdf-text/structured")
            .with_file("slip.pdf", "application/pdf");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "No courses found");
        assert_eq!(json["code"], "NO_COURSES_FOUND");
        assert_eq!(json["fileType"], "application/pdf");
        assert_eq!(json["fileName"], "slip.pdf");
        assert_eq!(json["details"], "tried pdf-text/structured");
    }

    #[test]
    fn test_error_response_omits_empty_file_fields() {
        let body = ErrorResponse::new(ErrorCode::EmptyUpload, "Empty upload").with_file("", "");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("fileName").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_config_failure_is_server_error() {
        let err = AppError::from(::config::ConfigError::Message("missing field `ocr`".into()));
        let body = ErrorResponse::from(&err);

        assert_eq!(body.code, ErrorCode::ConfigurationError);
        assert!(!body.code.is_client_error());
        assert_eq!(body.error, "Configuration error: missing field `ocr`");
    }

    #[test]
    fn test_serialization_failure_code() {
        let err = AppError::from(serde_json::from_str::<ErrorResponse>("{").unwrap_err());
        assert_eq!(err.code(), ErrorCode::SerializationError);
        assert_eq!(err.code().status(), 500);
    }
}
