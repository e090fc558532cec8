//! Configuration management for Routine
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Extraction pipeline tuning
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// External document-understanding service
    #[serde(default)]
    pub document_service: DocumentServiceConfig,

    /// Local OCR engine
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Maximum line distance between a schedule line and its room line
    #[serde(default = "default_room_window")]
    pub room_window: usize,

    /// Results scoring below this are flagged for human review
    #[serde(default = "default_verification_threshold")]
    pub verification_threshold: u8,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentServiceConfig {
    /// Processing endpoint URL; the service is unconfigured when absent
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_service_retries")]
    pub max_retries: u32,
}

impl DocumentServiceConfig {
    /// Trimmed endpoint, or `None` when the service is unconfigured
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrConfig {
    /// Path to the tesseract binary
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,

    /// Tesseract language codes (e.g., "eng", "eng+ben")
    #[serde(default = "default_ocr_language")]
    pub language: String,

    #[serde(default = "default_ocr_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_room_window() -> usize { 10 }
fn default_verification_threshold() -> u8 { 70 }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }
fn default_service_timeout() -> u64 { 30 }
fn default_service_retries() -> u32 { 2 }
fn default_tesseract_path() -> String { "tesseract".to_string() }
fn default_ocr_language() -> String { "eng".to_string() }
fn default_ocr_timeout() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            room_window: default_room_window(),
            verification_threshold: default_verification_threshold(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for DocumentServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_service_timeout(),
            max_retries: default_service_retries(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: default_tesseract_path(),
            language: default_ocr_language(),
            timeout_secs: default_ocr_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__EXTRACTION__ROOM_WINDOW=8
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get document service timeout as Duration
    pub fn document_service_timeout(&self) -> Duration {
        Duration::from_secs(self.document_service.timeout_secs)
    }

    /// Get OCR timeout as Duration
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr.timeout_secs)
    }

}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            document_service: DocumentServiceConfig::default(),
            ocr: OcrConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
