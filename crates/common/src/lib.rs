//! Routine Common Library
//!
//! Shared code for the Routine extraction pipeline including:
//! - Schedule event model and the extraction result contract
//! - Error codes and the failure response body
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use models::{Day, ExtractionResult, ScheduleEvent};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
