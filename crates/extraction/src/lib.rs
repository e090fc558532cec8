//! Routine Extraction
//!
//! Turns an uploaded advising slip (spreadsheet, PDF or photo) into a list
//! of weekly schedule events:
//! 1. Detects the file type
//! 2. Decodes cells or text through the matching adapter
//! 3. Runs the extractors in fallback order
//! 4. Scores the result and flags it for review when incomplete

pub mod adapters;
pub mod associator;
pub mod confidence;
pub mod diagnostics;
pub mod errors;
pub mod export;
pub mod normalizer;
pub mod orchestrator;
pub mod tabular;
pub mod text_line;

pub use errors::ExtractionError;
pub use orchestrator::{DocumentKind, ExtractionSettings, Orchestrator, UploadedDocument};
