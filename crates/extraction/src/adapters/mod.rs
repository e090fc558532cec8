//! Collaborator interfaces the extraction pipeline depends on
//!
//! Decoders turn upload bytes into something an extractor can read:
//! - Spreadsheets (xlsx, xls, ods, csv) into a cell grid
//! - PDFs into linearized text
//! - Images into OCR text
//! - Any supported document into text via an optional remote service

pub mod document_service;
pub mod ocr;
pub mod pdf;
pub mod spreadsheet;

use crate::errors::ExtractionError;
use crate::tabular::CellGrid;
use async_trait::async_trait;

pub use document_service::DocumentAiClient;
pub use ocr::TesseractCli;
pub use pdf::LopdfTextDecoder;
pub use spreadsheet::CalamineDecoder;

/// Spreadsheet container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Excel, OpenDocument and other calamine-readable workbooks
    Workbook,
    Csv,
}

/// Decode the first sheet of a spreadsheet into a cell grid
pub trait SpreadsheetDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], format: SpreadsheetFormat) -> Result<CellGrid, ExtractionError>;
}

/// Linearize the text of a PDF, one text line per output line
pub trait PdfTextDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Recognize text in an image
#[async_trait]
pub trait OcrTextDecoder: Send + Sync {
    async fn recognize(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError>;
}

/// Remote document-understanding service
#[async_trait]
pub trait DocumentUnderstandingService: Send + Sync {
    /// Service name used in diagnostics and metrics
    fn name(&self) -> &str;

    async fn extract_text(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError>;
}
