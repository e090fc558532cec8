//! Extraction result contract consumed by rendering and export layers

use super::schedule::ScheduleEvent;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Where the text or cells an extractor ran on came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    Spreadsheet,
    DocumentService,
    PdfText,
    Ocr,
}

impl TextSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSource::Spreadsheet => "spreadsheet",
            TextSource::DocumentService => "document-service",
            TextSource::PdfText => "pdf-text",
            TextSource::Ocr => "ocr",
        }
    }
}

/// Parsing strategy applied to acquired content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Tabular,
    Structured,
    LinePattern,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Tabular => "tabular",
            Strategy::Structured => "structured",
            Strategy::LinePattern => "line-pattern",
        }
    }
}

/// A source + strategy pair, rendered as `source/strategy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractionMethod {
    pub source: TextSource,
    pub strategy: Strategy,
}

impl ExtractionMethod {
    pub const fn new(source: TextSource, strategy: Strategy) -> Self {
        Self { source, strategy }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source.as_str(), self.strategy.as_str())
    }
}

impl Serialize for ExtractionMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// A per-stage note recorded while extracting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub stage: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    /// Method that produced the events
    pub method: ExtractionMethod,

    /// Completeness score, 0..=100
    pub confidence: u8,

    pub needs_verification: bool,

    pub source_file_name: String,

    pub source_mime_type: String,

    pub event_count: usize,

    /// Every method tried, in order, including the winning one
    pub attempted_methods: Vec<ExtractionMethod>,

    /// Characters of acquired text, or data rows for tabular input
    pub input_size: usize,
}

/// Canonical output of one extraction request
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub events: Vec<ScheduleEvent>,
    pub metadata: ExtractionMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_renders_source_and_strategy() {
        let method = ExtractionMethod::new(TextSource::PdfText, Strategy::Structured);
        assert_eq!(method.to_string(), "pdf-text/structured");
        assert_eq!(serde_json::to_value(method).unwrap(), "pdf-text/structured");
    }

    #[test]
    fn test_metadata_is_camel_case() {
        let metadata = ExtractionMetadata {
            method: ExtractionMethod::new(TextSource::Spreadsheet, Strategy::Tabular),
            confidence: 90,
            needs_verification: false,
            source_file_name: "AdvisingSlip.xlsx".to_string(),
            source_mime_type: "application/vnd.ms-excel".to_string(),
            event_count: 4,
            attempted_methods: vec![],
            input_size: 2,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["needsVerification"], false);
        assert_eq!(json["sourceFileName"], "AdvisingSlip.xlsx");
        assert_eq!(json["eventCount"], 4);
        assert_eq!(json["method"], "spreadsheet/tabular");
    }
}
