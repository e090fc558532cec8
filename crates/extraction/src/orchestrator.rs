//! Extraction orchestrator
//!
//! Picks the decoding path by file type and runs the extractors in a fixed
//! fallback order until one of them yields events.

use crate::adapters::{
    CalamineDecoder, DocumentAiClient, DocumentUnderstandingService, LopdfTextDecoder, OcrTextDecoder,
    PdfTextDecoder, SpreadsheetDecoder, SpreadsheetFormat, TesseractCli,
};
use crate::diagnostics::Diagnostics;
use crate::errors::ExtractionError;
use crate::{associator, confidence, tabular, text_line};
use routine_common::config::AppConfig;
use routine_common::metrics::{record_document_service_error, ExtractionTimer};
use routine_common::models::{
    ExtractionMetadata, ExtractionMethod, ExtractionResult, ScheduleEvent, Strategy, TextSource,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const STAGE: &str = "orchestrator";

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp"];
const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "ods"];

/// Input family an upload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Spreadsheet(SpreadsheetFormat),
    Pdf,
    Image,
}

impl DocumentKind {
    /// Classify by declared mime type, then by file extension
    pub fn detect(mime_type: &str, file_name: &str) -> Option<Self> {
        let mime = mime_type.trim().to_ascii_lowercase();
        let extension = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if mime.contains("csv") || extension == "csv" {
            return Some(Self::Spreadsheet(SpreadsheetFormat::Csv));
        }
        if mime.contains("sheet") || mime.contains("excel") || WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            return Some(Self::Spreadsheet(SpreadsheetFormat::Workbook));
        }
        if mime == "application/pdf" || extension == "pdf" {
            return Some(Self::Pdf);
        }
        if mime.starts_with("image/") || IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Some(Self::Image);
        }
        None
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet(_) => "spreadsheet",
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

/// Mime type for a file name, for callers that only know the path
pub fn guess_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_string_lossy().to_ascii_lowercase();
    let mime = match extension.as_str() {
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}

/// One uploaded file
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl UploadedDocument {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub room_window: usize,
    pub verification_threshold: u8,
    pub max_upload_bytes: usize,
    pub service_timeout: Duration,
    pub ocr_timeout: Duration,
}

impl ExtractionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            room_window: config.extraction.room_window,
            verification_threshold: config.extraction.verification_threshold,
            max_upload_bytes: config.extraction.max_upload_bytes,
            service_timeout: config.document_service_timeout(),
            ocr_timeout: config.ocr_timeout(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Methods to try for `kind`, in order.
///
/// Both text strategies run on one source before the next source is read.
pub fn fallback_plan(kind: DocumentKind, service_available: bool) -> Vec<ExtractionMethod> {
    let local = match kind {
        DocumentKind::Spreadsheet(_) => {
            return vec![ExtractionMethod::new(TextSource::Spreadsheet, Strategy::Tabular)];
        }
        DocumentKind::Pdf => TextSource::PdfText,
        DocumentKind::Image => TextSource::Ocr,
    };

    let mut sources = Vec::with_capacity(2);
    if service_available {
        sources.push(TextSource::DocumentService);
    }
    sources.push(local);

    sources
        .into_iter()
        .flat_map(|source| {
            [Strategy::Structured, Strategy::LinePattern]
                .into_iter()
                .map(move |strategy| ExtractionMethod::new(source, strategy))
        })
        .collect()
}

/// Events and bookkeeping from the method that won
struct Outcome {
    events: Vec<ScheduleEvent>,
    method: ExtractionMethod,
    input_size: usize,
}

/// Extraction orchestrator
pub struct Orchestrator {
    spreadsheet: Arc<dyn SpreadsheetDecoder>,
    pdf: Arc<dyn PdfTextDecoder>,
    ocr: Arc<dyn OcrTextDecoder>,
    document_service: Option<Arc<dyn DocumentUnderstandingService>>,
    settings: ExtractionSettings,
}

impl Orchestrator {
    pub fn new(
        spreadsheet: Arc<dyn SpreadsheetDecoder>,
        pdf: Arc<dyn PdfTextDecoder>,
        ocr: Arc<dyn OcrTextDecoder>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            spreadsheet,
            pdf,
            ocr,
            document_service: None,
            settings,
        }
    }

    pub fn with_document_service(mut self, service: Arc<dyn DocumentUnderstandingService>) -> Self {
        self.document_service = Some(service);
        self
    }

    /// Wire the default decoders from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractionError> {
        let orchestrator = Self::new(
            Arc::new(CalamineDecoder::new()),
            Arc::new(LopdfTextDecoder::new()),
            Arc::new(TesseractCli::from_config(&config.ocr)),
            ExtractionSettings::from_config(config),
        );

        Ok(match DocumentAiClient::from_config(&config.document_service)? {
            Some(client) => orchestrator.with_document_service(Arc::new(client)),
            None => orchestrator,
        })
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Extract schedule events from one upload
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, mime_type = %upload.mime_type, size = upload.bytes.len()))]
    pub async fn extract(&self, upload: &UploadedDocument) -> Result<ExtractionResult, ExtractionError> {
        let timer = ExtractionTimer::start();
        let mut diagnostics = Diagnostics::new();
        let mut attempted = Vec::new();

        let outcome = match self.run(upload, &mut diagnostics, &mut attempted).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, reason = e.reason(), "Extraction failed");
                timer.failure(e.reason());
                return Err(e);
            }
        };

        let confidence = confidence::estimate(
            &outcome.events,
            outcome.input_size,
            self.settings.verification_threshold,
        );

        info!(
            method = %outcome.method,
            events = outcome.events.len(),
            confidence = confidence.score,
            needs_verification = confidence.needs_verification,
            "Extraction complete"
        );
        timer.success(&outcome.method.to_string(), confidence.score);

        Ok(ExtractionResult {
            metadata: ExtractionMetadata {
                method: outcome.method,
                confidence: confidence.score,
                needs_verification: confidence.needs_verification,
                source_file_name: upload.file_name.clone(),
                source_mime_type: upload.mime_type.clone(),
                event_count: outcome.events.len(),
                attempted_methods: attempted,
                input_size: outcome.input_size,
            },
            events: outcome.events,
            diagnostics: diagnostics.into_notes(),
        })
    }

    async fn run(
        &self,
        upload: &UploadedDocument,
        diagnostics: &mut Diagnostics,
        attempted: &mut Vec<ExtractionMethod>,
    ) -> Result<Outcome, ExtractionError> {
        self.validate(upload)?;

        let kind = DocumentKind::detect(&upload.mime_type, &upload.file_name).ok_or_else(|| {
            ExtractionError::UnsupportedFileType {
                mime_type: upload.mime_type.clone(),
                file_name: upload.file_name.clone(),
            }
        })?;
        diagnostics.info(STAGE, format!("detected {} upload", kind.label()));

        match kind {
            DocumentKind::Spreadsheet(format) => self.run_tabular(upload, format, diagnostics, attempted),
            DocumentKind::Pdf | DocumentKind::Image => self.run_text(upload, kind, diagnostics, attempted).await,
        }
    }

    fn validate(&self, upload: &UploadedDocument) -> Result<(), ExtractionError> {
        if upload.bytes.is_empty() {
            return Err(ExtractionError::EmptyUpload);
        }
        if upload.bytes.len() > self.settings.max_upload_bytes {
            return Err(ExtractionError::PayloadTooLarge {
                size: upload.bytes.len(),
                limit: self.settings.max_upload_bytes,
            });
        }
        Ok(())
    }

    fn run_tabular(
        &self,
        upload: &UploadedDocument,
        format: SpreadsheetFormat,
        diagnostics: &mut Diagnostics,
        attempted: &mut Vec<ExtractionMethod>,
    ) -> Result<Outcome, ExtractionError> {
        let method = ExtractionMethod::new(TextSource::Spreadsheet, Strategy::Tabular);
        attempted.push(method);

        let grid = self.spreadsheet.decode(&upload.bytes, format)?;
        let outcome = tabular::extract(&grid, diagnostics)?;

        if outcome.events.is_empty() {
            return Err(no_courses(upload, attempted, None));
        }

        Ok(Outcome {
            events: outcome.events,
            method,
            input_size: outcome.data_rows,
        })
    }

    async fn run_text(
        &self,
        upload: &UploadedDocument,
        kind: DocumentKind,
        diagnostics: &mut Diagnostics,
        attempted: &mut Vec<ExtractionMethod>,
    ) -> Result<Outcome, ExtractionError> {
        if self.document_service.is_none() {
            diagnostics.info(STAGE, "document service not configured, using local decoding");
        }

        let plan = fallback_plan(kind, self.document_service.is_some());
        let mut last_failure: Option<String> = None;
        // Text is acquired once per source and shared by its strategies
        let mut acquired: Option<(TextSource, Option<String>)> = None;

        for method in plan {
            if acquired.as_ref().map(|(source, _)| *source) != Some(method.source) {
                let text = match self.acquire_text(method.source, upload).await {
                    Ok(text) => {
                        diagnostics.debug(
                            STAGE,
                            format!("{} produced {} characters", method.source.as_str(), text.len()),
                        );
                        Some(text)
                    }
                    Err(e) => {
                        if method.source == TextSource::DocumentService {
                            record_document_service_error(self.service_name());
                        }
                        diagnostics.warn(STAGE, format!("{} unavailable: {}", method.source.as_str(), e));
                        last_failure = Some(e.to_string());
                        None
                    }
                };
                acquired = Some((method.source, text));
            }

            let Some((_, Some(text))) = acquired.as_ref() else {
                continue;
            };

            attempted.push(method);
            let events = self.apply(method.strategy, text, diagnostics);

            if events.is_empty() {
                diagnostics.info(STAGE, format!("{} yielded no events", method));
                continue;
            }

            debug!(method = %method, events = events.len(), "Strategy produced events");
            return Ok(Outcome {
                events,
                method,
                input_size: text.len(),
            });
        }

        Err(no_courses(upload, attempted, last_failure))
    }

    async fn acquire_text(&self, source: TextSource, upload: &UploadedDocument) -> Result<String, ExtractionError> {
        match source {
            TextSource::DocumentService => {
                let service = self.document_service.as_ref().ok_or_else(|| ExtractionError::ExternalService {
                    service: "document-service".to_string(),
                    message: "not configured".to_string(),
                })?;
                tokio::time::timeout(
                    self.settings.service_timeout,
                    service.extract_text(&upload.bytes, &upload.mime_type),
                )
                .await
                .map_err(|_| ExtractionError::ExternalServiceTimeout {
                    service: service.name().to_string(),
                    timeout_secs: self.settings.service_timeout.as_secs(),
                })?
            }
            TextSource::PdfText => self.pdf.decode(&upload.bytes),
            TextSource::Ocr => tokio::time::timeout(
                self.settings.ocr_timeout,
                self.ocr.recognize(&upload.bytes, &upload.mime_type),
            )
            .await
            .map_err(|_| ExtractionError::ExternalServiceTimeout {
                service: "ocr".to_string(),
                timeout_secs: self.settings.ocr_timeout.as_secs(),
            })?,
            TextSource::Spreadsheet => Err(ExtractionError::Decode {
                format: "spreadsheet".to_string(),
                message: "cell grids are read by the tabular path".to_string(),
            }),
        }
    }

    fn apply(&self, strategy: Strategy, text: &str, diagnostics: &mut Diagnostics) -> Vec<ScheduleEvent> {
        match strategy {
            Strategy::Structured => associator::extract(text, self.settings.room_window, diagnostics),
            Strategy::LinePattern => text_line::extract(text, diagnostics),
            Strategy::Tabular => Vec::new(),
        }
    }

    fn service_name(&self) -> &str {
        self.document_service
            .as_ref()
            .map(|s| s.name())
            .unwrap_or("document-service")
    }
}

fn no_courses(upload: &UploadedDocument, attempted: &[ExtractionMethod], last_failure: Option<String>) -> ExtractionError {
    ExtractionError::NoCoursesFound {
        file_type: upload.mime_type.clone(),
        file_name: upload.file_name.clone(),
        attempted: attempted.iter().map(ToString::to_string).collect(),
        last_failure,
    }
}
