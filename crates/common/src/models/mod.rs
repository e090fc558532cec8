//! Schedule data model shared by extraction and its consumers

pub mod result;
pub mod schedule;

pub use result::{
    Diagnostic, DiagnosticLevel, ExtractionMetadata, ExtractionMethod, ExtractionResult,
    Strategy, TextSource,
};
pub use schedule::{collapse_whitespace, Day, ScheduleEvent};
