//! CSV export of extracted events

use crate::errors::ExtractionError;
use routine_common::models::ScheduleEvent;

pub const CSV_HEADER: [&str; 5] = ["Course Code", "Day", "Start Time", "End Time", "Room"];

/// Render events as CSV with every field quoted
pub fn to_csv(events: &[ScheduleEvent]) -> Result<String, ExtractionError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(export_error)?;

    for event in events {
        let start = event.start_hhmm();
        let end = event.end_hhmm();
        writer
            .write_record([
                event.course_code.as_str(),
                event.day.name(),
                start.as_str(),
                end.as_str(),
                event.room.as_str(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| export_error(e.into_error()))?;
    String::from_utf8(bytes).map_err(export_error)
}

fn export_error(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Export {
        format: "csv".to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use routine_common::models::Day;

    #[test]
    fn test_csv_quotes_every_field() {
        let event = ScheduleEvent::new(
            "ICE109 Lab",
            Day::Sunday,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            "449",
        )
        .unwrap();

        let csv = to_csv(&[event]).unwrap();
        assert_eq!(
            csv,
            "\"Course Code\",\"Day\",\"Start Time\",\"End Time\",\"Room\"\n\"ICE109 Lab\",\"Sunday\",\"08:00\",\"10:00\",\"449\"\n"
        );
    }

    #[test]
    fn test_write_failure_is_export_error() {
        let err = export_error("broken pipe");
        assert_eq!(err.to_string(), "Could not encode csv export: broken pipe");
        assert_eq!(err.code(), routine_common::ErrorCode::ExportFailed);
        assert!(!err.code().is_client_error());
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
