//! Tabular extraction for spreadsheet advising slips
//!
//! Locates the `Course(s)` header row, resolves the course, combined
//! day/time and room columns, then walks data rows until the first blank
//! course cell.

use crate::diagnostics::Diagnostics;
use crate::errors::ExtractionError;
use crate::normalizer::build_events;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use routine_common::models::ScheduleEvent;

/// Header marker for the course-name column
pub const COURSE_HEADER: &str = "Course(s)";
/// Header marker for the combined day-codes + time-range column
pub const TIME_WEEKDAY_HEADER: &str = "Time-WeekDay";
/// Header marker for the room column
pub const ROOM_HEADER: &str = "Room";

const STAGE: &str = "tabular";

/// Two-dimensional cell grid, rows by columns, from the first sheet
pub type CellGrid = Vec<Vec<String>>;

/// `MW 4:50PM-6:20PM`
static TIME_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([SMTWRFA]+)\s+(\d{1,2}:\d{2}\s?[AP]M)\s*-\s*(\d{1,2}:\d{2}\s?[AP]M)")
        .expect("valid time-weekday pattern")
});

/// Resolved header columns; unresolved columns read as empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderColumns {
    pub row: usize,
    pub course: usize,
    pub time_weekday: Option<usize>,
    pub room: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularOutcome {
    pub events: Vec<ScheduleEvent>,
    /// Data rows read before the terminator
    pub data_rows: usize,
}

/// Find the header row and its columns
pub fn locate_header(grid: &[Vec<String>]) -> Result<HeaderColumns, ExtractionError> {
    let row = grid
        .iter()
        .position(|cells| cells.iter().any(|cell| cell.contains(COURSE_HEADER)))
        .ok_or_else(|| ExtractionError::HeaderNotFound {
            marker: COURSE_HEADER.to_string(),
        })?;

    let mut course = None;
    let mut time_weekday = None;
    let mut room = None;

    for (index, cell) in grid[row].iter().enumerate() {
        if cell.contains(COURSE_HEADER) {
            course.get_or_insert(index);
        } else if cell.contains(TIME_WEEKDAY_HEADER) {
            time_weekday.get_or_insert(index);
        } else if cell.contains(ROOM_HEADER) {
            room.get_or_insert(index);
        }
    }

    Ok(HeaderColumns {
        row,
        // The row was selected because some cell carries the marker
        course: course.unwrap_or_default(),
        time_weekday,
        room,
    })
}

/// Extract events from a decoded cell grid
pub fn extract(grid: &[Vec<String>], diagnostics: &mut Diagnostics) -> Result<TabularOutcome, ExtractionError> {
    let columns = locate_header(grid)?;

    diagnostics.debug(
        STAGE,
        format!(
            "header at row {} (course col {}, time col {:?}, room col {:?})",
            columns.row, columns.course, columns.time_weekday, columns.room
        ),
    );
    if columns.time_weekday.is_none() {
        diagnostics.warn(STAGE, format!("no {} column in header row", TIME_WEEKDAY_HEADER));
    }

    let mut events = Vec::new();
    let mut data_rows = 0;

    for (offset, row) in grid[columns.row + 1..].iter().enumerate() {
        let row_number = columns.row + 1 + offset;
        let course_name = cell(row, Some(columns.course));
        if course_name.is_empty() {
            diagnostics.debug(STAGE, format!("course list ends at row {}", row_number));
            break;
        }
        data_rows += 1;

        let time_weekday = cell(row, columns.time_weekday);
        let room = cell(row, columns.room);

        let Some(caps) = TIME_WEEKDAY.captures(time_weekday) else {
            diagnostics.warn(
                STAGE,
                format!("row {}: '{}' has no day/time schedule, skipped", row_number, time_weekday),
            );
            continue;
        };

        match build_events(course_name, &caps[1], &caps[2], &caps[3], room, None) {
            Ok(row_events) => {
                if row_events.is_empty() {
                    diagnostics.warn(STAGE, format!("row {}: no recognized day codes in '{}'", row_number, &caps[1]));
                }
                events.extend(row_events);
            }
            Err(e) => diagnostics.warn(STAGE, format!("row {}: {}, skipped", row_number, e)),
        }
    }

    diagnostics.info(
        STAGE,
        format!("{} events from {} course rows", events.len(), data_rows),
    );

    Ok(TabularOutcome { events, data_rows })
}

fn cell(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|index| row.get(index))
        .map(|value| value.trim())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use routine_common::models::Day;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn slip() -> CellGrid {
        vec![
            row(&["East West University"]),
            row(&["Advising Slip", "", "Spring 2025"]),
            row(&["SL", "Course(s)", "Section", "Time-WeekDay", "Room"]),
            row(&["1", "CSE101", "3", "MWF 9:00AM-10:00AM", "AB3-302"]),
            row(&["2", "ICE109 Lab", "1", "S 8:00AM-10:00AM", "449"]),
            row(&["", "", "", "", ""]),
            row(&["", "PHY109", "", "TR 3:10PM-4:40PM", "FUB-801"]),
        ]
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_locate_header_columns() {
        let columns = locate_header(&slip()).unwrap();
        assert_eq!(
            columns,
            HeaderColumns { row: 2, course: 1, time_weekday: Some(3), room: Some(4) }
        );
    }

    #[test]
    fn test_missing_header_is_error() {
        let grid = vec![row(&["Course", "Time", "Room"]), row(&["CSE101", "M 9:00AM-10:00AM", "221"])];
        let err = extract(&grid, &mut Diagnostics::new()).unwrap_err();
        assert!(matches!(err, ExtractionError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_header_match_is_case_sensitive() {
        let grid = vec![row(&["course(s)", "Time-WeekDay", "Room"])];
        assert!(locate_header(&grid).is_err());
    }

    #[test]
    fn test_rows_stop_at_blank_course_cell() {
        let outcome = extract(&slip(), &mut Diagnostics::new()).unwrap();

        assert_eq!(outcome.data_rows, 2);
        assert_eq!(outcome.events.len(), 4);
        assert!(outcome.events.iter().all(|e| e.course_code != "PHY109"));
    }

    #[test]
    fn test_multi_day_cell_expands() {
        let outcome = extract(&slip(), &mut Diagnostics::new()).unwrap();
        let cse: Vec<_> = outcome.events.iter().filter(|e| e.course_code == "CSE101").collect();

        assert_eq!(cse.len(), 3);
        assert_eq!(
            cse.iter().map(|e| e.day).collect::<Vec<_>>(),
            vec![Day::Monday, Day::Wednesday, Day::Friday]
        );
        assert!(cse.iter().all(|e| e.start_time == at(9, 0) && e.end_time == at(10, 0) && e.room == "AB3-302"));
    }

    #[test]
    fn test_lab_suffix_is_distinct_course() {
        let outcome = extract(&slip(), &mut Diagnostics::new()).unwrap();
        let lab = outcome.events.iter().find(|e| e.course_code == "ICE109 Lab").unwrap();
        assert_eq!(lab.day, Day::Sunday);
        assert_eq!(lab.room, "449");
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let grid = slip();
        let first = extract(&grid, &mut Diagnostics::new()).unwrap();
        let second = extract(&grid, &mut Diagnostics::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_schedule_cell_skips_row_only() {
        let grid = vec![
            row(&["Course(s)", "Time-WeekDay", "Room"]),
            row(&["ENG7102", "TBA", "221"]),
            row(&["MAT102", "TR 13:50PM-1:20PM", "AB3-401"]),
            row(&["PHY109", "TR 3:10PM-4:40PM", "FUB-801"]),
        ];
        let mut diagnostics = Diagnostics::new();
        let outcome = extract(&grid, &mut diagnostics).unwrap();

        assert_eq!(outcome.data_rows, 3);
        assert_eq!(outcome.events.len(), 2);
        assert!(outcome.events.iter().all(|e| e.course_code == "PHY109"));
        assert_eq!(
            diagnostics
                .at_least(routine_common::models::DiagnosticLevel::Warn)
                .count(),
            2
        );
    }

    #[test]
    fn test_missing_columns_read_as_empty() {
        let grid = vec![
            row(&["Course(s)", "Time-WeekDay"]),
            row(&["ENG7102", "MW 4:50PM-6:20PM"]),
        ];
        let outcome = extract(&grid, &mut Diagnostics::new()).unwrap();
        assert_eq!(outcome.events.len(), 2);
        assert!(outcome.events.iter().all(|e| e.room.is_empty()));
    }

    #[test]
    fn test_short_row_terminates() {
        let grid = vec![
            row(&["", "", "Course(s)", "Time-WeekDay", "Room"]),
            row(&["1", "", "ENG7102", "MW 4:50PM-6:20PM", "221"]),
            row(&["Total"]),
            row(&["", "", "MAT102", "TR 11:50AM-1:20PM", "AB3-401"]),
        ];
        let outcome = extract(&grid, &mut Diagnostics::new()).unwrap();
        assert_eq!(outcome.data_rows, 1);
        assert_eq!(outcome.events.len(), 2);
    }
}
