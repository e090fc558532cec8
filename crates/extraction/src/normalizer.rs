//! Day-code expansion and 12/24-hour time normalization
//!
//! Pure functions shared by every extractor.

use crate::errors::ExtractionError;
use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use routine_common::models::{Day, ScheduleEvent};

static TIME_12H: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})([AP]M)$").expect("valid 12-hour time pattern")
});

/// Expand a run of day codes into days, left to right.
///
/// Unrecognized characters (OCR noise) are skipped.
pub fn expand_day_codes(codes: &str) -> Vec<Day> {
    codes.chars().filter_map(Day::from_code).collect()
}

/// Parse a 12-hour clock string such as `4:50PM` or `4:50 pm`.
///
/// Embedded whitespace is removed and the meridiem is case-insensitive, so
/// callers may pass tokens straight from a regex capture.
pub fn parse_12_hour(time12h: &str) -> Result<NaiveTime, ExtractionError> {
    let compact: String = time12h
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let caps = TIME_12H.captures(&compact).ok_or_else(|| malformed(time12h, "expected H:MM followed by AM or PM"))?;

    let hour: u32 = caps[1].parse().map_err(|_| malformed(time12h, "hour is not a number"))?;
    let minute: u32 = caps[2].parse().map_err(|_| malformed(time12h, "minute is not a number"))?;

    if !(1..=12).contains(&hour) {
        return Err(malformed(time12h, "hour must be between 1 and 12"));
    }

    // 12 counts as 0 before the PM offset is applied
    let hour = hour % 12;
    let hour = if &caps[3] == "PM" { hour + 12 } else { hour };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| malformed(time12h, "minute must be below 60"))
}

/// Convert a 12-hour clock string to 24-hour `HH:MM`
pub fn to_24_hour(time12h: &str) -> Result<String, ExtractionError> {
    Ok(parse_12_hour(time12h)?.format("%H:%M").to_string())
}

/// Render a time the way advising slips print it, e.g. `4:50PM`
pub fn to_12_hour(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{}:{:02}{}", hour, time.minute(), if pm { "PM" } else { "AM" })
}

/// Minutes between two times; zero or negative is the caller's problem
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// Minutes since midnight, for placing an event on a day grid
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Expand one schedule token set into events, one per recognized day.
///
/// Fails when either time is malformed or the range does not move forward.
pub fn build_events(
    course_code: &str,
    day_codes: &str,
    start12h: &str,
    end12h: &str,
    room: &str,
    tuition: Option<&str>,
) -> Result<Vec<ScheduleEvent>, ExtractionError> {
    let start = parse_12_hour(start12h)?;
    let end = parse_12_hour(end12h)?;

    if start >= end {
        return Err(malformed(
            &format!("{}-{}", start12h, end12h),
            "end time is not after start time",
        ));
    }

    Ok(expand_day_codes(day_codes)
        .into_iter()
        .filter_map(|day| ScheduleEvent::new(course_code, day, start, end, room))
        .map(|event| event.with_tuition(tuition.map(str::to_string)))
        .collect())
}

fn malformed(input: &str, reason: &str) -> ExtractionError {
    ExtractionError::MalformedTime {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_single_codes_expand_to_one_day() {
        assert_eq!(expand_day_codes("S"), vec![Day::Sunday]);
        assert_eq!(expand_day_codes("M"), vec![Day::Monday]);
        assert_eq!(expand_day_codes("T"), vec![Day::Tuesday]);
        assert_eq!(expand_day_codes("W"), vec![Day::Wednesday]);
        assert_eq!(expand_day_codes("R"), vec![Day::Thursday]);
        assert_eq!(expand_day_codes("F"), vec![Day::Friday]);
        assert_eq!(expand_day_codes("A"), vec![Day::Saturday]);
    }

    #[test]
    fn test_runs_keep_order_and_length() {
        assert_eq!(expand_day_codes("MW"), vec![Day::Monday, Day::Wednesday]);
        assert_eq!(expand_day_codes("TR"), vec![Day::Tuesday, Day::Thursday]);
        assert_eq!(expand_day_codes("SMTWRFA").len(), 7);
        assert_eq!(expand_day_codes("SMTWRFA"), Day::ALL.to_vec());
    }

    #[test]
    fn test_unknown_codes_are_dropped() {
        assert_eq!(expand_day_codes("MXW"), vec![Day::Monday, Day::Wednesday]);
        assert_eq!(expand_day_codes("m1F."), vec![Day::Friday]);
        assert!(expand_day_codes("").is_empty());
    }

    #[test]
    fn test_time_boundaries() {
        assert_eq!(to_24_hour("12:00AM").unwrap(), "00:00");
        assert_eq!(to_24_hour("12:00PM").unwrap(), "12:00");
        assert_eq!(to_24_hour("1:05PM").unwrap(), "13:05");
        assert_eq!(to_24_hour("11:59AM").unwrap(), "11:59");
        assert_eq!(to_24_hour("4:50PM").unwrap(), "16:50");
        assert_eq!(to_24_hour("08:00AM").unwrap(), "08:00");
    }

    #[test]
    fn test_time_accepts_embedded_whitespace() {
        assert_eq!(to_24_hour(" 4:50 PM ").unwrap(), "16:50");
        assert_eq!(to_24_hour("10:10am").unwrap(), "10:10");
    }

    #[test]
    fn test_malformed_times() {
        for input in ["", "4:50", "450PM", "13:00PM", "0:30AM", "4:75PM", "4:5PM", "noon"] {
            let err = to_24_hour(input).unwrap_err();
            assert!(
                matches!(err, ExtractionError::MalformedTime { .. }),
                "expected MalformedTime for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_to_12_hour_round_trips_display() {
        assert_eq!(to_12_hour(at(0, 0)), "12:00AM");
        assert_eq!(to_12_hour(at(12, 0)), "12:00PM");
        assert_eq!(to_12_hour(at(16, 50)), "4:50PM");
        assert_eq!(to_24_hour(&to_12_hour(at(9, 5))).unwrap(), "09:05");
    }

    #[test]
    fn test_duration_and_position() {
        assert_eq!(duration_minutes(at(16, 50), at(18, 20)), 90);
        assert_eq!(duration_minutes(at(10, 0), at(9, 0)), -60);
        assert_eq!(minutes_since_midnight(at(8, 30)), 510);
    }

    #[test]
    fn test_build_events_multi_day() {
        let events = build_events("CSE101", "MWF", "9:00AM", "10:00AM", "AB3-302", None).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.iter().map(|e| e.day).collect::<Vec<_>>(),
            vec![Day::Monday, Day::Wednesday, Day::Friday]
        );
        assert!(events.iter().all(|e| e.start_time == at(9, 0) && e.end_time == at(10, 0)));
        assert!(events.iter().all(|e| e.room == "AB3-302" && e.tuition.is_none()));
    }

    #[test]
    fn test_build_events_rejects_backwards_range() {
        let err = build_events("CSE101", "M", "10:00AM", "9:00AM", "", None).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedTime { .. }));
    }
}
