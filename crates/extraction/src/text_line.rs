//! Single-line pattern extraction for PDF/OCR text
//!
//! Each line is tried against an ordered list of patterns, strictest first.
//! The first pattern that matches owns the line.

use crate::diagnostics::Diagnostics;
use crate::normalizer::build_events;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use routine_common::models::{collapse_whitespace, ScheduleEvent};

const STAGE: &str = "line-pattern";

/// A named line shape with `code`, `days`, `start` and `end` groups
pub struct LinePattern {
    pub name: &'static str,
    regex: Regex,
}

impl LinePattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("valid line pattern"),
        }
    }
}

/// Tokens captured from one matching line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub pattern: &'static str,
    pub course_code: String,
    pub day_codes: String,
    pub start12h: String,
    pub end12h: String,
}

/// Patterns in the order they are tried
pub static LINE_PATTERNS: Lazy<Vec<LinePattern>> = Lazy::new(|| {
    vec![
        // CSE101 MW 9:00AM-10:00AM
        LinePattern::new(
            "exact",
            r"^(?P<code>[A-Z]{2,4}\d{3,4}(?:\s+Lab)?)\s+(?P<days>[SMTWRFA]+)\s+(?P<start>\d{1,2}:\d{2}[AP]M)-(?P<end>\d{1,2}:\d{2}[AP]M)$",
        ),
        // CSE 101  MW  9:00 AM - 10:00 AM  AB3-302
        LinePattern::new(
            "spaced",
            r"^(?P<code>[A-Z]{2,4}\s*\d{3,4}(?:\s+Lab)?)\s+(?P<days>[SMTWRFA]+)\s+(?P<start>\d{1,2}:\d{2}\s*[AP]M)\s*[-–]\s*(?P<end>\d{1,2}:\d{2}\s*[AP]M)",
        ),
        // 2 CSE101L Sec 3 MW 9:00AM - 10:00AM (tokens anywhere on the line)
        LinePattern::new(
            "loose",
            r"(?P<code>[A-Z]{2,5}\s?\d{3,4}[A-Z]?(?:\s+Lab)?)\b.*?\b(?P<days>[SMTWRFA]{1,7})\s+(?P<start>\d{1,2}:\d{2}\s*[AP]M)\s*[-–]\s*(?P<end>\d{1,2}:\d{2}\s*[AP]M)",
        ),
    ]
});

static SPACED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]{2,5})\s+(\d.*)$").expect("valid spaced code pattern")
});

/// Canonical course code: letters joined to digits, whitespace collapsed
pub fn canonical_course_code(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    match SPACED_CODE.captures(&collapsed) {
        Some(caps) => format!("{}{}", &caps[1], &caps[2]),
        None => collapsed,
    }
}

/// Try every pattern on one trimmed line, first match wins
pub fn match_line(line: &str) -> Option<LineMatch> {
    LINE_PATTERNS.iter().find_map(|pattern| {
        pattern.regex.captures(line).map(|caps| LineMatch {
            pattern: pattern.name,
            course_code: canonical_course_code(&caps["code"]),
            day_codes: caps["days"].to_string(),
            start12h: caps["start"].to_string(),
            end12h: caps["end"].to_string(),
        })
    })
}

/// Split a text blob into trimmed, non-empty lines
pub fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Extract events from lines that carry course, days and times together.
///
/// Room association is not attempted here; every event has an empty room.
pub fn extract(text: &str, diagnostics: &mut Diagnostics) -> Vec<ScheduleEvent> {
    let mut events = Vec::new();

    for (index, line) in lines(text).into_iter().enumerate() {
        let Some(found) = match_line(line) else {
            continue;
        };

        match build_events(&found.course_code, &found.day_codes, &found.start12h, &found.end12h, "", None) {
            Ok(line_events) => {
                diagnostics.debug(
                    STAGE,
                    format!(
                        "line {} matched '{}' pattern: {} x{}",
                        index,
                        found.pattern,
                        found.course_code,
                        line_events.len()
                    ),
                );
                events.extend(line_events);
            }
            Err(e) => diagnostics.warn(STAGE, format!("line {}: {}, skipped", index, e)),
        }
    }

    diagnostics.info(STAGE, format!("{} events from single-line patterns", events.len()));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use routine_common::models::Day;

    #[test]
    fn test_exact_pattern_wins_first() {
        let found = match_line("CSE101 MW 9:00AM-10:00AM").unwrap();
        assert_eq!(found.pattern, "exact");
        assert_eq!(found.course_code, "CSE101");
        assert_eq!(found.day_codes, "MW");
        assert_eq!(found.start12h, "9:00AM");
        assert_eq!(found.end12h, "10:00AM");
    }

    #[test]
    fn test_spaced_code_is_canonicalized() {
        let found = match_line("ICE 109  TR  10:10 AM - 11:40 AM  AB3-302").unwrap();
        assert_eq!(found.pattern, "spaced");
        assert_eq!(found.course_code, "ICE109");
        assert_eq!(found.day_codes, "TR");
    }

    #[test]
    fn test_lab_suffix_survives() {
        let found = match_line("PHY109 Lab A 4:50PM-6:50PM").unwrap();
        assert_eq!(found.course_code, "PHY109 Lab");
        assert_eq!(found.day_codes, "A");
    }

    #[test]
    fn test_loose_pattern_finds_tokens_mid_line() {
        let found = match_line("2 MAT102 Sec 4 3.0 TR 11:50AM-1:20PM").unwrap();
        assert_eq!(found.pattern, "loose");
        assert_eq!(found.course_code, "MAT102");
        assert_eq!(found.day_codes, "TR");
    }

    #[test]
    fn test_loose_pattern_keeps_lab_suffix() {
        let found = match_line("2 ICE109 Lab Sec 1 S 8:00AM-10:00AM").unwrap();
        assert_eq!(found.pattern, "loose");
        assert_eq!(found.course_code, "ICE109 Lab");
        assert_eq!(found.day_codes, "S");
    }

    #[test]
    fn test_loose_lab_line_stays_apart_from_lecture() {
        let text = "1 ICE109 Sec 1 MW 9:00AM-10:00AM\n2 ICE109 Lab Sec 1 S 8:00AM-10:00AM";
        let events = extract(text, &mut Diagnostics::new());

        let codes: Vec<_> = events.iter().map(|e| e.course_code.as_str()).collect();
        assert_eq!(codes, ["ICE109", "ICE109", "ICE109 Lab"]);
        assert_eq!(events[2].day, Day::Sunday);
    }

    #[test]
    fn test_unmatched_lines_are_ignored() {
        assert!(match_line("Advising Slip").is_none());
        assert!(match_line("15000.00 MW 4:50PM-6:20PM").is_none());
        assert!(match_line("ENG7102").is_none());
    }

    #[test]
    fn test_extract_emits_one_event_per_day_without_room() {
        let text = "Student: 2021-1-60-123\nCSE101 MW 9:00AM-10:00AM\n\n   ICE109 Lab S 8:00AM-10:00AM  \nTotal 3";
        let events = extract(text, &mut Diagnostics::new());

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].day, Day::Monday);
        assert_eq!(events[1].day, Day::Wednesday);
        assert_eq!(events[2].course_code, "ICE109 Lab");
        assert_eq!(events[2].day, Day::Sunday);
        assert!(events.iter().all(|e| e.room.is_empty()));
    }

    #[test]
    fn test_bad_time_skips_line() {
        let text = "CSE101 MW 10:00AM-9:00AM\nMAT102 TR 11:50AM-1:20PM";
        let events = extract(text, &mut Diagnostics::new());
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.course_code == "MAT102"));
    }
}
