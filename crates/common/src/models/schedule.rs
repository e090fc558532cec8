//! Weekly schedule event model

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week a course meets on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All days in calendar order, starting on Sunday
    pub const ALL: [Day; 7] = [
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Map a single advising-slip day code to its day.
    ///
    /// Thursday is `R` and Saturday is `A` so neither collides with
    /// `T` (Tuesday) or `S` (Sunday).
    pub fn from_code(code: char) -> Option<Day> {
        match code {
            'S' => Some(Day::Sunday),
            'M' => Some(Day::Monday),
            'T' => Some(Day::Tuesday),
            'W' => Some(Day::Wednesday),
            'R' => Some(Day::Thursday),
            'F' => Some(Day::Friday),
            'A' => Some(Day::Saturday),
            _ => None,
        }
    }

    /// Single-letter code used on advising slips
    pub fn code(&self) -> char {
        match self {
            Day::Sunday => 'S',
            Day::Monday => 'M',
            Day::Tuesday => 'T',
            Day::Wednesday => 'W',
            Day::Thursday => 'R',
            Day::Friday => 'F',
            Day::Saturday => 'A',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Day::Sunday => "Sunday",
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One weekly meeting of a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    /// Whitespace-collapsed course identifier, e.g. `ICE109` or `ICE109 Lab`
    pub course_code: String,

    pub day: Day,

    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,

    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,

    /// Room label, empty when unknown
    pub room: String,

    /// Tuition figure printed beside the schedule, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuition: Option<String>,
}

impl ScheduleEvent {
    /// Build an event, returning `None` when the course code is blank or the
    /// time range does not move forward within the day.
    pub fn new(
        course_code: &str,
        day: Day,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room: &str,
    ) -> Option<Self> {
        let course_code = collapse_whitespace(course_code);
        if course_code.is_empty() || start_time >= end_time {
            return None;
        }

        Some(Self {
            course_code,
            day,
            start_time,
            end_time,
            room: room.trim().to_string(),
            tuition: None,
        })
    }

    pub fn with_tuition(mut self, tuition: Option<String>) -> Self {
        self.tuition = tuition;
        self
    }

    /// Start time rendered as `HH:MM`
    pub fn start_hhmm(&self) -> String {
        self.start_time.format(hhmm::FORMAT).to_string()
    }

    /// End time rendered as `HH:MM`
    pub fn end_hhmm(&self) -> String {
        self.end_time.format(hhmm::FORMAT).to_string()
    }
}

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Serde adapter for 24-hour `HH:MM` strings
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_day_codes_are_inverse() {
        for day in Day::ALL {
            assert_eq!(Day::from_code(day.code()), Some(day));
        }
        assert_eq!(Day::from_code('X'), None);
        assert_eq!(Day::from_code('m'), None);
    }

    #[test]
    fn test_event_rejects_backwards_range() {
        assert!(ScheduleEvent::new("CSE101", Day::Monday, at(10, 0), at(9, 0), "").is_none());
        assert!(ScheduleEvent::new("CSE101", Day::Monday, at(9, 0), at(9, 0), "").is_none());
        assert!(ScheduleEvent::new("   ", Day::Monday, at(9, 0), at(10, 0), "").is_none());
    }

    #[test]
    fn test_event_collapses_course_code() {
        let event = ScheduleEvent::new("ICE109   Lab", Day::Sunday, at(8, 0), at(10, 0), " 449 ").unwrap();
        assert_eq!(event.course_code, "ICE109 Lab");
        assert_eq!(event.room, "449");
    }

    #[test]
    fn test_event_json_shape() {
        let event = ScheduleEvent::new("ENG7102", Day::Monday, at(16, 50), at(18, 20), "221")
            .unwrap()
            .with_tuition(Some("15000.00".to_string()));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["courseCode"], "ENG7102");
        assert_eq!(json["day"], "Monday");
        assert_eq!(json["startTime"], "16:50");
        assert_eq!(json["endTime"], "18:20");
        assert_eq!(json["room"], "221");
        assert_eq!(json["tuition"], "15000.00");

        let back: ScheduleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
