//! Structured multi-line association for advising-slip text
//!
//! Text linearized from a PDF or an image loses the slip's table layout:
//! the course code, the tuition/day/time line and the room land on separate
//! lines. Three passes catalog every line that looks like a course, a
//! schedule or a room. Each schedule is then owned by the nearest course
//! above it and takes the nearest room within a bounded window.

use crate::diagnostics::Diagnostics;
use crate::normalizer::build_events;
use crate::text_line::lines;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use routine_common::models::{collapse_whitespace, ScheduleEvent};

const STAGE: &str = "structured";

/// Default maximum line distance between a schedule and its room
pub const DEFAULT_ROOM_WINDOW: usize = 10;

// Course code shapes
static CODE_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,4}\d{3,4}$").expect("valid pattern"));
static CODE_SPACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z]{2,4})\s+(\d{3,4})$").expect("valid pattern"));
static CODE_LAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,4}\d{3,4}\s+Lab$").expect("valid pattern"));

// Schedule shapes
/// `15000.00 MW 4:50PM-6:20PM`
static SCHEDULE_TUITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+\.\d+)\s+([SMTWRFA]+)\s+(\d{1,2}:\d{2}[AP]M)-(\d{1,2}:\d{2}[AP]M)$").expect("valid pattern")
});
/// `S 8:00AM-10:00AM`
static SCHEDULE_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([SMTWRFA])\s+(\d{1,2}:\d{2}[AP]M)-(\d{1,2}:\d{2}[AP]M)$").expect("valid pattern")
});

// Room shape and exclusions
/// `221`, `AB3-302`, `FUB-801`
static ROOM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Z]*\d+[A-Z]*-?\d*|[A-Z]+-\d+)$").expect("valid pattern")
});
/// Student-ID shape such as `2021-1-60-123`
static DASHED_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+-\d+-\d+-\d+$").expect("valid pattern"));
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("valid pattern"));

const ROOM_HEADER_WORDS: [&str; 2] = ["Room", "Remarks"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCandidate {
    pub line_index: usize,
    pub course_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCandidate {
    pub line_index: usize,
    pub day_codes: String,
    pub start12h: String,
    pub end12h: String,
    pub tuition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCandidate {
    pub line_index: usize,
    pub room: String,
}

/// Recognize a course-code line and return its canonical code
pub fn classify_course(line: &str) -> Option<String> {
    if CODE_BARE.is_match(line) {
        return Some(line.to_string());
    }
    if let Some(caps) = CODE_SPACED.captures(line) {
        return Some(format!("{}{}", &caps[1], &caps[2]));
    }
    if CODE_LAB.is_match(line) {
        // The suffix is part of the identity: `XYZ101 Lab` != `XYZ101`
        return Some(collapse_whitespace(line));
    }
    None
}

/// Recognize a schedule line, tuition-bearing form first
pub fn classify_schedule(line: &str, line_index: usize) -> Option<ScheduleCandidate> {
    if let Some(caps) = SCHEDULE_TUITION.captures(line) {
        return Some(ScheduleCandidate {
            line_index,
            day_codes: caps[2].to_string(),
            start12h: caps[3].to_string(),
            end12h: caps[4].to_string(),
            tuition: Some(caps[1].to_string()),
        });
    }
    SCHEDULE_BARE.captures(line).map(|caps| ScheduleCandidate {
        line_index,
        day_codes: caps[1].to_string(),
        start12h: caps[2].to_string(),
        end12h: caps[3].to_string(),
        tuition: None,
    })
}

/// Recognize a room token line
pub fn is_room(line: &str) -> bool {
    ROOM.is_match(line)
        && !line.contains('.')
        && !DASHED_ID.is_match(line)
        && !ROOM_HEADER_WORDS.contains(&line)
        && !DECIMAL.is_match(line)
}

/// The three candidate catalogs for one text blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub courses: Vec<CourseCandidate>,
    pub schedules: Vec<ScheduleCandidate>,
    pub rooms: Vec<RoomCandidate>,
}

impl Catalog {
    /// Run the three classification passes over trimmed, non-empty lines
    pub fn build(lines: &[&str]) -> Self {
        let courses: Vec<CourseCandidate> = lines
            .iter()
            .enumerate()
            .filter_map(|(line_index, line)| {
                classify_course(line).map(|course_code| CourseCandidate { line_index, course_code })
            })
            .collect();

        let schedules = lines
            .iter()
            .enumerate()
            .filter_map(|(line_index, line)| classify_schedule(line, line_index))
            .collect();

        // A bare code like ENG7102 also fits the room shape; course lines win
        let rooms = lines
            .iter()
            .enumerate()
            .filter(|(line_index, line)| {
                is_room(line) && !courses.iter().any(|c| c.line_index == *line_index)
            })
            .map(|(line_index, line)| RoomCandidate {
                line_index,
                room: line.to_string(),
            })
            .collect();

        Self { courses, schedules, rooms }
    }

    /// Nearest course strictly above `line_index`.
    ///
    /// On equal distance the earliest cataloged candidate is kept.
    pub fn owning_course(&self, line_index: usize) -> Option<&CourseCandidate> {
        let mut best: Option<&CourseCandidate> = None;
        for course in self.courses.iter().filter(|c| c.line_index < line_index) {
            let closer = best.map_or(true, |b| course.line_index > b.line_index);
            if closer {
                best = Some(course);
            }
        }
        best
    }

    /// Nearest room within `window` lines of `line_index`.
    ///
    /// On equal distance a room below the schedule beats one above it.
    pub fn nearest_room(&self, line_index: usize, window: usize) -> Option<&RoomCandidate> {
        self.rooms
            .iter()
            .filter(|r| r.line_index != line_index && r.line_index.abs_diff(line_index) <= window)
            .min_by_key(|r| (r.line_index.abs_diff(line_index), r.line_index < line_index))
    }
}

/// Associate schedules with courses and rooms and emit events
pub fn extract(text: &str, room_window: usize, diagnostics: &mut Diagnostics) -> Vec<ScheduleEvent> {
    let lines = lines(text);
    let catalog = Catalog::build(&lines);

    diagnostics.debug(
        STAGE,
        format!(
            "cataloged {} course, {} schedule, {} room lines",
            catalog.courses.len(),
            catalog.schedules.len(),
            catalog.rooms.len()
        ),
    );

    let mut events = Vec::new();

    for schedule in &catalog.schedules {
        let Some(course) = catalog.owning_course(schedule.line_index) else {
            diagnostics.warn(
                STAGE,
                format!("schedule at line {} has no course above it, discarded", schedule.line_index),
            );
            continue;
        };

        let room = catalog
            .nearest_room(schedule.line_index, room_window)
            .map(|r| r.room.as_str())
            .unwrap_or("");

        match build_events(
            &course.course_code,
            &schedule.day_codes,
            &schedule.start12h,
            &schedule.end12h,
            room,
            schedule.tuition.as_deref(),
        ) {
            Ok(schedule_events) => {
                diagnostics.debug(
                    STAGE,
                    format!(
                        "line {} -> {} (line {}), room '{}', {} days",
                        schedule.line_index,
                        course.course_code,
                        course.line_index,
                        room,
                        schedule_events.len()
                    ),
                );
                events.extend(schedule_events);
            }
            Err(e) => diagnostics.warn(STAGE, format!("line {}: {}, skipped", schedule.line_index, e)),
        }
    }

    diagnostics.info(STAGE, format!("{} events from multi-line association", events.len()));
    events
}
