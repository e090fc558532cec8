//! Completeness scoring for an extracted event list

use routine_common::models::ScheduleEvent;

/// Below this score a result is flagged for human review
pub const DEFAULT_VERIFICATION_THRESHOLD: u8 = 70;

const EVENT_POINTS: usize = 10;
const EVENT_CAP: usize = 50;
const SCHEDULE_POINTS: f64 = 30.0;
const ROOM_POINTS: f64 = 20.0;

/// Room values that only hold a cell's place
const ROOM_PLACEHOLDERS: [&str; 5] = ["", "TBA", "TBD", "N/A", "-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confidence {
    pub score: u8,
    pub needs_verification: bool,
}

pub fn is_placeholder_room(room: &str) -> bool {
    let room = room.trim();
    ROOM_PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(room))
}

/// A schedule is well formed when it spans a positive stretch of one day.
///
/// `ScheduleEvent::new` already rejects `start >= end`, so every event built
/// through it passes and the schedule signal is full for typed input.
fn has_schedule(event: &ScheduleEvent) -> bool {
    event.start_time < event.end_time
}

/// Score `events` from 0 to 100.
///
/// `input_size` is the acquired text length, or the data row count for a
/// spreadsheet; with nothing to read there is nothing to trust.
pub fn score(events: &[ScheduleEvent], input_size: usize) -> u8 {
    if events.is_empty() || input_size == 0 {
        return 0;
    }

    let count = events.len();
    let count_signal = (count * EVENT_POINTS).min(EVENT_CAP) as f64;

    let scheduled = events.iter().filter(|e| has_schedule(e)).count();
    let schedule_signal = (SCHEDULE_POINTS * scheduled as f64 / count as f64).round();

    let roomed = events.iter().filter(|e| !is_placeholder_room(&e.room)).count();
    let room_signal = (ROOM_POINTS * roomed as f64 / count as f64).round();

    (count_signal + schedule_signal + room_signal).min(100.0) as u8
}

/// Score and apply the verification policy
pub fn estimate(events: &[ScheduleEvent], input_size: usize, threshold: u8) -> Confidence {
    let score = score(events, input_size);
    Confidence {
        score,
        needs_verification: score < threshold || events.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use routine_common::models::Day;

    fn event(room: &str) -> ScheduleEvent {
        ScheduleEvent::new(
            "CSE101",
            Day::Monday,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            room,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_result_needs_verification() {
        let confidence = estimate(&[], 500, DEFAULT_VERIFICATION_THRESHOLD);
        assert_eq!(confidence.score, 0);
        assert!(confidence.needs_verification);
    }

    #[test]
    fn test_full_slip_scores_high() {
        let events: Vec<_> = (0..6).map(|_| event("AB3-302")).collect();
        let confidence = estimate(&events, 800, DEFAULT_VERIFICATION_THRESHOLD);
        assert_eq!(confidence.score, 100);
        assert!(!confidence.needs_verification);
    }

    #[test]
    fn test_missing_rooms_lower_score() {
        let events: Vec<_> = (0..4).map(|_| event("")).collect();
        // 40 events + 30 schedule + 0 rooms
        assert_eq!(score(&events, 300), 70);

        let half: Vec<_> = vec![event("221"), event("TBA"), event("449"), event("")];
        assert_eq!(score(&half, 300), 80);
    }

    #[test]
    fn test_few_events_need_verification() {
        let confidence = estimate(&[event("")], 40, DEFAULT_VERIFICATION_THRESHOLD);
        assert_eq!(confidence.score, 40);
        assert!(confidence.needs_verification);
    }

    #[test]
    fn test_roomed_event_never_scores_below_roomless() {
        for n in 0..8 {
            let base: Vec<_> = (0..n).map(|i| event(if i % 2 == 0 { "221" } else { "" })).collect();

            let mut with_room = base.clone();
            with_room.push(event("AB3-401"));
            let mut without_room = base;
            without_room.push(event(""));

            assert!(score(&with_room, 100) >= score(&without_room, 100), "n = {}", n);
        }
    }

    #[test]
    fn test_typed_events_always_carry_a_schedule() {
        let events = vec![event("221"), event("")];
        assert!(events.iter().all(has_schedule));

        let backwards = ScheduleEvent::new(
            "CSE101",
            Day::Monday,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            "221",
        );
        assert!(backwards.is_none());
    }

    #[test]
    fn test_placeholder_rooms() {
        for room in ["", "  ", "TBA", "tbd", "N/A", "-"] {
            assert!(is_placeholder_room(room), "{:?}", room);
        }
        assert!(!is_placeholder_room("221"));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let events: Vec<_> = (0..4).map(|_| event("")).collect();
        assert!(!estimate(&events, 300, 70).needs_verification);
        assert!(estimate(&events, 300, 80).needs_verification);
    }
}
