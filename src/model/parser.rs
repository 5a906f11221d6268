// File: src/model/parser.rs
// Turns time-bearing cell text into a wall-clock interval.
use crate::model::time::{TimeInterval, WallTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Minutes are restricted to 00-59 so `8:75` never becomes an anchor.
static CLOCK_CAPTURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})[:：]([0-5][0-9])").expect("clock capture pattern"));

static PERIOD_CAPTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)第?\s*([0-9]+)\s*節|\bperiod\s*([0-9]+)\b|\b([0-9]+)(?:st|nd|rd|th)\s+period\b")
        .expect("period capture pattern")
});

/// First lesson of the day for period-numbered schedules.
pub const FIRST_PERIOD_START: WallTime = WallTime::new(8, 0);

fn clock_anchors(text: &str) -> impl Iterator<Item = WallTime> + '_ {
    CLOCK_CAPTURE_RE.captures_iter(text).filter_map(|caps| {
        let hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let minute = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some(WallTime::new(hour, minute))
    })
}

/// Ordinal period number (`period 3`, `3rd period`, `第3節`), if present.
pub fn period_number(text: &str) -> Option<u32> {
    let caps = PERIOD_CAPTURE_RE.captures(text)?;
    let digits = caps.get(1).or(caps.get(2)).or(caps.get(3))?;
    digits.as_str().parse::<u32>().ok()
}

/// Parses a time range out of a schedule cell.
///
/// - two or more clock times: the first two are start and end
/// - one clock time: start, with an end one hour later (hour + 1, may pass 23)
/// - an ordinal period N: one-hour slot starting at 08:00 + (N - 1) hours
/// - otherwise `None`
pub fn parse_time_range(text: &str) -> Option<TimeInterval> {
    let mut anchors = clock_anchors(text);
    if let Some(start) = anchors.next() {
        let end = anchors.next().unwrap_or_else(|| start.plus_one_hour());
        return Some(TimeInterval::new(start, end));
    }

    let period = period_number(text)?;
    if period == 0 {
        return None;
    }
    let start = WallTime::new(
        FIRST_PERIOD_START.hour.saturating_add(period - 1),
        FIRST_PERIOD_START.minute,
    );
    Some(TimeInterval::new(start, start.plus_one_hour()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(text: &str) -> Option<String> {
        parse_time_range(text).map(|i| i.to_string())
    }

    #[test]
    fn test_two_anchors() {
        assert_eq!(interval("8:25~10:05").as_deref(), Some("08:25~10:05"));
        assert_eq!(interval("08:25 - 09:05 (break) 09:10").as_deref(), Some("08:25~09:05"));
    }

    #[test]
    fn test_single_anchor_adds_an_hour() {
        assert_eq!(interval("14:00").as_deref(), Some("14:00~15:00"));
        assert_eq!(interval("starts 9:30").as_deref(), Some("09:30~10:30"));
    }

    #[test]
    fn test_single_anchor_overflow_not_clamped() {
        let parsed = parse_time_range("23:40").unwrap();
        assert_eq!(parsed.to_string(), "23:40~24:40");
        assert!(parsed.overflows_day());
    }

    #[test]
    fn test_full_width_colon() {
        assert_eq!(interval("08：25～09：05").as_deref(), Some("08:25~09:05"));
    }

    #[test]
    fn test_periods() {
        assert_eq!(interval("第1節").as_deref(), Some("08:00~09:00"));
        assert_eq!(interval("Period 3").as_deref(), Some("10:00~11:00"));
        assert_eq!(interval("4th period").as_deref(), Some("11:00~12:00"));
        assert_eq!(interval("period 0"), None);
    }

    #[test]
    fn test_clock_beats_period() {
        assert_eq!(interval("第2節 09:15~10:05").as_deref(), Some("09:15~10:05"));
    }

    #[test]
    fn test_no_interval() {
        assert_eq!(interval("morning"), None);
        assert_eq!(interval("8:75"), None);
        assert_eq!(interval(""), None);
    }

    #[test]
    fn test_parse_is_idempotent_on_rendered_output() {
        for text in ["8:25~10:05", "14:00", "23:40", "第5節", "7:05 9:00"] {
            let first = parse_time_range(text).unwrap();
            let second = parse_time_range(&first.to_string()).unwrap();
            assert_eq!(first, second, "not idempotent for '{}'", text);
        }
    }
}
