// File: src/model/time.rs
// Wall-clock times and intervals used by the time axis and the run merger.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("malformed time value '{0}' (expected HH:MM)")]
    Malformed(String),
}

/// A time of day as written in a schedule.
///
/// Hours are not bounded to 0..=23: an inferred end time may run past
/// midnight (`24:40`) and is kept as authored. Ordering is by hour then
/// minute, which matches string ordering of zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
}

impl WallTime {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Same minute, next hour. Not clamped.
    pub fn plus_one_hour(self) -> Self {
        Self::new(self.hour.saturating_add(1), self.minute)
    }

    pub fn total_minutes(self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    /// True when the hour lies beyond the calendar day.
    pub fn is_past_midnight(self) -> bool {
        self.hour >= 24
    }

    /// Strict `H:MM` / `HH:MM` parse.
    pub fn parse(value: &str) -> Result<Self, TimeError> {
        let malformed = || TimeError::Malformed(value.to_string());
        let (h, m) = value.trim().split_once(':').ok_or_else(malformed)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(malformed());
        }
        let hour = h.parse::<u32>().map_err(|_| malformed())?;
        let minute = m.parse::<u32>().map_err(|_| malformed())?;
        if minute > 59 {
            return Err(malformed());
        }
        Ok(Self::new(hour, minute))
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for WallTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        WallTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Minutes since midnight for an `HH:MM` string.
///
/// Callers decide what to do with a malformed value; the run merger
/// substitutes zero and reports a warning unless told to be strict.
pub fn time_to_minutes(value: &str) -> Result<i64, TimeError> {
    WallTime::parse(value).map(WallTime::total_minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: WallTime,
    pub end: WallTime,
}

impl TimeInterval {
    pub const fn new(start: WallTime, end: WallTime) -> Self {
        Self { start, end }
    }

    /// An interval whose end was synthesised past the end of the day.
    pub fn overflows_day(&self) -> bool {
        self.end.is_past_midnight()
    }

    /// Smallest interval covering both.
    pub fn union(self, other: TimeInterval) -> TimeInterval {
        TimeInterval::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_to_minutes() {
        assert_eq!(time_to_minutes("08:25"), Ok(505));
        assert_eq!(time_to_minutes("8:05"), Ok(485));
        assert_eq!(time_to_minutes(" 14:00 "), Ok(840));
    }

    #[test]
    fn test_time_to_minutes_rejects_garbage() {
        for bad in ["", "noon", "8", "8:5", "08:60", "123:00", "ab:cd"] {
            assert!(
                matches!(time_to_minutes(bad), Err(TimeError::Malformed(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_ordering_matches_padded_strings() {
        let early = WallTime::new(9, 5);
        let late = WallTime::new(10, 0);
        assert!(early < late);
        assert!(early.to_string() < late.to_string());
    }

    #[test]
    fn test_overflow_is_kept() {
        let end = WallTime::new(23, 40).plus_one_hour();
        assert_eq!(end.to_string(), "24:40");
        assert!(TimeInterval::new(WallTime::new(23, 40), end).overflows_day());
    }
}
