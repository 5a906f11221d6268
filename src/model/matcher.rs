// File: src/model/matcher.rs
// Ordered predicates deciding whether a cell's text describes a time slot.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{1,2}[:：][0-9]{2}").expect("clock pattern"));

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)第?\s*[0-9]+\s*節|\bperiod\s*[0-9]+\b|\b[0-9]+(?:st|nd|rd|th)\s+period\b")
        .expect("period pattern")
});

static DAY_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)上午|下午|早上|中午|晚上|\b(?:morning|noon|afternoon|evening)\b")
        .expect("day part pattern")
});

/// Kinds of time-bearing cell text, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TimeCellKind {
    /// `8:25`, `08:25~09:05`, `08：25`
    Clock,
    /// `period 3`, `3rd period`, `第3節`
    OrdinalPeriod,
    /// morning, afternoon, ...
    DayPart,
}

impl TimeCellKind {
    pub fn matches(self, text: &str) -> bool {
        match self {
            TimeCellKind::Clock => CLOCK_RE.is_match(text),
            TimeCellKind::OrdinalPeriod => PERIOD_RE.is_match(text),
            TimeCellKind::DayPart => DAY_PART_RE.is_match(text),
        }
    }
}

/// First matcher that accepts `text`, if any.
pub fn classify(text: &str) -> Option<TimeCellKind> {
    TimeCellKind::iter().find(|kind| kind.matches(text))
}

pub fn is_time_cell(text: &str) -> bool {
    classify(text).is_some()
}
