// File: src/model/event.rs
use serde::{Deserialize, Serialize};

fn default_start_time() -> String {
    "09:00".to_string()
}
fn default_end_time() -> String {
    "18:00".to_string()
}

/// A dated, timed schedule entry.
///
/// Dates are `YYYY-MM-DD` and times `HH:MM`, kept as the strings the
/// extraction step produced so that sorting is plain string ordering and a
/// malformed value can be reported instead of rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub title: String,
    pub start_date: String,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Unverified output of the extraction step.
pub type CandidateEvent = ScheduleEvent;
/// Output of run merging, ready for a calendar target.
pub type FinalEvent = ScheduleEvent;

impl ScheduleEvent {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        let date = date.into();
        Self {
            title: title.into(),
            start_date: date.clone(),
            start_time: start_time.into(),
            end_date: date,
            end_time: end_time.into(),
            description: None,
            location: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Merge key: the title without surrounding whitespace.
    pub fn key(&self) -> &str {
        self.title.trim()
    }

    /// Fills in what the extraction step is allowed to leave out.
    pub fn normalized(mut self) -> Self {
        if self.end_date.trim().is_empty() {
            self.end_date = self.start_date.clone();
        }
        if self.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            self.description = None;
        }
        if self.location.as_deref().is_some_and(|l| l.trim().is_empty()) {
            self.location = None;
        }
        self
    }

    /// One-line rendering for logs and summaries.
    pub fn brief(&self) -> String {
        format!(
            "{} - {} {}-{}",
            self.title, self.start_date, self.start_time, self.end_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_defaults() {
        let raw = r#"{"title": "Assembly", "start_date": "2024-12-20"}"#;
        let event: ScheduleEvent = serde_json::from_str(raw).unwrap();
        let event = event.normalized();
        assert_eq!(event.start_time, "09:00");
        assert_eq!(event.end_time, "18:00");
        assert_eq!(event.end_date, "2024-12-20");
        assert!(event.description.is_none());
    }

    #[test]
    fn test_blank_optionals_dropped() {
        let event = ScheduleEvent::new("Math", "2024-12-20", "08:25", "09:05")
            .with_location("  ")
            .normalized();
        assert!(event.location.is_none());
        assert_eq!(event.key(), "Math");
    }
}
