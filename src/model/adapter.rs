// File: src/model/adapter.rs
// Conversions from final events into what calendar targets accept.
use crate::model::event::FinalEvent;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use icalendar::{CalendarDateTime, Component, Event, EventLike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// `YYYY-MM-DDTHH:MM:00`, no offset.
    pub date_time: String,
    pub time_zone: String,
}

/// One event in the shape calendar stores take on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EventPayload {
    pub fn from_event(event: &FinalEvent, time_zone: &str) -> Self {
        let stamp = |date: &str, time: &str| EventDateTime {
            date_time: format!("{}T{}:00", date.trim(), time.trim()),
            time_zone: time_zone.to_string(),
        };
        Self {
            summary: event.title.clone(),
            start: stamp(&event.start_date, &event.start_time),
            end: stamp(&event.end_date, &event.end_time),
            description: event.description.clone().filter(|d| !d.is_empty()),
            location: event.location.clone().filter(|l| !l.is_empty()),
        }
    }
}

impl EventDateTime {
    /// Validates the wall-clock value; this is where `24:40` or `2024-13-01` fail.
    pub fn to_naive(&self) -> Result<NaiveDateTime, String> {
        let (date, time) = self
            .date_time
            .split_once('T')
            .ok_or_else(|| format!("invalid dateTime '{}'", self.date_time))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {}", date, e))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .map_err(|e| format!("invalid time '{}': {}", time, e))?;
        Ok(date.and_time(time))
    }
}

impl EventPayload {
    /// Builds a VEVENT with zone-qualified start and end.
    pub fn to_vevent(&self) -> Result<Event, String> {
        let start = self.start.to_naive()?;
        let end = self.end.to_naive()?;
        if end < start {
            return Err(format!(
                "event ends before it starts ({} > {})",
                self.start.date_time, self.end.date_time
            ));
        }

        let mut event = Event::new();
        event.uid(&Uuid::new_v4().to_string());
        event.summary(&self.summary);
        event.timestamp(Utc::now());
        event.starts(CalendarDateTime::WithTimezone {
            date_time: start,
            tzid: self.start.time_zone.clone(),
        });
        event.ends(CalendarDateTime::WithTimezone {
            date_time: end,
            tzid: self.end.time_zone.clone(),
        });
        if let Some(desc) = &self.description {
            event.description(desc);
        }
        if let Some(loc) = &self.location {
            event.location(loc);
        }
        Ok(event.done())
    }
}
