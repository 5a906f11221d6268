// File: src/client/recovery.rs
// Best-effort recovery of the event array from an extraction response.
use crate::model::event::CandidateEvent;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extraction response was empty")]
    Empty,
    #[error("no JSON array found in extraction response")]
    NoArray,
    #[error("extraction response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("extractor failed: {0}")]
    Extractor(String),
    /// The extractor program could not be found.
    #[error("extractor program not found: {0}")]
    Unavailable(String),
    #[error("extractor timed out after {0}s")]
    Timeout(u64),
}

const FENCE_LANGS: &[&str] = &["json", "JSON", "python"];

/// Strips code fences and a leading language tag.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
        for lang in FENCE_LANGS {
            if let Some(rest) = text.strip_prefix(lang) {
                text = rest;
                break;
            }
        }
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Slice from the first `[` to the last `]`, or the text itself if it is
/// already an array.
pub fn isolate_array(raw: &str) -> Result<&str, ExtractError> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    if text.starts_with('[') && text.ends_with(']') {
        return Ok(text);
    }
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => Err(ExtractError::NoArray),
    }
}

/// Parses candidate events from a raw response.
///
/// Records that do not fit the event shape are skipped one by one so a
/// single bad record does not cost the whole batch.
pub fn recover_candidates(raw: &str) -> Result<Vec<CandidateEvent>, ExtractError> {
    let array = isolate_array(raw)?;
    let values: Vec<Value> = serde_json::from_str(array)?;

    let total = values.len();
    let events: Vec<CandidateEvent> = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<CandidateEvent>(value) {
            Ok(event) => Some(event.normalized()),
            Err(e) => {
                log::warn!("Skipping extracted record #{}: {}", i + 1, e);
                None
            }
        })
        .collect();

    log::info!("Recovered {} of {} extracted records", events.len(), total);
    Ok(events)
}

/// Lenient form used by the pipeline: any failure becomes an empty list.
pub fn candidates_or_empty(raw: &str) -> Vec<CandidateEvent> {
    match recover_candidates(raw) {
        Ok(events) => events,
        Err(e) => {
            log::warn!("Malformed extraction output, treating as no events: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{"title": "Math", "start_date": "2024-12-20", "start_time": "08:25", "end_date": "2024-12-20", "end_time": "10:05"}"#;

    #[test]
    fn test_plain_array() {
        let events = recover_candidates(&format!("[{}]", RECORD)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end_time, "10:05");
    }

    #[test]
    fn test_code_fence() {
        let raw = format!("```json\n[{}]\n```", RECORD);
        assert_eq!(recover_candidates(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_surrounding_prose() {
        let raw = format!("Sure! Here are the events:\n[{}]\nLet me know if you need more.", RECORD);
        assert_eq!(recover_candidates(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_no_array() {
        assert!(matches!(
            recover_candidates("I could not find any events."),
            Err(ExtractError::NoArray)
        ));
        assert!(matches!(recover_candidates("  "), Err(ExtractError::Empty)));
        assert!(candidates_or_empty("nothing here").is_empty());
    }

    #[test]
    fn test_broken_json_is_empty() {
        let raw = r#"[{"title": "Math", "start_date": }]"#;
        assert!(matches!(recover_candidates(raw), Err(ExtractError::Json(_))));
        assert!(candidates_or_empty(raw).is_empty());
    }

    #[test]
    fn test_bad_record_is_skipped() {
        let raw = format!(r#"[{}, {{"start_date": "2024-12-20"}}, 42]"#, RECORD);
        let events = recover_candidates(&raw).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Math");
    }
}
