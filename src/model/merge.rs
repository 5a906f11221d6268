// File: src/model/merge.rs
// Collapses back-to-back slots of the same activity into one event.
use crate::model::event::{CandidateEvent, FinalEvent};
use crate::model::time::{TimeError, time_to_minutes};

/// Largest gap (minutes) between two slots that still counts as one run.
pub const DEFAULT_MAX_GAP_MINUTES: i64 = 30;

/// Appended once to the description of every merged run.
pub const MULTI_PERIOD_TAG: &str = "multi-period run";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub max_gap_minutes: i64,
    /// Fail on a malformed time instead of treating it as 00:00.
    pub strict_times: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            max_gap_minutes: DEFAULT_MAX_GAP_MINUTES,
            strict_times: false,
        }
    }
}

/// A malformed time that was read as 00:00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWarning {
    pub title: String,
    pub field: &'static str,
    pub error: TimeError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub events: Vec<FinalEvent>,
    pub warnings: Vec<TimeWarning>,
}

struct Accumulator {
    run_so_far: Option<FinalEvent>,
    output: Vec<FinalEvent>,
    warnings: Vec<TimeWarning>,
}

impl Accumulator {
    fn minutes(
        &mut self,
        event: &CandidateEvent,
        field: &'static str,
        value: &str,
        strict: bool,
    ) -> Result<i64, TimeError> {
        match time_to_minutes(value) {
            Ok(m) => Ok(m),
            Err(e) if strict => Err(e),
            Err(e) => {
                log::warn!("'{}' has a malformed {} ({}); using 00:00", event.title, field, e);
                self.warnings.push(TimeWarning {
                    title: event.title.clone(),
                    field,
                    error: e,
                });
                Ok(0)
            }
        }
    }
}

fn tag_description(event: &mut FinalEvent) {
    let desc = event.description.get_or_insert_with(String::new);
    if desc.contains(MULTI_PERIOD_TAG) {
        return;
    }
    if desc.is_empty() {
        desc.push_str(MULTI_PERIOD_TAG);
    } else {
        desc.push_str(&format!(" ({})", MULTI_PERIOD_TAG));
    }
}

/// Sorts candidates by `(start_date, start_time)` and merges each run of
/// same-title, same-day events whose gaps stay within `max_gap_minutes`.
///
/// A negative gap (overlapping or out-of-order slots) also merges. Only
/// neighbours in sorted order are compared; a broken run is never reopened.
pub fn merge_runs(
    candidates: &[CandidateEvent],
    options: &MergeOptions,
) -> Result<MergeOutcome, TimeError> {
    let mut sorted: Vec<&CandidateEvent> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        (a.start_date.as_str(), a.start_time.as_str())
            .cmp(&(b.start_date.as_str(), b.start_time.as_str()))
    });

    let mut acc = Accumulator {
        run_so_far: None,
        output: Vec::with_capacity(sorted.len()),
        warnings: Vec::new(),
    };

    for next in sorted {
        let Some(mut run) = acc.run_so_far.take() else {
            acc.run_so_far = Some(next.clone());
            continue;
        };

        let joins = if run.key() == next.key() && run.start_date == next.start_date {
            let run_end = acc.minutes(&run, "end_time", &run.end_time, options.strict_times)?;
            let next_start =
                acc.minutes(next, "start_time", &next.start_time, options.strict_times)?;
            next_start - run_end <= options.max_gap_minutes
        } else {
            false
        };

        if joins {
            run.end_time = next.end_time.clone();
            run.end_date = next.end_date.clone();
            tag_description(&mut run);
            log::debug!("Merged slot into run: {}", run.brief());
            acc.run_so_far = Some(run);
        } else {
            acc.output.push(run);
            acc.run_so_far = Some(next.clone());
        }
    }

    acc.output.extend(acc.run_so_far);
    log::info!(
        "Run merging: {} candidate events -> {} events",
        candidates.len(),
        acc.output.len()
    );

    Ok(MergeOutcome {
        events: acc.output,
        warnings: acc.warnings,
    })
}

/// Lenient merge with the default gap; malformed times count as 00:00.
pub fn merge_consecutive_events(candidates: &[CandidateEvent]) -> MergeOutcome {
    let options = MergeOptions {
        strict_times: false,
        ..MergeOptions::default()
    };
    match merge_runs(candidates, &options) {
        Ok(outcome) => outcome,
        // Only strict mode returns an error; malformed times were substituted.
        Err(e) => unreachable!("lenient merge failed: {}", e),
    }
}
