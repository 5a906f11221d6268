// File: src/pipeline.rs
//! Orchestrates one sheet from grid to calendar.
//!
//! Load the sheet, find its time axis and merged-cell times, ask an extractor
//! for candidate events, merge back-to-back slots, then push the result to a
//! calendar sink. Front ends (the CLI, tests) delegate to `Pipeline` so every
//! entry point applies the same configuration.
use crate::client::extractor::{EventExtractor, extract_with_retry};
use crate::client::prompt;
use crate::client::recovery::{ExtractError, candidates_or_empty};
use crate::client::sync::{CalendarSink, SyncReport, sync_events};
use crate::config::Config;
use crate::model::axis::{TimeAxis, analyze_time_axis};
use crate::model::event::FinalEvent;
use crate::model::grid::{GridError, Sheet};
use crate::model::merge::{MergeOutcome, TimeWarning, merge_runs};
use crate::model::region::{RegionHint, region_hints};
use crate::model::time::TimeError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required input is absent; nothing was processed.
    #[error("missing {what}: {location}")]
    MissingResource { what: &'static str, location: String },
    #[error(transparent)]
    Sheet(GridError),
    /// Only raised with `strict_time_values`.
    #[error("malformed time value: {0}")]
    Time(#[from] TimeError),
}

impl From<GridError> for PipelineError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::NotFound(location) => PipelineError::MissingResource {
                what: "sheet file",
                location,
            },
            other => PipelineError::Sheet(other),
        }
    }
}

/// Fails with `MissingResource` unless `path` exists.
pub fn require_file(path: &Path, what: &'static str) -> Result<(), PipelineError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingResource {
            what,
            location: path.display().to_string(),
        })
    }
}

/// Time structure found in a sheet before extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub axis: TimeAxis,
    pub hints: Vec<RegionHint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Extraction produced nothing usable; no calendar call was made.
    NoEvents,
    Synced {
        events: Vec<FinalEvent>,
        report: SyncReport,
        warnings: Vec<TimeWarning>,
    },
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn load_sheet(&self, path: &Path) -> Result<Sheet, PipelineError> {
        Ok(Sheet::load(path).await?)
    }

    pub fn analyze(&self, sheet: &Sheet) -> Analysis {
        let axis = analyze_time_axis(&sheet.grid, self.config.scan_columns);
        let hints = region_hints(&sheet.merged, &axis);
        log::info!(
            "Sheet '{}': {} time rows, {} merged regions",
            sheet.name,
            axis.len(),
            hints.len()
        );
        Analysis { axis, hints }
    }

    pub fn build_prompt(&self, sheet: &Sheet, analysis: &Analysis) -> String {
        prompt::build_prompt(&sheet.grid, &analysis.hints, &self.config.prompt_options())
    }

    /// Recovers candidates from a raw response and merges runs.
    pub fn finalize(&self, raw: &str) -> Result<MergeOutcome, TimeError> {
        let candidates = candidates_or_empty(raw);
        merge_runs(&candidates, &self.config.merge_options())
    }

    /// Runs a loaded sheet through extraction, merging and sync.
    pub async fn process<E, S>(
        &self,
        sheet: &Sheet,
        extractor: &E,
        sink: &S,
    ) -> Result<RunOutcome, PipelineError>
    where
        E: EventExtractor,
        S: CalendarSink,
    {
        let analysis = self.analyze(sheet);
        let prompt = self.build_prompt(sheet, &analysis);

        let raw = match extract_with_retry(extractor, &prompt, self.config.extract_policy()).await
        {
            Ok(raw) => raw,
            Err(ExtractError::Unavailable(program)) => {
                return Err(PipelineError::MissingResource {
                    what: "extractor command",
                    location: program,
                });
            }
            Err(e) => {
                log::warn!("Extraction via {} failed: {}", extractor.name(), e);
                String::new()
            }
        };

        let MergeOutcome { events, warnings } = self.finalize(&raw)?;
        if events.is_empty() {
            log::info!("No events found in '{}'", sheet.name);
            return Ok(RunOutcome::NoEvents);
        }

        let report = sync_events(sink, &events, &self.config.sync_options()).await;
        log::info!(
            "Sync finished: {} of {} succeeded",
            report.success_count,
            report.total
        );
        Ok(RunOutcome::Synced {
            events,
            report,
            warnings,
        })
    }

    /// `load_sheet` followed by `process`.
    pub async fn run<E, S>(
        &self,
        path: &Path,
        extractor: &E,
        sink: &S,
    ) -> Result<RunOutcome, PipelineError>
    where
        E: EventExtractor,
        S: CalendarSink,
    {
        let sheet = self.load_sheet(path).await?;
        self.process(&sheet, extractor, sink).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::extractor::CommandExtractor;
    use crate::client::sync::DryRun;
    use crate::model::grid::Grid;

    struct Canned(&'static str);

    impl EventExtractor for Canned {
        fn name(&self) -> String {
            "canned".to_string()
        }

        async fn extract(&self, _prompt: &str) -> Result<String, ExtractError> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl EventExtractor for Broken {
        fn name(&self) -> String {
            "broken".to_string()
        }

        async fn extract(&self, _prompt: &str) -> Result<String, ExtractError> {
            Err(ExtractError::Extractor("offline".to_string()))
        }
    }

    fn sheet() -> Sheet {
        Sheet {
            name: "week".to_string(),
            grid: Grid::from_text_rows(vec![
                vec!["", "Mon"],
                vec!["08:25~09:05", "Math"],
                vec!["09:15~10:05", "Math"],
            ]),
            merged: Vec::new(),
        }
    }

    fn quiet_config() -> Config {
        Config {
            extract_retries: 0,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_process_merges_and_syncs() {
        let raw = r#"[
            {"title": "Math", "start_date": "2024-12-20", "start_time": "08:25", "end_time": "09:05"},
            {"title": "Math", "start_date": "2024-12-20", "start_time": "09:15", "end_time": "10:05"}
        ]"#;
        let sink = DryRun::default();
        let outcome = Pipeline::new(quiet_config())
            .process(&sheet(), &Canned(raw), &sink)
            .await
            .unwrap();

        let RunOutcome::Synced { events, report, .. } = outcome else {
            panic!("expected synced outcome");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end_time, "10:05");
        assert_eq!(report.success_count, 1);
        assert_eq!(sink.payloads()[0].start.date_time, "2024-12-20T08:25:00");
    }

    #[tokio::test]
    async fn test_extraction_failure_is_no_events() {
        let sink = DryRun::default();
        let pipeline = Pipeline::new(quiet_config());
        let outcome = pipeline.process(&sheet(), &Broken, &sink).await.unwrap();
        assert_eq!(outcome, RunOutcome::NoEvents);

        let outcome = pipeline
            .process(&sheet(), &Canned("no events here"), &sink)
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::NoEvents);
        assert!(sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_missing_extractor_program_is_fatal() {
        let cmd = CommandExtractor::from_argv(&["/nonexistent/llm".to_string()]).unwrap();
        let sink = DryRun::default();
        let result = Pipeline::new(Config::default())
            .process(&sheet(), &cmd, &sink)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::MissingResource { what: "extractor command", ref location })
                if location == "/nonexistent/llm"
        ));
        assert!(sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_strict_times_fail_the_run() {
        let raw = r#"[
            {"title": "Math", "start_date": "2024-12-20", "start_time": "08:25", "end_time": "09:05"},
            {"title": "Math", "start_date": "2024-12-20", "start_time": "soon", "end_time": "10:05"}
        ]"#;
        let config = Config {
            strict_time_values: true,
            ..quiet_config()
        };
        let result = Pipeline::new(config)
            .process(&sheet(), &Canned(raw), &DryRun::default())
            .await;
        assert!(matches!(result, Err(PipelineError::Time(_))));
    }

    #[tokio::test]
    async fn test_missing_sheet_is_missing_resource() {
        let result = Pipeline::new(quiet_config())
            .run(Path::new("/nonexistent/week.json"), &Broken, &DryRun::default())
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::MissingResource { what: "sheet file", .. })
        ));
        assert!(require_file(Path::new("/nonexistent/r.txt"), "response file").is_err());
    }

    #[test]
    fn test_analyze_finds_axis() {
        let analysis = Pipeline::new(Config::default()).analyze(&sheet());
        assert_eq!(analysis.axis.len(), 2);
        assert!(analysis.hints.is_empty());
    }
}
