// End-to-end runs: sheet file -> captured response -> merged events -> calendar.
use gridcal::client::extractor::ResponseFileExtractor;
use gridcal::client::sync::{DryRun, IcsExport};
use gridcal::config::Config;
use gridcal::context::{AppContext, TestContext};
use gridcal::pipeline::{Pipeline, PipelineError, RunOutcome};
use std::fs;
use std::path::PathBuf;

const SHEET: &str = r#"{
    "name": "Friday",
    "cells": [
        ["Time", "2024-12-20"],
        ["08:25~09:05", "Math"],
        ["09:15~10:05", null],
        ["10:15~11:05", "English"],
        ["13:30~14:20", "Physics"],
        ["14:30~15:20", "Physics"]
    ],
    "merged": ["B2:B3"]
}"#;

const RESPONSE: &str = r#"Here is the schedule:
```json
[
  {"title": "Physics", "start_date": "2024-12-20", "start_time": "14:30", "end_time": "15:20"},
  {"title": "Math", "start_date": "2024-12-20", "start_time": "08:25", "end_time": "09:05"},
  {"title": "English", "start_date": "2024-12-20", "start_time": "10:15", "end_time": "11:05", "location": "Room 2"},
  {"title": "Math", "start_date": "2024-12-20", "start_time": "09:15", "end_time": "10:05"},
  {"title": "Physics", "start_date": "2024-12-20", "start_time": "13:30", "end_time": "14:20"},
  {"start_date": "2024-12-20"}
]
```"#;

fn write_inputs(ctx: &TestContext, response: &str) -> (PathBuf, PathBuf) {
    let dir = ctx.get_data_dir().unwrap();
    let sheet = dir.join("friday.json");
    let raw = dir.join("response.txt");
    fs::write(&sheet, SHEET).unwrap();
    fs::write(&raw, response).unwrap();
    (sheet, raw)
}

fn config() -> Config {
    Config {
        extract_retries: 0,
        time_zone: "Europe/Brussels".to_string(),
        calendar_name: "Class 3A".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_dry_run_end_to_end() {
    let ctx = TestContext::new();
    let (sheet, raw) = write_inputs(&ctx, RESPONSE);
    let sink = DryRun::default();

    let outcome = Pipeline::new(config())
        .run(&sheet, &ResponseFileExtractor::new(raw), &sink)
        .await
        .unwrap();

    let RunOutcome::Synced {
        events,
        report,
        warnings,
    } = outcome
    else {
        panic!("expected events");
    };
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Math", "English", "Physics"]);
    assert_eq!(events[0].end_time, "10:05");
    assert_eq!(events[2].start_time, "13:30");
    assert_eq!(events[2].end_time, "15:20");
    assert!(warnings.is_empty());

    assert_eq!(report.total, 3);
    assert_eq!(report.success_count, 3);
    assert_eq!(report.failed_count, 0);

    let payloads = sink.payloads();
    assert_eq!(payloads.len(), 3);
    assert_eq!(payloads[1].location.as_deref(), Some("Room 2"));
    assert_eq!(payloads[0].end.date_time, "2024-12-20T10:05:00");
    assert_eq!(payloads[0].end.time_zone, "Europe/Brussels");
}

#[tokio::test]
async fn test_export_writes_calendar() {
    let ctx = TestContext::new();
    let (sheet, raw) = write_inputs(&ctx, RESPONSE);
    let out = ctx.get_export_path("friday").unwrap();
    let sink = IcsExport::new(&out, "Class 3A");

    let outcome = Pipeline::new(config())
        .run(&sheet, &ResponseFileExtractor::new(raw), &sink)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Synced { .. }));
    assert_eq!(sink.finish().unwrap(), 3);

    let ics = fs::read_to_string(&out).unwrap();
    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
    assert!(ics.contains("SUMMARY:Math"));
    assert!(ics.contains("TZID=Europe/Brussels"));
    assert!(ics.contains("multi-period run"));
}

#[tokio::test]
async fn test_unusable_response_reports_no_events() {
    let ctx = TestContext::new();
    let (sheet, raw) = write_inputs(&ctx, "Sorry, I cannot read this table.");
    let outcome = Pipeline::new(config())
        .run(&sheet, &ResponseFileExtractor::new(raw), &DryRun::default())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::NoEvents);
}

#[tokio::test]
async fn test_missing_sheet_is_fatal() {
    let ctx = TestContext::new();
    let (_, raw) = write_inputs(&ctx, RESPONSE);
    let missing = ctx.root.join("nope.json");
    let result = Pipeline::new(config())
        .run(&missing, &ResponseFileExtractor::new(raw), &DryRun::default())
        .await;
    assert!(matches!(result, Err(PipelineError::MissingResource { .. })));
}

#[tokio::test]
async fn test_prompt_carries_region_time() {
    let ctx = TestContext::new();
    let (sheet, _) = write_inputs(&ctx, RESPONSE);
    let pipeline = Pipeline::new(config());
    let sheet = pipeline.load_sheet(&sheet).await.unwrap();
    let analysis = pipeline.analyze(&sheet);
    let prompt = pipeline.build_prompt(&sheet, &analysis);

    assert!(prompt.contains("Row 2: [\"08:25~09:05\", \"Math\"]"));
    assert!(prompt.contains("Merged B2:B3: rows 2-3, columns 2-2, time: 08:25~10:05"));
}
