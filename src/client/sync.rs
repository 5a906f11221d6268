// File: src/client/sync.rs
// Pushes final events to a calendar target one at a time and reports per-event results.
use crate::model::adapter::EventPayload;
use crate::model::event::FinalEvent;
use crate::storage;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use icalendar::{Calendar, Event};
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// A calendar store that takes one event per call.
pub trait CalendarSink: Send + Sync {
    fn insert(&self, payload: &EventPayload) -> impl Future<Output = Result<(), String>> + Send;
}

/// Collects VEVENTs and writes one `.ics` file on `finish`.
#[derive(Debug)]
pub struct IcsExport {
    path: PathBuf,
    name: String,
    events: Mutex<Vec<Event>>,
}

impl IcsExport {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_ics_string(&self) -> String {
        let mut calendar = Calendar::new();
        calendar.name(&self.name);
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        for event in events.iter() {
            calendar.push(event.clone());
        }
        calendar.to_string()
    }

    /// Writes the collected events; returns how many were written.
    pub fn finish(&self) -> Result<usize> {
        let count = self.events.lock().unwrap_or_else(|e| e.into_inner()).len();
        let ics = self.to_ics_string();
        storage::with_lock(&self.path, || storage::atomic_write(&self.path, &ics))?;
        log::info!("Wrote {} events to {}", count, self.path.display());
        Ok(count)
    }
}

impl CalendarSink for IcsExport {
    async fn insert(&self, payload: &EventPayload) -> Result<(), String> {
        let event = payload.to_vevent()?;
        self.events
            .lock()
            .map_err(|_| "event buffer poisoned".to_string())?
            .push(event);
        Ok(())
    }
}

/// Records payloads without committing anything.
#[derive(Debug, Default)]
pub struct DryRun {
    payloads: Mutex<Vec<EventPayload>>,
}

impl DryRun {
    pub fn payloads(&self) -> Vec<EventPayload> {
        self.payloads
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl CalendarSink for DryRun {
    async fn insert(&self, payload: &EventPayload) -> Result<(), String> {
        // Same validation a real target would apply.
        payload.to_vevent()?;
        self.payloads
            .lock()
            .map_err(|_| "payload buffer poisoned".to_string())?
            .push(payload.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub event: FinalEvent,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub total: usize,
    pub failures: Vec<SyncFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub time_zone: String,
    pub concurrency: usize,
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            time_zone: "Asia/Taipei".to_string(),
            concurrency: 4,
            timeout: Duration::from_secs(30),
            retries: 1,
        }
    }
}

async fn insert_one<S: CalendarSink>(
    sink: &S,
    payload: &EventPayload,
    options: &SyncOptions,
) -> Result<(), String> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        // Only timeouts are retried; a rejected event stays rejected.
        match tokio::time::timeout(options.timeout, sink.insert(payload)).await {
            Ok(result) => return result,
            Err(_) if attempt <= options.retries => {
                log::debug!("Insert of '{}' timed out; retrying", payload.summary);
            }
            Err(_) => return Err(format!("timed out after {}s", options.timeout.as_secs())),
        }
    }
}

/// Inserts every event; a failure is recorded and never stops the batch.
pub async fn sync_events<S: CalendarSink>(
    sink: &S,
    events: &[FinalEvent],
    options: &SyncOptions,
) -> SyncReport {
    log::info!("Syncing {} events", events.len());

    let futures = events.iter().enumerate().map(move |(i, event)| async move {
        let payload = EventPayload::from_event(event, &options.time_zone);
        let result = insert_one(sink, &payload, options).await;
        (i, event, result)
    });

    let mut stream = stream::iter(futures).buffered(options.concurrency.max(1));
    let mut report = SyncReport {
        total: events.len(),
        ..SyncReport::default()
    };

    while let Some((i, event, result)) = stream.next().await {
        match result {
            Ok(()) => {
                report.success_count += 1;
                log::debug!("[{}/{}] synced {}", i + 1, events.len(), event.brief());
            }
            Err(error) => {
                report.failed_count += 1;
                log::warn!("[{}/{}] failed {}: {}", i + 1, events.len(), event.brief(), error);
                report.failures.push(SyncFailure {
                    event: event.clone(),
                    error,
                });
            }
        }
    }

    report
}
