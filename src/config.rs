// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::client::extractor::RetryPolicy;
use crate::client::prompt::{DEFAULT_MAX_REGION_HINTS, DEFAULT_PREVIEW_ROWS, PromptOptions};
use crate::client::sync::SyncOptions;
use crate::context::AppContext;
use crate::model::axis::DEFAULT_SCAN_COLUMNS;
use crate::model::merge::{DEFAULT_MAX_GAP_MINUTES, MergeOptions};
use crate::storage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

fn default_scan_columns() -> usize {
    DEFAULT_SCAN_COLUMNS
}
fn default_merge_gap() -> i64 {
    DEFAULT_MAX_GAP_MINUTES
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}
fn default_max_region_hints() -> usize {
    DEFAULT_MAX_REGION_HINTS
}

fn default_time_zone() -> String {
    "Asia/Taipei".to_string()
}
fn default_calendar_name() -> String {
    "Schedule".to_string()
}

fn default_extract_timeout() -> u64 {
    120
}
fn default_extract_retries() -> u32 {
    2
}

fn default_sync_timeout() -> u64 {
    30
}
fn default_sync_retries() -> u32 {
    1
}
fn default_sync_concurrency() -> usize {
    4
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Leftmost columns searched for time labels.
    #[serde(default = "default_scan_columns")]
    pub scan_columns: usize,
    #[serde(default = "default_merge_gap")]
    pub merge_gap_minutes: i64,
    #[serde(default)]
    pub strict_time_values: bool,

    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_max_region_hints")]
    pub max_region_hints: usize,

    /// IANA zone attached to every pushed event.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Program (and arguments) that reads the prompt on stdin and answers on stdout.
    #[serde(default)]
    pub extractor_command: Vec<String>,
    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_secs: u64,
    #[serde(default = "default_extract_retries")]
    pub extract_retries: u32,

    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_secs: u64,
    #[serde(default = "default_sync_retries")]
    pub sync_retries: u32,
    #[serde(default = "default_sync_concurrency")]
    pub sync_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_columns: DEFAULT_SCAN_COLUMNS,
            merge_gap_minutes: DEFAULT_MAX_GAP_MINUTES,
            strict_time_values: false,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_region_hints: DEFAULT_MAX_REGION_HINTS,
            time_zone: default_time_zone(),
            calendar_name: default_calendar_name(),
            extractor_command: Vec::new(),
            extract_timeout_secs: 120,
            extract_retries: 2,
            sync_timeout_secs: 30,
            sync_retries: 1,
            sync_concurrency: 4,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Whether an error from `load` means the file simply is not there yet.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Missing file gives defaults; a broken one is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        storage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            storage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Get the path string using an explicit context.
    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            max_gap_minutes: self.merge_gap_minutes,
            strict_times: self.strict_time_values,
        }
    }

    pub fn prompt_options(&self) -> PromptOptions {
        PromptOptions {
            preview_rows: self.preview_rows,
            max_region_hints: self.max_region_hints,
        }
    }

    pub fn extract_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.extract_timeout_secs),
            retries: self.extract_retries,
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            time_zone: self.time_zone.clone(),
            concurrency: self.sync_concurrency.max(1),
            timeout: Duration::from_secs(self.sync_timeout_secs),
            retries: self.sync_retries,
        }
    }
}
