// File: ./src/client/mod.rs
pub mod extractor;
pub mod prompt;
pub mod recovery;
pub mod sync;

pub use extractor::{CommandExtractor, EventExtractor, ResponseFileExtractor, RetryPolicy};
pub use recovery::ExtractError;
pub use sync::{CalendarSink, DryRun, IcsExport, SyncReport};
