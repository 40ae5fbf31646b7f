//! Comma-separated event log on disk.
//!
//! Each row is `timestamp,state[,channel]`, fields optionally quoted. No
//! header row; blank lines and lines starting with `#` are ignored.

use crate::error::AppError;
use crate::events::{EventSource, RawRecord};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct LogRow {
    timestamp: String,
    state: Option<String>,
    channel: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
    query: Option<String>,
}

impl FileEventSource {
    /// `query` selects records by channel; None keeps every record.
    pub fn new(path: impl Into<PathBuf>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    fn selects(&self, row: &LogRow) -> bool {
        match self.query.as_deref() {
            Some(query) => row.channel.as_deref() == Some(query),
            None => true,
        }
    }
}

impl EventSource for FileEventSource {
    fn fetch(&mut self) -> Result<Vec<RawRecord>, AppError> {
        let source_error =
            |e: csv::Error| AppError::Source(format!("{}: {e}", self.path.display()));
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .from_path(&self.path)
            .map_err(source_error)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<LogRow>() {
            let row = row.map_err(source_error)?;
            if self.selects(&row) {
                records.push(RawRecord::new(row.timestamp, row.state.unwrap_or_default()));
            }
        }
        debug!(path = %self.path.display(), count = records.len(), "Event log read");
        Ok(records)
    }
}
