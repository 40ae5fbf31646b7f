use crate::error::AppError;
use crate::events::{EventSource, RawRecord};

#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    records: Vec<RawRecord>,
    fail: bool,
    fetches: usize,
}

impl MockEventSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            fail: false,
            fetches: 0,
        }
    }

    /// Builds a source from `(timestamp, state)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(timestamp, state)| RawRecord::new(*timestamp, *state))
                .collect(),
        )
    }

    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
            fetches: 0,
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

impl EventSource for MockEventSource {
    fn fetch(&mut self) -> Result<Vec<RawRecord>, AppError> {
        self.fetches += 1;
        if self.fail {
            return Err(AppError::Source("mock fetch failed".to_string()));
        }
        Ok(self.records.clone())
    }
}
