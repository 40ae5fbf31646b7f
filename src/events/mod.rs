use crate::error::AppError;
use serde::Deserialize;
use time::PrimitiveDateTime;
use time::macros::format_description;
use tracing::warn;

pub mod file;
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: PrimitiveDateTime,
    pub state: EventState,
}

impl Event {
    pub fn open(timestamp: PrimitiveDateTime) -> Self {
        Self {
            timestamp,
            state: EventState::Open,
        }
    }

    pub fn closed(timestamp: PrimitiveDateTime) -> Self {
        Self {
            timestamp,
            state: EventState::Closed,
        }
    }
}

/// Order in which a source delivers its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamOrder {
    #[default]
    Ascending,
    Descending,
}

/// A record as stored by the backend, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub timestamp: String,
    pub state: String,
}

impl RawRecord {
    pub fn new(timestamp: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            state: state.into(),
        }
    }
}

pub trait EventSource {
    fn fetch(&mut self) -> Result<Vec<RawRecord>, AppError>;
}

/// Parses one record. Returns `Ok(None)` for records that carry no usable
/// state and are dropped as noise.
pub fn parse_record(record: &RawRecord) -> Result<Option<Event>, AppError> {
    let state = match record.state.trim().chars().next() {
        None => return Ok(None),
        Some('1') => EventState::Open,
        Some('0') => EventState::Closed,
        Some(other) => {
            warn!(timestamp = %record.timestamp, state = %other, "Skipping record with unknown state");
            return Ok(None);
        }
    };
    let timestamp = parse_timestamp(&record.timestamp)?;
    Ok(Some(Event { timestamp, state }))
}

/// Accepts `YYYY-MM-DD HH:MM:SS[.fff]` and the ISO 8601 `T` separator.
pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, AppError> {
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    let normalized = value.trim().replacen('T', " ", 1);
    PrimitiveDateTime::parse(&normalized, format).map_err(|source| AppError::InvalidTimestamp {
        value: value.to_string(),
        source,
    })
}

pub fn parse_records(records: &[RawRecord]) -> Result<Vec<Event>, AppError> {
    let mut events = Vec::with_capacity(records.len());
    for record in records {
        if let Some(event) = parse_record(record)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Brings a stream into ascending timestamp order.
pub fn normalize_order(mut events: Vec<Event>, order: StreamOrder) -> Vec<Event> {
    if order == StreamOrder::Descending {
        events.reverse();
    }
    if !events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        warn!(
            ?order,
            count = events.len(),
            "Event stream does not match declared order, sorting"
        );
        events.sort_by_key(|e| e.timestamp);
    }
    events
}
