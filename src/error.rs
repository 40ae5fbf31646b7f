use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;
use time::{Date, PrimitiveDateTime};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event log yields no open interval")]
    MalformedLog,
    #[error("no intervals to accumulate")]
    EmptyIntervalSet,
    #[error("interval crosses midnight: {start} -> {end}")]
    CrossMidnight {
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    },
    #[error("interval ends before it starts: {start} -> {end}")]
    InvertedInterval {
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    },
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("interval on {date} arrived after {cursor} was already processed")]
    UnorderedIntervals { date: Date, cursor: Date },
    #[error("date out of range after {0}")]
    DateOutOfRange(Date),
    #[error("event source error: {0}")]
    Source(String),
    #[error("failed to load template {path}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("template is {width}x{height}, grid needs at least {min_width}x{min_height}")]
    TemplateTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error("grid layout does not fit in pixel coordinates")]
    LayoutOverflow,
    #[error("failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to remove stale output {path}: {source}")]
    StaleOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
