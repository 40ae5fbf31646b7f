use crate::accumulator::accumulate;
use crate::config::RunSettings;
use crate::error::AppError;
use crate::events::{EventSource, normalize_order, parse_records};
use crate::intervals::reconstruct;
use crate::render::{load_template, remove_stale_output, render, write_image};
use std::path::PathBuf;
use time::Date;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    pub intervals: usize,
    pub first_day: Date,
    pub last_day: Date,
    pub output: PathBuf,
}

/// Runs one batch: events in, heatmap image out.
///
/// The previous output is removed before anything else, so any error
/// leaves no image at the output path.
pub fn run<S: EventSource + ?Sized>(
    settings: &RunSettings,
    source: &mut S,
    today: Date,
) -> Result<RunSummary, AppError> {
    remove_stale_output(&settings.output_image)?;

    let records = source.fetch()?;
    let events = normalize_order(parse_records(&records)?, settings.order);
    info!(
        records = records.len(),
        events = events.len(),
        order = ?settings.order,
        "Event log loaded"
    );

    let intervals = reconstruct(&events)?;
    let grid = accumulate(&intervals, today, &settings.layout)?;

    let template = load_template(&settings.input_image)?;
    let image = render(&grid, &template.image, &settings.layout)?;
    write_image(&image, template.format, &settings.output_image)?;

    let first_day = intervals
        .first()
        .map(|i| i.start().date())
        .ok_or(AppError::EmptyIntervalSet)?;
    let last_day = intervals
        .last()
        .map(|i| i.start().date())
        .ok_or(AppError::EmptyIntervalSet)?;

    Ok(RunSummary {
        events: events.len(),
        intervals: intervals.len(),
        first_day,
        last_day,
        output: settings.output_image.clone(),
    })
}
