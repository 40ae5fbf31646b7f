//! Per-weekday occupancy estimate with daily exponential decay.
//!
//! Three phases run strictly in sequence: gap-fill decay and slot marking
//! while walking the intervals, trailing decay up to yesterday, then a
//! single smoothing pass over the raw bytes.

use crate::error::AppError;
use crate::grid::{GridDay, OccupancyGrid, SLOTS_PER_DAY, SlotIndex};
use crate::intervals::Interval;
use crate::layout::GridLayout;
use time::Date;
use tracing::{debug, info};

#[derive(Debug)]
pub struct OccupancyAccumulator {
    grid: OccupancyGrid,
    cursor: Date,
    layout: GridLayout,
}

impl OccupancyAccumulator {
    /// Starts with the cursor on the day before `first_day`, so the first
    /// observed day is decayed like any other.
    pub fn new(first_day: Date, layout: GridLayout) -> Result<Self, AppError> {
        let cursor = first_day
            .previous_day()
            .ok_or(AppError::DateOutOfRange(first_day))?;
        Ok(Self {
            grid: OccupancyGrid::new(),
            cursor,
            layout,
        })
    }

    pub fn cursor(&self) -> Date {
        self.cursor
    }

    pub fn raw_grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Moves the cursor forward one day and decays that weekday.
    fn advance_day(&mut self) -> Result<(), AppError> {
        self.cursor = self
            .cursor
            .next_day()
            .ok_or(AppError::DateOutOfRange(self.cursor))?;
        if let Some(day) = GridDay::from_date(self.cursor) {
            self.grid.halve_day(day);
        }
        Ok(())
    }

    /// Decays every day after the cursor up to and including `date`.
    pub fn decay_through(&mut self, date: Date) -> Result<(), AppError> {
        while self.cursor < date {
            self.advance_day()?;
        }
        Ok(())
    }

    pub fn observe(&mut self, interval: &Interval) -> Result<(), AppError> {
        let date = interval.start().date();
        while self.cursor != date {
            if self.cursor > date {
                return Err(AppError::UnorderedIntervals {
                    date,
                    cursor: self.cursor,
                });
            }
            self.advance_day()?;
        }

        let Some(day) = GridDay::from_date(date) else {
            debug!(%date, "Skipping interval on untracked weekday");
            return Ok(());
        };

        let step = self.layout.slot_step();
        let mut probe = date.with_time(self.layout.window_start());
        let mut inside = false;
        for offset in 0..SLOTS_PER_DAY {
            if interval.contains(probe) {
                if let Some(index) = SlotIndex::from_offset(offset) {
                    self.grid.mark_open(day, index);
                }
                inside = true;
            } else if inside {
                break;
            }
            probe += step;
        }
        Ok(())
    }

    /// Applies trailing decay through the day before `today` and smooths.
    pub fn finish(mut self, today: Date) -> Result<OccupancyGrid, AppError> {
        if let Some(yesterday) = today.previous_day() {
            self.decay_through(yesterday)?;
        }
        let mut grid = self.grid;
        grid.map_cells(smooth);
        Ok(grid)
    }
}

/// Concave curve pulling partial confidence toward "open":
/// `round(255 * sqrt(v / 255))`.
pub fn smooth(value: u8) -> u8 {
    let scaled = (f64::from(value) / 255.0).sqrt() * 255.0;
    scaled.round().clamp(0.0, 255.0) as u8
}

pub fn accumulate(
    intervals: &[Interval],
    today: Date,
    layout: &GridLayout,
) -> Result<OccupancyGrid, AppError> {
    let first = intervals.first().ok_or(AppError::EmptyIntervalSet)?;
    let mut accumulator = OccupancyAccumulator::new(first.start().date(), *layout)?;
    for interval in intervals {
        accumulator.observe(interval)?;
    }
    info!(
        first_day = %first.start().date(),
        last_day = %accumulator.cursor(),
        %today,
        "Occupancy accumulated"
    );
    accumulator.finish(today)
}
