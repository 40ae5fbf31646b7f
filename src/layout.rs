//! Geometry shared by the accumulator and the renderer.

use crate::grid::{BLOCKS_PER_DAY, DAYS, SLOTS_PER_BLOCK};
use time::macros::time;
use time::{Duration, Time};

pub const DEFAULT_WINDOW_START_HOUR: u8 = 8;
pub const DEFAULT_X_OFFSET: u32 = 61;
pub const DEFAULT_Y_OFFSET: u32 = 31;
pub const DEFAULT_BLOCK_WIDTH: u32 = 49;

/// Time window and pixel placement of the weekly grid.
///
/// Built once per run and handed to both the accumulator (window start,
/// slot step) and the renderer (pixel offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    window_start: Time,
    x_offset: u32,
    y_offset: u32,
    block_width: u32,
}

impl GridLayout {
    pub fn new(window_start: Time, x_offset: u32, y_offset: u32, block_width: u32) -> Self {
        Self {
            window_start,
            x_offset,
            y_offset,
            block_width,
        }
    }

    /// Time of day at which block 0, slot 0 begins.
    pub fn window_start(&self) -> Time {
        self.window_start
    }

    /// Duration covered by one slot: one hour split into `SLOTS_PER_BLOCK`.
    pub fn slot_step(&self) -> Duration {
        Duration::hours(1) / SLOTS_PER_BLOCK as i32
    }

    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    /// Top-left pixel of a slot row. Blocks and days are separated by a
    /// one pixel gap.
    pub fn slot_origin(&self, day: usize, block: usize, slot: usize) -> (u32, u32) {
        let x = self.x_offset + day as u32 * (self.block_width + 1);
        let y = self.y_offset + block as u32 * (SLOTS_PER_BLOCK as u32 + 1) + slot as u32;
        (x, y)
    }

    /// Smallest template dimensions that can hold every painted rectangle,
    /// or None when the geometry does not fit in `u32` pixel coordinates.
    /// Every `slot_origin` stays in range whenever this returns Some.
    pub fn required_size(&self) -> Option<(u32, u32)> {
        let day_pitch = self.block_width.checked_add(1)?;
        let width = (DAYS as u32 - 1)
            .checked_mul(day_pitch)?
            .checked_add(self.x_offset)?
            .checked_add(self.block_width)?;
        let height = (BLOCKS_PER_DAY as u32 - 1)
            .checked_mul(SLOTS_PER_BLOCK as u32 + 1)?
            .checked_add(self.y_offset)?
            .checked_add(SLOTS_PER_BLOCK as u32)?;
        Some((width, height))
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(
            time!(08:00),
            DEFAULT_X_OFFSET,
            DEFAULT_Y_OFFSET,
            DEFAULT_BLOCK_WIDTH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_step_is_150_seconds() {
        assert_eq!(GridLayout::default().slot_step(), Duration::seconds(150));
    }

    #[test]
    fn default_window_starts_at_eight() {
        assert_eq!(GridLayout::default().window_start(), time!(08:00));
    }

    #[test]
    fn slot_origin_skips_separator_pixels() {
        let layout = GridLayout::default();
        assert_eq!(layout.slot_origin(0, 0, 0), (61, 31));
        assert_eq!(layout.slot_origin(1, 0, 0), (111, 31));
        assert_eq!(layout.slot_origin(0, 1, 0), (61, 56));
        assert_eq!(layout.slot_origin(2, 3, 5), (161, 111));
    }

    #[test]
    fn required_size_covers_last_rectangle() {
        assert_eq!(GridLayout::default().required_size(), Some((360, 355)));
    }

    #[test]
    fn oversized_geometry_has_no_required_size() {
        let layout = GridLayout::new(time!(08:00), u32::MAX - 100, 31, 49);
        assert_eq!(layout.required_size(), None);
        let layout = GridLayout::new(time!(08:00), 61, 31, u32::MAX);
        assert_eq!(layout.required_size(), None);
    }
}
