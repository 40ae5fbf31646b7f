//! Weekly occupancy grid: six weekdays, thirteen hour blocks of 24 slots.
//!
//! Sunday has no variant in [`GridDay`], so no code path can index or decay
//! a Sunday cell.

use time::{Date, Weekday};

pub const DAYS: usize = 6;
pub const BLOCKS_PER_DAY: usize = 13;
pub const SLOTS_PER_BLOCK: usize = 24;
pub const SLOTS_PER_DAY: usize = BLOCKS_PER_DAY * SLOTS_PER_BLOCK;

/// Flag OR-ed into a cell when its slot was observed open.
pub const OPEN_FLAG: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl GridDay {
    pub const ALL: [GridDay; DAYS] = [
        GridDay::Monday,
        GridDay::Tuesday,
        GridDay::Wednesday,
        GridDay::Thursday,
        GridDay::Friday,
        GridDay::Saturday,
    ];

    /// Column index, 0 = Monday.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns None for Sunday, which the grid does not track.
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Monday => Some(Self::Monday),
            Weekday::Tuesday => Some(Self::Tuesday),
            Weekday::Wednesday => Some(Self::Wednesday),
            Weekday::Thursday => Some(Self::Thursday),
            Weekday::Friday => Some(Self::Friday),
            Weekday::Saturday => Some(Self::Saturday),
            Weekday::Sunday => None,
        }
    }

    pub fn from_date(date: Date) -> Option<Self> {
        Self::from_weekday(date.weekday())
    }
}

/// Position of a slot within a day: hour block and slot inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex {
    block: usize,
    slot: usize,
}

impl SlotIndex {
    pub fn new(block: usize, slot: usize) -> Option<Self> {
        (block < BLOCKS_PER_DAY && slot < SLOTS_PER_BLOCK).then_some(Self { block, slot })
    }

    /// Slot `n` counted from the start of the daily window.
    pub fn from_offset(offset: usize) -> Option<Self> {
        Self::new(offset / SLOTS_PER_BLOCK, offset % SLOTS_PER_BLOCK)
    }

    pub fn block(self) -> usize {
        self.block
    }

    pub fn slot(self) -> usize {
        self.slot
    }

    pub fn offset(self) -> usize {
        self.block * SLOTS_PER_BLOCK + self.slot
    }

    /// All slots of a day in ascending time order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOTS_PER_DAY).filter_map(Self::from_offset)
    }
}

type DayCells = [[u8; SLOTS_PER_BLOCK]; BLOCKS_PER_DAY];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: [DayCells; DAYS],
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self {
            cells: [[[0; SLOTS_PER_BLOCK]; BLOCKS_PER_DAY]; DAYS],
        }
    }

    pub fn get(&self, day: GridDay, index: SlotIndex) -> u8 {
        self.cells[day.index()][index.block][index.slot]
    }

    pub fn set(&mut self, day: GridDay, index: SlotIndex, value: u8) {
        self.cells[day.index()][index.block][index.slot] = value;
    }

    pub fn mark_open(&mut self, day: GridDay, index: SlotIndex) {
        self.cells[day.index()][index.block][index.slot] |= OPEN_FLAG;
    }

    /// Halves every cell of one weekday, rounding toward zero.
    pub fn halve_day(&mut self, day: GridDay) {
        for block in self.cells[day.index()].iter_mut() {
            for cell in block.iter_mut() {
                *cell /= 2;
            }
        }
    }

    /// Cells of one hour block, in slot order.
    pub fn block(&self, day: GridDay, block: usize) -> Option<&[u8; SLOTS_PER_BLOCK]> {
        self.cells[day.index()].get(block)
    }

    pub fn map_cells(&mut self, f: impl Fn(u8) -> u8) {
        for day in self.cells.iter_mut() {
            for block in day.iter_mut() {
                for cell in block.iter_mut() {
                    *cell = f(*cell);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridDay, SlotIndex, u8)> + '_ {
        GridDay::ALL.into_iter().flat_map(move |day| {
            SlotIndex::all().map(move |index| (day, index, self.get(day, index)))
        })
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn sunday_has_no_grid_day() {
        assert_eq!(GridDay::from_date(date!(2021-02-28)), None);
        assert_eq!(GridDay::from_date(date!(2021-03-01)), Some(GridDay::Monday));
        assert_eq!(GridDay::from_date(date!(2021-03-06)), Some(GridDay::Saturday));
    }

    #[test]
    fn slot_index_rejects_out_of_range() {
        assert!(SlotIndex::new(BLOCKS_PER_DAY, 0).is_none());
        assert!(SlotIndex::new(0, SLOTS_PER_BLOCK).is_none());
        assert!(SlotIndex::from_offset(SLOTS_PER_DAY).is_none());
        assert_eq!(SlotIndex::from_offset(25), SlotIndex::new(1, 1));
    }

    #[test]
    fn all_slots_are_ordered_and_complete() {
        let offsets: Vec<usize> = SlotIndex::all().map(SlotIndex::offset).collect();
        assert_eq!(offsets.len(), SLOTS_PER_DAY);
        assert!(offsets.windows(2).all(|w| w[0] + 1 == w[1]));
    }

    #[test]
    fn halve_day_only_touches_that_day() {
        let mut grid = OccupancyGrid::new();
        let index = SlotIndex::new(3, 7).expect("valid slot");
        grid.set(GridDay::Monday, index, 201);
        grid.set(GridDay::Tuesday, index, 201);

        grid.halve_day(GridDay::Monday);

        assert_eq!(grid.get(GridDay::Monday, index), 100);
        assert_eq!(grid.get(GridDay::Tuesday, index), 201);
    }

    #[test]
    fn mark_open_sets_high_bit_only() {
        let mut grid = OccupancyGrid::new();
        let index = SlotIndex::new(0, 0).expect("valid slot");
        grid.set(GridDay::Friday, index, 0x21);
        grid.mark_open(GridDay::Friday, index);
        grid.mark_open(GridDay::Friday, index);

        assert_eq!(grid.get(GridDay::Friday, index), 0xA1);
    }

    #[test]
    fn iter_visits_every_cell() {
        let grid = OccupancyGrid::new();
        assert_eq!(grid.iter().count(), DAYS * SLOTS_PER_DAY);
    }
}
