use std::collections::VecDeque;

use crate::grid::{CellCoord, Grid};

// ---------------------------------------------------------------------------
// Flood fill
// ---------------------------------------------------------------------------

/// Snapshot of one flood-fill pass: a flat row-major reachability mask over
/// the grid it was computed from.
#[derive(Debug, Clone)]
pub struct FillData {
    width: usize,
    height: usize,
    filled: Vec<bool>,
}

impl FillData {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            filled: vec![false; width * height],
        }
    }

    pub fn is_filled(&self, coord: CellCoord) -> bool {
        if coord.x < 0
            || coord.y < 0
            || coord.x as usize >= self.width
            || coord.y as usize >= self.height
        {
            return false;
        }
        self.filled[coord.y as usize * self.width + coord.x as usize]
    }

    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }

    fn mark(&mut self, x: i32, y: i32) {
        self.filled[y as usize * self.width + x as usize] = true;
    }
}

/// One horizontal span of filled cells, queued so the rows above and below
/// it get scanned later.
#[derive(Debug, Clone, Copy)]
struct FillRange {
    start_x: i32,
    end_x: i32,
    y: i32,
}

/// Queue-based scanline flood fill over the occupancy grid. Cells whose
/// occupant blocks filling (walls) stop the scan; all other cells are open.
pub struct FloodFiller<'a> {
    grid: &'a Grid,
    ranges: VecDeque<FillRange>,
}

impl<'a> FloodFiller<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            ranges: VecDeque::new(),
        }
    }

    /// Computes the set of open cells reachable from `start`. A blocked or
    /// out-of-bounds start yields an empty result.
    pub fn flood_fill(mut self, start: CellCoord) -> FillData {
        let mut data = FillData::new(self.grid.width(), self.grid.height());
        if !self.open(start, &data) {
            return data;
        }
        self.linear_fill(start.x, start.y, &mut data);
        while let Some(range) = self.ranges.pop_front() {
            for y in [range.y - 1, range.y + 1] {
                // one-cell overhang past each span end covers diagonals
                for x in (range.start_x - 1)..=(range.end_x + 1) {
                    if self.open(CellCoord::new(x, y), &data) {
                        self.linear_fill(x, y, &mut data);
                    }
                }
            }
        }
        data
    }

    fn open(&self, coord: CellCoord, data: &FillData) -> bool {
        match self.grid.cell(coord) {
            Some(cell) => {
                !data.is_filled(coord)
                    && !cell.occupant_kind().is_some_and(|kind| kind.blocks_fill())
            }
            None => false,
        }
    }

    /// Fills the contiguous open span of row `y` containing `x` and queues
    /// it for vertical expansion.
    fn linear_fill(&mut self, x: i32, y: i32, data: &mut FillData) {
        let mut left = x;
        while self.open(CellCoord::new(left - 1, y), data) {
            left -= 1;
        }
        let mut right = x;
        while self.open(CellCoord::new(right + 1, y), data) {
            right += 1;
        }
        for fx in left..=right {
            data.mark(fx, y);
        }
        self.ranges.push_back(FillRange {
            start_x: left,
            end_x: right,
            y,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
