use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{BASE_MOVEMENT_COST, CELL_SIZE};
use crate::objects::ObjectKind;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Integer cell coordinates on the settlement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to another coordinate.
    pub fn manhattan(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Facts about an occupant that grid-only readers (pathfinder, flood fill)
/// need without touching the ECS. Cached on the cell at placement time and
/// cleared on detachment.
#[derive(Debug, Clone)]
pub struct OccupantInfo {
    pub entity: Entity,
    pub kind: ObjectKind,
    pub movement_cost: i32,
    pub template: String,
    pub blocks_people: bool,
}

/// One unit of the spatial lattice. Holds at most one primary occupant.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub position: CellCoord,
    pub occupant: Option<Entity>,
    occupant_kind: Option<ObjectKind>,
    occupant_cost: i32,
    occupant_template: Option<String>,
    occupant_blocks_people: bool,
    pub base_cost: i32,
    pub mask: bool,
}

impl GridCell {
    fn new(position: CellCoord) -> Self {
        Self {
            position,
            occupant: None,
            occupant_kind: None,
            occupant_cost: 0,
            occupant_template: None,
            occupant_blocks_people: false,
            base_cost: BASE_MOVEMENT_COST,
            mask: false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Movement cost of entering this cell: the occupant's cost when
    /// occupied, otherwise the cell's base cost.
    pub fn cost(&self) -> i32 {
        if self.occupant.is_some() {
            self.occupant_cost
        } else {
            self.base_cost
        }
    }

    pub fn occupant_kind(&self) -> Option<ObjectKind> {
        self.occupant_kind
    }

    pub fn occupant_template(&self) -> Option<&str> {
        self.occupant_template.as_deref()
    }

    pub fn occupant_blocks_people(&self) -> bool {
        self.occupant_blocks_people
    }
}

// ---------------------------------------------------------------------------
// Grid resource
// ---------------------------------------------------------------------------

/// The shared spatial substrate: a fixed-size 2D lattice of cells, stored
/// flat in row-major order. All out-of-bounds queries return `None`/`false`
/// rather than panicking; mutation helpers silently ignore out-of-bounds
/// coordinates.
#[derive(Resource)]
pub struct Grid {
    cells: Vec<GridCell>,
    width: usize,
    height: usize,
    empty_cells: usize,
    /// Placed objects by uid, for mask recalculation and lookups.
    pub objects: HashMap<String, Entity>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(GridCell::new(CellCoord::new(x as i32, y as i32)));
            }
        }
        Self {
            cells,
            width,
            height,
            empty_cells: width * height,
            objects: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells without a primary occupant.
    pub fn empty_cells(&self) -> usize {
        self.empty_cells
    }

    #[inline]
    fn index(&self, coord: CellCoord) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }

    #[inline]
    pub fn in_bounds(&self, coord: CellCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        if self.in_bounds(coord) {
            Some(&self.cells[self.index(coord)])
        } else {
            None
        }
    }

    pub fn cell_at_world(&self, world: Vec2) -> Option<&GridCell> {
        self.cell(self.world_to_cell(world))
    }

    /// World position → cell coordinates. The grid is centered on the world
    /// origin; the result may be out of bounds.
    pub fn world_to_cell(&self, world: Vec2) -> CellCoord {
        let x = (world.x / CELL_SIZE).floor() as i32 + self.width as i32 / 2;
        let y = (world.y / CELL_SIZE).floor() as i32 + self.height as i32 / 2;
        CellCoord::new(x, y)
    }

    /// Cell coordinates → world position of the cell center.
    pub fn cell_to_world(&self, coord: CellCoord) -> Vec2 {
        let wx = (coord.x - self.width as i32 / 2) as f32 * CELL_SIZE + CELL_SIZE * 0.5;
        let wy = (coord.y - self.height as i32 / 2) as f32 * CELL_SIZE + CELL_SIZE * 0.5;
        Vec2::new(wx, wy)
    }

    /// Returns the up-to-4 cardinally adjacent in-bounds coordinates and the
    /// count of valid entries. Use `&result[..count]` to iterate. Probe
    /// order is N, E, S, W.
    pub fn neighbors(&self, coord: CellCoord) -> ([CellCoord; 4], usize) {
        let mut result = [CellCoord::new(0, 0); 4];
        let mut count = 0;
        for (dx, dy) in [(0, 1), (1, 0), (0, -1), (-1, 0)] {
            let n = coord.offset(dx, dy);
            if self.in_bounds(n) {
                result[count] = n;
                count += 1;
            }
        }
        (result, count)
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Bind or clear a cell's primary occupant, keeping the cached occupant
    /// facts and the empty-cell count in sync. Out-of-bounds coordinates are
    /// ignored.
    pub fn set_occupant(&mut self, coord: CellCoord, occupant: Option<OccupantInfo>) {
        if !self.in_bounds(coord) {
            return;
        }
        let idx = self.index(coord);
        let cell = &mut self.cells[idx];
        match occupant {
            Some(info) => {
                if cell.occupant.is_some() {
                    warn!(
                        "overwriting occupant of cell ({}, {}); detach the previous occupant first",
                        coord.x, coord.y
                    );
                } else {
                    self.empty_cells -= 1;
                }
                cell.occupant = Some(info.entity);
                cell.occupant_kind = Some(info.kind);
                cell.occupant_cost = info.movement_cost;
                cell.occupant_template = Some(info.template);
                cell.occupant_blocks_people = info.blocks_people;
            }
            None => {
                if cell.occupant.is_some() {
                    self.empty_cells += 1;
                }
                cell.occupant = None;
                cell.occupant_kind = None;
                cell.occupant_cost = 0;
                cell.occupant_template = None;
                cell.occupant_blocks_people = false;
            }
        }
    }

    /// Terrain movement cost of the cell itself, clamped to at least 1.
    pub fn set_base_cost(&mut self, coord: CellCoord, cost: i32) {
        if self.in_bounds(coord) {
            let idx = self.index(coord);
            self.cells[idx].base_cost = cost.max(1);
        }
    }

    // -----------------------------------------------------------------------
    // Mask overlay
    // -----------------------------------------------------------------------

    pub fn clear_mask(&mut self) {
        for cell in &mut self.cells {
            cell.mask = false;
        }
    }

    pub fn show_mask_at(&mut self, coord: CellCoord) {
        if self.in_bounds(coord) {
            let idx = self.index(coord);
            self.cells[idx].mask = true;
        }
    }

    pub fn mask_at(&self, coord: CellCoord) -> bool {
        self.cell(coord).map(|c| c.mask).unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
