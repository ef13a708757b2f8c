//! Grid A* with a reusable node arena and an intrusive binary heap.
//!
//! Searches are serviced from a request queue, one per simulation tick, and
//! results come back as [`PathComputed`] events — never in the tick the
//! request was submitted.

mod heap;
mod node;

use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

use crate::grid::{CellCoord, Grid};
use crate::presentation::Notification;
use heap::OpenHeap;
use node::NodeArena;

/// 8-connected step offsets, probed in fixed order for determinism.
const MOVEMENTS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PathData {
    /// Cell-center world positions from the first step to the goal. The
    /// start cell is not included.
    pub waypoints: Vec<Vec2>,
}

/// Result of a serviced path request. On failure the path degenerates to a
/// single waypoint at the goal.
#[derive(Event, Debug, Clone)]
pub struct PathComputed {
    pub request_id: u64,
    pub success: bool,
    pub path: PathData,
}

#[derive(Debug, Clone)]
struct PathRequest {
    start: Vec2,
    end: Vec2,
    /// Template ids whose occupants are walked through at cost 1.
    ignore_templates: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pathfinder resource
// ---------------------------------------------------------------------------

#[derive(Resource)]
pub struct Pathfinder {
    queue: VecDeque<u64>,
    requests: HashMap<u64, PathRequest>,
    arena: NodeArena,
    open: OpenHeap,
}

impl Pathfinder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            requests: HashMap::new(),
            arena: NodeArena::new(width, height),
            open: OpenHeap::default(),
        }
    }

    /// Queues a search. A second request with the same id before servicing
    /// replaces the stored request in place; its queue position stays where
    /// the first submission put it.
    pub fn request(
        &mut self,
        request_id: u64,
        start: Vec2,
        end: Vec2,
        ignore_templates: Vec<String>,
    ) {
        let replaced = self
            .requests
            .insert(
                request_id,
                PathRequest {
                    start,
                    end,
                    ignore_templates,
                },
            )
            .is_some();
        if !replaced {
            self.queue.push_back(request_id);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs one synchronous search. `(success, waypoints)`.
    pub fn find_path(
        &mut self,
        grid: &Grid,
        start_world: Vec2,
        end_world: Vec2,
        ignore_templates: &[String],
    ) -> (bool, Vec<Vec2>) {
        let start = grid.world_to_cell(start_world);
        let end = grid.world_to_cell(end_world);
        if !grid.in_bounds(start) || !grid.in_bounds(end) {
            return (false, vec![end_world]);
        }
        if start == end {
            return (true, vec![grid.cell_to_world(end)]);
        }

        self.arena.resize(grid.width(), grid.height());
        self.arena.begin_search();
        self.open.clear();

        let ignored = |template: Option<&str>| {
            template.is_some_and(|t| ignore_templates.iter().any(|i| i == t))
        };

        // index_of is Some for any in-bounds coord, checked above
        let Some(start_idx) = self.arena.index_of(start) else {
            return (false, vec![grid.cell_to_world(end)]);
        };
        let Some(end_idx) = self.arena.index_of(end) else {
            return (false, vec![grid.cell_to_world(end)]);
        };
        {
            let node = self.arena.touch(start_idx);
            node.g = 0;
            node.h = start.manhattan(end);
        }
        self.open.push(self.arena.nodes_mut(), start_idx);

        while let Some(current_idx) = self.open.pop_first(self.arena.nodes_mut()) {
            let current = {
                let node = self.arena.touch(current_idx);
                node.closed = true;
                (node.coord, node.g)
            };
            if current_idx == end_idx {
                return (true, self.retrace(grid, start_idx, end_idx));
            }

            for (dx, dy) in MOVEMENTS {
                let coord = current.0.offset(dx, dy);
                let Some(cell) = grid.cell(coord) else {
                    continue;
                };
                let ignore = ignored(cell.occupant_template());
                if cell.occupant_blocks_people() && !ignore {
                    continue;
                }
                let step_cost = if ignore { 1 } else { cell.cost() };

                let Some(neighbor_idx) = self.arena.index_of(coord) else {
                    continue;
                };
                let new_g = current.1 + step_cost;
                {
                    let node = self.arena.touch(neighbor_idx);
                    if node.closed {
                        continue;
                    }
                    node.h = coord.manhattan(end);
                }
                if !self.open.contains(self.arena.nodes_mut(), neighbor_idx) {
                    let node = self.arena.touch(neighbor_idx);
                    node.g = new_g;
                    node.parent = Some(current_idx);
                    self.open.push(self.arena.nodes_mut(), neighbor_idx);
                } else if new_g < self.arena.node(neighbor_idx).g {
                    let node = self.arena.touch(neighbor_idx);
                    node.g = new_g;
                    node.parent = Some(current_idx);
                    self.open.update(self.arena.nodes_mut(), neighbor_idx);
                }
            }
        }

        (false, vec![grid.cell_to_world(end)])
    }

    fn retrace(&self, grid: &Grid, start_idx: usize, end_idx: usize) -> Vec<Vec2> {
        let mut waypoints = Vec::new();
        let mut idx = end_idx;
        while idx != start_idx {
            let node = self.arena.node(idx);
            waypoints.push(grid.cell_to_world(node.coord));
            match node.parent {
                Some(parent) => idx = parent,
                None => break,
            }
        }
        waypoints.reverse();
        waypoints
    }
}

/// Services at most one queued request per tick.
pub fn service_path_requests(
    grid: Res<Grid>,
    mut pathfinder: ResMut<Pathfinder>,
    mut results: EventWriter<PathComputed>,
    mut notifications: EventWriter<Notification>,
) {
    let Some(request_id) = pathfinder.queue.pop_front() else {
        return;
    };
    let Some(request) = pathfinder.requests.remove(&request_id) else {
        return;
    };
    let (success, waypoints) = pathfinder.find_path(
        &grid,
        request.start,
        request.end,
        &request.ignore_templates,
    );
    if !success {
        debug!("path request {request_id} failed");
        notifications.send(Notification::new("no path found"));
    }
    results.send(PathComputed {
        request_id,
        success,
        path: PathData { waypoints },
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
