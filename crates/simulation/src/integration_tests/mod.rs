//! Whole-kernel tests driven through the headless harness.

mod agents_behavior;
mod connectivity;
mod flooding;
mod grid_placement;
mod pathfinding;
mod waves_cycle;
