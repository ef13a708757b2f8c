//! Deterministic simulation ordering via `SystemSet` phases.
//!
//! Every system in `FixedUpdate` belongs to one of these sets, configured as
//! a chain so inter-plugin ordering is explicit rather than relying on
//! implicit timing assumptions:
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – tick counters, timer expiry, scheduled-task dispatch,
//!   queued placements. These settle shared bookkeeping the core simulation
//!   reads in the same tick.
//! * **Simulation** – the bulk of the kernel: pathfinding service, water
//!   propagation, wave cycle, agent brains, construction.
//! * **PostSim** – flood side effects and aggregation that only react to
//!   what the Simulation phase produced this tick.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Plugins register systems with `.in_set(SimulationSet::X)`, which gives
/// them automatic ordering relative to other phases while retaining the
/// ability to add fine-grained `.after()` / `.before()` constraints within
/// the same phase.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Shared bookkeeping: tick counter, timers, scheduled tasks, placements.
    PreSim,
    /// Core simulation: pathfinding, water, waves, agents, construction.
    Simulation,
    /// Reactions and aggregation over this tick's simulation output.
    PostSim,
}
