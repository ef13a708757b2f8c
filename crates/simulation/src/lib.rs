//! Tideholm simulation kernel.
//!
//! A headless coastal-settlement simulation: a shared occupancy grid, a
//! queued A* pathfinder, cell-to-cell water propagation with an escalating
//! tsunami cycle, and FSM-driven agents. Everything runs in `FixedUpdate`
//! at 10 Hz, partitioned into the phases of [`simulation_sets`].

pub mod agents;
pub mod config;
pub mod construction;
pub mod economy;
pub mod flood_fill;
pub mod fsm;
pub mod grid;
pub mod objects;
pub mod pathfinder;
pub mod presentation;
pub mod scheduler;
pub mod sim_rng;
pub mod simulation_sets;
pub mod templates;
pub mod test_harness;
pub mod timers;
pub mod water;
pub mod waves;
pub mod world_init;

#[cfg(test)]
mod integration_tests;

use bevy::prelude::*;

use crate::agents::{agent_water_status, update_agent_brains, PathResultInbox};
use crate::config::GRID_SIZE;
use crate::construction::complete_builds;
use crate::economy::ResourceBank;
use crate::grid::Grid;
use crate::objects::{apply_placements, PlaceRequest};
use crate::pathfinder::{service_path_requests, PathComputed, Pathfinder};
use crate::presentation::{Notification, PresentationEvent};
use crate::scheduler::ScheduledTasks;
use crate::sim_rng::SimRng;
use crate::simulation_sets::SimulationSet;
use crate::templates::TemplateRegistry;
use crate::timers::{tick_timers, TimerExpired, TimerRegistry};
use crate::water::{apply_flood_effects, flood_damage, propagate_water, FloodedEvent, ReclaimedEvent};
use crate::waves::{process_wave_hits, wave_cycle, WaveState};
use crate::world_init::init_world;

/// Monotone count of completed simulation steps.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct TickCounter {
    pub ticks: u64,
}

fn advance_tick(mut counter: ResMut<TickCounter>) {
    counter.ticks += 1;
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(10.0))
            .insert_resource(Grid::new(GRID_SIZE, GRID_SIZE))
            .insert_resource(Pathfinder::new(GRID_SIZE, GRID_SIZE))
            .init_resource::<TemplateRegistry>()
            .init_resource::<ResourceBank>()
            .init_resource::<TimerRegistry>()
            .init_resource::<ScheduledTasks>()
            .init_resource::<WaveState>()
            .init_resource::<SimRng>()
            .init_resource::<PathResultInbox>()
            .init_resource::<TickCounter>()
            .add_event::<PlaceRequest>()
            .add_event::<TimerExpired>()
            .add_event::<PathComputed>()
            .add_event::<FloodedEvent>()
            .add_event::<ReclaimedEvent>()
            .add_event::<PresentationEvent>()
            .add_event::<Notification>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::PreSim,
                    SimulationSet::Simulation,
                    SimulationSet::PostSim,
                )
                    .chain(),
            )
            .add_systems(Startup, init_world)
            .add_systems(FixedUpdate, tick_timers.in_set(SimulationSet::PreSim))
            .add_systems(
                FixedUpdate,
                (
                    apply_placements,
                    wave_cycle,
                    process_wave_hits,
                    propagate_water,
                    apply_flood_effects,
                    flood_damage,
                    complete_builds,
                    service_path_requests,
                    update_agent_brains,
                    agent_water_status,
                )
                    .chain()
                    .in_set(SimulationSet::Simulation),
            )
            .add_systems(FixedUpdate, advance_tick.in_set(SimulationSet::PostSim));
    }
}
