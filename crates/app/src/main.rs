//! Headless runner: builds the simulation app, lets the stock shoreline
//! scenario ride out a few tsunami cycles, and logs what the water did.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use simulation::economy::{ResourceBank, MATERIALS};
use simulation::objects::{GridObject, ObjectKind, WaterState};
use simulation::presentation::Notification;
use simulation::waves::{WavePhase, WaveState};
use simulation::{SimulationPlugin, TickCounter};

/// The runner exits once this many waves have come and gone.
const WAVES_TO_RIDE_OUT: u32 = 3;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(100))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(SimulationPlugin)
        .add_systems(
            FixedUpdate,
            (surface_notifications, report_flood_stats, exit_when_done).chain(),
        )
        .run();
}

fn surface_notifications(mut notifications: EventReader<Notification>) {
    for note in notifications.read() {
        info!("notice: {}", note.message);
    }
}

// Every 5 simulated seconds: wave phase, how much of the settlement is
// underwater, and what is left in the treasury.
fn report_flood_stats(
    ticks: Res<TickCounter>,
    waves: Res<WaveState>,
    bank: Res<ResourceBank>,
    water: Query<(&GridObject, &WaterState)>,
) {
    if ticks.ticks % 50 != 0 {
        return;
    }
    let mut flooded = 0usize;
    let mut structures = 0usize;
    for (object, state) in water.iter() {
        if object.kind == ObjectKind::Ocean {
            continue;
        }
        structures += 1;
        if state.flooded {
            flooded += 1;
        }
    }
    info!(
        "t={}s wave {} ({:?}): {}/{} structures flooded, {} materials",
        ticks.ticks / 10,
        waves.index,
        waves.phase,
        flooded,
        structures,
        bank.balance(MATERIALS),
    );
}

fn exit_when_done(waves: Res<WaveState>, mut exit: EventWriter<AppExit>) {
    if waves.index > WAVES_TO_RIDE_OUT && waves.phase == WavePhase::Calm {
        info!("rode out {} waves, shutting down", WAVES_TO_RIDE_OUT);
        exit.send(AppExit::Success);
    }
}
