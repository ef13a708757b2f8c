//! Default scenario: a procedurally jittered shoreline along the west edge,
//! a starter settlement behind it, and the first wave countdown running.

use bevy::prelude::*;
use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::agents::spawn_agent;
use crate::config::{GRID_SIZE, WAVE_WARNING_SECS, WAVE_WARNING_TIMER};
use crate::economy::{ResourceBank, MATERIALS};
use crate::grid::{CellCoord, Grid};
use crate::objects::{recalculate_mask, try_place, WaterState};
use crate::sim_rng::DEFAULT_SEED;
use crate::timers::TimerRegistry;

/// Present while the simulation is running; placement recalculates the mask
/// only once this exists.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimulationLive;

/// Insert before the plugin builds to start from an empty grid (the test
/// harness does this).
#[derive(Resource, Debug, Clone, Copy)]
pub struct SkipWorldInit;

/// Number of ocean columns at row `y`, jittered by a noise sample so the
/// shoreline is not a straight line.
fn shore_width(noise: &FastNoiseLite, y: i32) -> i32 {
    let sample = noise.get_noise_2d(0.0, y as f32 * 12.0);
    2 + ((sample + 1.0) * 1.5) as i32
}

pub fn init_world(world: &mut World) {
    if world.contains_resource::<SkipWorldInit>() {
        world.insert_resource(SimulationLive);
        return;
    }

    let mut noise = FastNoiseLite::with_seed(DEFAULT_SEED as i32);
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));

    // scenario construction is free; restore the treasury afterwards
    let budget = world.resource::<ResourceBank>().balance(MATERIALS);
    world.resource_mut::<ResourceBank>().grant(MATERIALS, 100_000);

    // ocean strip along the west edge, permanently flooded
    let size = GRID_SIZE as i32;
    for y in 0..size {
        let width = shore_width(&noise, y);
        for x in 0..width {
            if let Ok(entity) = try_place(world, "ocean", CellCoord::new(x, y)) {
                if let Some(mut water) = world.get_mut::<WaterState>(entity) {
                    water.fill = 1.0;
                    water.flooded = true;
                }
            }
        }
    }

    // rough ground further inland costs more to cross
    {
        let mut grid = world.resource_mut::<Grid>();
        for y in 0..size {
            for x in 0..size {
                let sample = noise.get_noise_2d(x as f32 * 9.0, y as f32 * 9.0);
                if sample > 0.5 {
                    grid.set_base_cost(CellCoord::new(x, y), 2);
                }
            }
        }
    }

    // starter settlement: a sea wall with a pump, a road, housing
    let wall_x = 8;
    for y in 10..22 {
        let _ = try_place(world, "wall", CellCoord::new(wall_x, y));
    }
    let _ = try_place(world, "pump", CellCoord::new(wall_x, 16));
    for y in 10..22 {
        let _ = try_place(world, "road", CellCoord::new(wall_x + 2, y));
    }
    for (x, y) in [(11, 12), (11, 15), (11, 18)] {
        let _ = try_place(world, "house", CellCoord::new(x, y));
    }

    let positions = {
        let grid = world.resource::<Grid>();
        let at = |x: i32, y: i32| grid.cell_to_world(CellCoord::new(x, y));
        [
            ("builder", at(10, 13)),
            ("marshal", at(10, 16)),
            ("civilian", at(12, 14)),
            ("civilian", at(12, 17)),
        ]
    };
    for (template, position) in positions {
        spawn_agent(world, template, position);
    }

    *world.resource_mut::<ResourceBank>() = ResourceBank::with_starting_balance(budget);

    world
        .resource_mut::<TimerRegistry>()
        .start(WAVE_WARNING_TIMER, WAVE_WARNING_SECS);
    world.insert_resource(SimulationLive);
    recalculate_mask(world);

    let grid = world.resource::<Grid>();
    info!(
        "world initialized: {} objects placed, {} cells open",
        grid.objects.len(),
        grid.empty_cells()
    );
}
