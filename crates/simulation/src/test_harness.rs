//! Headless harness for deterministic simulation tests.
//!
//! Wraps an [`App`] built from `MinimalPlugins` + [`SimulationPlugin`] with
//! time advanced manually: every [`TestSettlement::tick`] moves the clock by
//! exactly one fixed timestep, so `FixedUpdate` runs once per tick and runs
//! with the same seed replay identically.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::grid::{CellCoord, Grid};
use crate::objects::{try_place, PlacementError};
use crate::sim_rng::SimRng;
use crate::world_init::SkipWorldInit;
use crate::SimulationPlugin;

/// One fixed step at the 10 Hz simulation rate.
pub const TICK: Duration = Duration::from_millis(100);

pub struct TestSettlement {
    pub app: App,
}

impl TestSettlement {
    /// Blank grid, no scenario.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Full default scenario (shoreline, settlement, agents).
    pub fn with_scenario() -> Self {
        Self::build(false)
    }

    fn build(skip_init: bool) -> Self {
        let mut app = App::new();
        if skip_init {
            app.insert_resource(SkipWorldInit);
        }
        app.add_plugins(MinimalPlugins)
            .add_plugins(SimulationPlugin)
            .insert_resource(TimeUpdateStrategy::ManualDuration(TICK));
        // run Startup so world init and resources settle before the first tick
        app.update();
        Self { app }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.app.insert_resource(SimRng::from_seed(seed));
        self
    }

    /// Advances the simulation by `n` fixed steps.
    pub fn tick(&mut self, n: usize) -> &mut Self {
        for _ in 0..n {
            self.app.update();
        }
        self
    }

    pub fn world(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn place(&mut self, template: &str, x: i32, y: i32) -> Result<Entity, PlacementError> {
        try_place(self.app.world_mut(), template, CellCoord::new(x, y))
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    /// World position of a cell center, for driving agents around.
    pub fn cell_world(&self, x: i32, y: i32) -> Vec2 {
        self.app
            .world()
            .resource::<Grid>()
            .cell_to_world(CellCoord::new(x, y))
    }
}

impl Default for TestSettlement {
    fn default() -> Self {
        Self::new()
    }
}
