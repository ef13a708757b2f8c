use bevy::prelude::*;

use crate::grid::CellCoord;
use crate::objects::{Damageable, GridObject, WaterState};
use crate::test_harness::TestSettlement;

fn flood(sim: &mut TestSettlement, entity: Entity) {
    let mut water = sim.world().get_mut::<WaterState>(entity).unwrap();
    water.fill = 1.0;
    water.flooded = true;
}

#[test]
fn test_ocean_floods_adjacent_roads_over_time() {
    let mut sim = TestSettlement::new();
    let ocean = sim.place("ocean", 5, 5).unwrap();
    let near = sim.place("road", 6, 5).unwrap();
    let far = sim.place("road", 7, 5).unwrap();
    flood(&mut sim, ocean);

    sim.tick(300);
    assert!(sim.world().get::<WaterState>(near).unwrap().flooded);
    assert!(sim.world().get::<WaterState>(far).unwrap().fill > 0.0);
}

#[test]
fn test_sea_wall_keeps_inland_road_dry() {
    let mut sim = TestSettlement::new();
    let ocean = sim.place("ocean", 5, 5).unwrap();
    let wall = sim.place("wall", 6, 5).unwrap();
    let road = sim.place("road", 7, 5).unwrap();
    flood(&mut sim, ocean);

    sim.tick(100);
    // the wall soaks but, while standing, passes nothing on
    let wall_water = sim.world().get::<WaterState>(wall).unwrap();
    if !wall_water.flooded {
        assert_eq!(sim.world().get::<WaterState>(road).unwrap().fill, 0.0);
    }
}

#[test]
fn test_flooded_house_is_ruined() {
    let mut sim = TestSettlement::new();
    let house = sim.place("house", 5, 5).unwrap();
    flood(&mut sim, house);
    sim.world().get_mut::<Damageable>(house).unwrap().health = 1.0;

    sim.tick(5);
    let damageable = sim.world().get::<Damageable>(house).unwrap();
    assert!(!damageable.alive);
    // ruins stay on the grid
    assert!(sim.world().get::<GridObject>(house).unwrap().placed);
    assert!(sim
        .resource::<crate::grid::Grid>()
        .cell(CellCoord::new(5, 5))
        .unwrap()
        .is_occupied());
}

#[test]
fn test_reclaim_after_drain() {
    let mut sim = TestSettlement::new();
    let road = sim.place("road", 5, 5).unwrap();
    {
        let mut water = sim.world().get_mut::<WaterState>(road).unwrap();
        water.fill = 0.2;
        water.flooded = true;
    }
    // default drain 0.05/s, 0.1 of fill to shed: well under 40 ticks
    sim.tick(40);
    let water = sim.world().get::<WaterState>(road).unwrap();
    assert!(!water.flooded);
    assert!(water.fill <= 0.11);
}
