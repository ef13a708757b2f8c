use crate::config::GRID_SIZE;
use crate::flood_fill::FloodFiller;
use crate::grid::{CellCoord, Grid};
use crate::objects::detach_object;
use crate::test_harness::TestSettlement;

#[test]
fn test_wall_bisects_grid_until_detached() {
    let mut sim = TestSettlement::new();
    sim.world()
        .resource_mut::<crate::economy::ResourceBank>()
        .grant(crate::economy::MATERIALS, 10_000);
    let size = GRID_SIZE as i32;
    let walls: Vec<_> = (0..size)
        .map(|y| sim.place("wall", size / 2, y).unwrap())
        .collect();

    let west = {
        let grid = sim.resource::<Grid>();
        FloodFiller::new(grid).flood_fill(CellCoord::new(0, 0))
    };
    assert!(!west.is_filled(CellCoord::new(size - 1, 0)));
    assert_eq!(west.filled_count(), GRID_SIZE / 2 * GRID_SIZE);

    // tearing the wall down reconnects the halves; fills are snapshots, so
    // the query has to be re-run
    for wall in walls {
        detach_object(sim.world(), wall);
    }
    let rejoined = {
        let grid = sim.resource::<Grid>();
        FloodFiller::new(grid).flood_fill(CellCoord::new(0, 0))
    };
    assert!(rejoined.is_filled(CellCoord::new(size - 1, 0)));
    assert_eq!(rejoined.filled_count(), GRID_SIZE * GRID_SIZE);
}

#[test]
fn test_roads_do_not_cut_connectivity() {
    let mut sim = TestSettlement::new();
    let size = GRID_SIZE as i32;
    for y in 0..size {
        sim.place("road", size / 2, y).unwrap();
    }
    let fill = {
        let grid = sim.resource::<Grid>();
        FloodFiller::new(grid).flood_fill(CellCoord::new(0, 0))
    };
    assert_eq!(fill.filled_count(), GRID_SIZE * GRID_SIZE);
}
