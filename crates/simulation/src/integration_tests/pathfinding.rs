use bevy::prelude::*;

use crate::pathfinder::{PathComputed, Pathfinder};
use crate::test_harness::TestSettlement;

fn drain_results(sim: &mut TestSettlement) -> Vec<PathComputed> {
    sim.world()
        .resource_mut::<Events<PathComputed>>()
        .drain()
        .collect()
}

#[test]
fn test_one_request_serviced_per_tick() {
    let mut sim = TestSettlement::new();
    let targets = [
        (sim.cell_world(1, 1), sim.cell_world(5, 5)),
        (sim.cell_world(2, 2), sim.cell_world(6, 6)),
        (sim.cell_world(3, 3), sim.cell_world(7, 7)),
    ];
    {
        let mut pathfinder = sim.world().resource_mut::<Pathfinder>();
        for (id, (start, end)) in targets.iter().enumerate() {
            pathfinder.request(id as u64, *start, *end, vec![]);
        }
    }
    assert_eq!(sim.resource::<Pathfinder>().pending(), 3);

    sim.tick(1);
    assert_eq!(sim.resource::<Pathfinder>().pending(), 2);
    assert_eq!(drain_results(&mut sim).len(), 1);

    sim.tick(2);
    assert_eq!(sim.resource::<Pathfinder>().pending(), 0);
    assert_eq!(drain_results(&mut sim).len(), 2);
}

#[test]
fn test_requests_serviced_in_submission_order() {
    let mut sim = TestSettlement::new();
    {
        let mut pathfinder = sim.world().resource_mut::<Pathfinder>();
        let start = Vec2::new(0.5, 0.5);
        pathfinder.request(30, start, Vec2::new(3.5, 0.5), vec![]);
        pathfinder.request(10, start, Vec2::new(0.5, 3.5), vec![]);
    }
    sim.tick(1);
    let first = drain_results(&mut sim);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].request_id, 30);
}

#[test]
fn test_rerequest_yields_single_result_for_latest_target() {
    let mut sim = TestSettlement::new();
    let end_a = sim.cell_world(4, 4);
    let end_b = sim.cell_world(10, 10);
    let start = sim.cell_world(1, 1);
    {
        let mut pathfinder = sim.world().resource_mut::<Pathfinder>();
        pathfinder.request(1, start, end_a, vec![]);
        pathfinder.request(1, start, end_b, vec![]);
    }
    sim.tick(2);
    let results = drain_results(&mut sim);
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(*results[0].path.waypoints.last().unwrap(), end_b);
}

#[test]
fn test_walled_goal_reports_failure() {
    let mut sim = TestSettlement::new();
    for (dx, dy) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
        sim.place("wall", 10 + dx, 10 + dy).unwrap();
    }
    let start = sim.cell_world(1, 1);
    let end = sim.cell_world(10, 10);
    sim.world()
        .resource_mut::<Pathfinder>()
        .request(5, start, end, vec![]);
    sim.tick(1);
    let results = drain_results(&mut sim);
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(results[0].path.waypoints, vec![end]);
}
