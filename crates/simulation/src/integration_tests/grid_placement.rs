use bevy::prelude::*;

use crate::economy::{ResourceBank, MATERIALS};
use crate::grid::{CellCoord, Grid};
use crate::objects::PlaceRequest;
use crate::presentation::Notification;
use crate::test_harness::TestSettlement;

#[test]
fn test_place_request_event_round_trip() {
    let mut sim = TestSettlement::new();
    sim.world().send_event(PlaceRequest {
        template: "house".to_string(),
        origin: CellCoord::new(5, 5),
    });
    sim.tick(1);
    let grid = sim.resource::<Grid>();
    assert!(grid.cell(CellCoord::new(5, 5)).unwrap().is_occupied());
    assert_eq!(grid.objects.len(), 1);
}

#[test]
fn test_underfunded_place_request_is_dropped_with_notification() {
    let mut sim = TestSettlement::new();
    *sim.world().resource_mut::<ResourceBank>() = ResourceBank::with_starting_balance(1);
    sim.world().send_event(PlaceRequest {
        template: "house".to_string(),
        origin: CellCoord::new(5, 5),
    });
    sim.tick(1);
    assert!(!sim
        .resource::<Grid>()
        .cell(CellCoord::new(5, 5))
        .unwrap()
        .is_occupied());
    let notifications: Vec<Notification> = sim
        .world()
        .resource_mut::<Events<Notification>>()
        .drain()
        .collect();
    assert!(notifications
        .iter()
        .any(|n| n.message.contains("insufficient")));
    assert_eq!(sim.resource::<ResourceBank>().balance(MATERIALS), 1);
}

#[test]
fn test_scenario_startup_is_consistent() {
    let mut sim = TestSettlement::with_scenario();
    let placed = sim.resource::<Grid>().objects.len();
    assert!(placed > 0);
    sim.tick(5);
    // nothing despawns in a calm settlement
    assert_eq!(sim.resource::<Grid>().objects.len(), placed);
}
