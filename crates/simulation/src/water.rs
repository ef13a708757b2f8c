use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::{FLOOD_DAMAGE_PER_SECOND, FLOOD_THRESHOLD, RECLAIM_THRESHOLD};
use crate::grid::Grid;
use crate::objects::{destroy_object, Damageable, GridObject, ObjectKind, WaterState};
use crate::presentation::PresentationEvent;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An object's fill just reached the flood threshold.
#[derive(Event, Debug, Clone, Copy)]
pub struct FloodedEvent {
    pub entity: Entity,
}

/// A flooded object drained back below the reclaim threshold.
#[derive(Event, Debug, Clone, Copy)]
pub struct ReclaimedEvent {
    pub entity: Entity,
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Per-object water facts with attachment delegation already applied.
struct WaterSnap {
    fill: f32,
    height: f32,
    flooded: bool,
    blocks_water: bool,
    fill_rate: f32,
    drain_rate: f32,
}

/// Spreads water between adjacent objects and drains standing water, then
/// latches flood/reclaim transitions.
///
/// The pass works off a snapshot of all water states taken before any
/// mutation, so the outcome does not depend on entity iteration order: every
/// source pushes `source_fill x target_fill_rate x dt` into each occupied
/// cardinal neighbour that sits at equal or lesser height (flooded sources
/// push uphill too), unless the source blocks water and is not itself
/// flooded.
pub fn propagate_water(
    time: Res<Time>,
    grid: Res<Grid>,
    mut objects: Query<(Entity, &GridObject, &mut WaterState)>,
    mut flooded_events: EventWriter<FloodedEvent>,
    mut reclaimed_events: EventWriter<ReclaimedEvent>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    // snapshot with attachment delegation
    let mut snaps: HashMap<Entity, WaterSnap> = HashMap::new();
    let mut attachments: Vec<(Entity, Entity)> = Vec::new();
    for (entity, obj, water) in objects.iter() {
        if !obj.placed || obj.is_attachment {
            continue;
        }
        if let Some(attachment) = obj.attachment {
            attachments.push((entity, attachment));
        }
        snaps.insert(
            entity,
            WaterSnap {
                fill: water.fill,
                height: water.height,
                flooded: water.flooded,
                blocks_water: obj.blocks_water,
                fill_rate: water.fill_rate,
                drain_rate: water.drain_rate,
            },
        );
    }
    // a live attachment overrides its host's rates and blocking
    for (host, attachment) in attachments {
        let Ok((_, att_obj, att_water)) = objects.get(attachment) else {
            continue;
        };
        if att_obj.disabled {
            continue;
        }
        if let Some(snap) = snaps.get_mut(&host) {
            snap.fill_rate = att_water.fill_rate;
            snap.drain_rate = att_water.drain_rate;
            snap.blocks_water = att_obj.blocks_water;
        }
    }

    let mut deltas: HashMap<Entity, f32> = HashMap::new();
    let mut sources: Vec<Entity> = snaps.keys().copied().collect();
    sources.sort();
    for source in &sources {
        let snap = &snaps[source];
        if snap.fill <= 0.0 {
            continue;
        }
        if !snap.blocks_water || snap.flooded {
            if let Ok((_, obj, _)) = objects.get(*source) {
                let coords: Vec<_> = obj.footprint().collect();
                for coord in coords {
                    let (neighbors, count) = grid.neighbors(coord);
                    for neighbor in &neighbors[..count] {
                        let Some(cell) = grid.cell(*neighbor) else {
                            continue;
                        };
                        let Some(target) = cell.occupant else { continue };
                        if target == *source || cell.occupant_kind() == Some(ObjectKind::Agent) {
                            continue;
                        }
                        let Some(target_snap) = snaps.get(&target) else {
                            continue;
                        };
                        if snap.height >= target_snap.height || snap.flooded {
                            *deltas.entry(target).or_insert(0.0) +=
                                snap.fill * target_snap.fill_rate * dt;
                        }
                    }
                }
            }
        }
        *deltas.entry(*source).or_insert(0.0) -= snap.drain_rate * dt;
    }

    // apply and latch transitions
    for source in &sources {
        let Some(delta) = deltas.get(source).copied() else {
            continue;
        };
        if delta == 0.0 {
            continue;
        }
        let Ok((entity, _, mut water)) = objects.get_mut(*source) else {
            continue;
        };
        water.add_fill(delta);
        presentation.send(PresentationEvent::SetFillVisual {
            entity,
            fill: water.fill,
        });
        if !water.flooded && water.fill >= FLOOD_THRESHOLD {
            water.flooded = true;
            info!("object {} flooded", entity);
            flooded_events.send(FloodedEvent { entity });
        } else if water.flooded && water.fill <= RECLAIM_THRESHOLD {
            water.flooded = false;
            info!("object {} reclaimed", entity);
            reclaimed_events.send(ReclaimedEvent { entity });
        }
    }
}

/// Follow-up to [`propagate_water`]: flood disables the host's attachment,
/// reclaim destroys a disabled attachment so the slot opens up again.
pub fn apply_flood_effects(world: &mut World) {
    let flooded: Vec<Entity> = world
        .resource_mut::<Events<FloodedEvent>>()
        .drain()
        .map(|e| e.entity)
        .collect();
    let reclaimed: Vec<Entity> = world
        .resource_mut::<Events<ReclaimedEvent>>()
        .drain()
        .map(|e| e.entity)
        .collect();

    for entity in flooded {
        let Some(obj) = world.get::<GridObject>(entity) else {
            continue;
        };
        if let Some(attachment) = obj.attachment {
            if let Some(mut att_obj) = world.get_mut::<GridObject>(attachment) {
                att_obj.disabled = true;
                warn!("attachment {} disabled by flooding", att_obj.uid);
            }
        }
    }
    for entity in reclaimed {
        let Some(obj) = world.get::<GridObject>(entity) else {
            continue;
        };
        if let Some(attachment) = obj.attachment {
            let disabled = world
                .get::<GridObject>(attachment)
                .is_some_and(|o| o.disabled);
            if disabled {
                destroy_object(world, attachment);
            }
        }
    }
}

/// Standing floodwater erodes damageable objects; at zero hit points the
/// object is ruined but stays on the grid.
pub fn flood_damage(
    time: Res<Time>,
    mut objects: Query<(Entity, &WaterState, &mut Damageable)>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    let dt = time.delta_secs();
    for (entity, water, mut damageable) in objects.iter_mut() {
        if !water.flooded || !damageable.alive {
            continue;
        }
        damageable.health -= FLOOD_DAMAGE_PER_SECOND * dt;
        if damageable.health <= 0.0 {
            damageable.health = 0.0;
            damageable.alive = false;
            warn!("object {} ruined by floodwater", entity);
            presentation.send(PresentationEvent::ObjectRuined { entity });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
