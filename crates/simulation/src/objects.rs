use bevy::prelude::*;

use crate::config::BUILD_TIMER_SUFFIX;
use crate::economy::{ResourceBank, MATERIALS};
use crate::grid::{CellCoord, Grid, OccupantInfo};
use crate::presentation::{Notification, PresentationEvent};
use crate::templates::{ObjectTemplate, TemplateRegistry};
use crate::timers::TimerRegistry;
use crate::world_init::SimulationLive;

// ---------------------------------------------------------------------------
// Kinds and components
// ---------------------------------------------------------------------------

/// Coarse occupant category. Grid-only readers branch on this instead of
/// touching the ECS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Wall,
    Road,
    House,
    Pump,
    Ocean,
    Agent,
}

impl ObjectKind {
    /// Whether an occupant of this kind stops the flood-fill scan.
    pub fn blocks_fill(self) -> bool {
        matches!(self, ObjectKind::Wall)
    }
}

/// Identity and placement state of an object on the grid. Capability
/// components ([`WaterState`], [`Buildable`], [`Damageable`]) are added
/// per-instance from the template.
#[derive(Component, Debug, Clone)]
pub struct GridObject {
    pub uid: String,
    pub kind: ObjectKind,
    pub template: String,
    pub origin: CellCoord,
    pub size: UVec2,
    pub placed: bool,
    pub attachable: bool,
    pub is_attachment: bool,
    pub blocks_water: bool,
    pub blocks_people: bool,
    pub movement_cost: i32,
    /// Hosted attachment, at most one.
    pub attachment: Option<Entity>,
    /// Host back-reference when this object is an attachment.
    pub parent: Option<Entity>,
    /// Set when a host floods; a disabled attachment contributes nothing.
    pub disabled: bool,
}

impl GridObject {
    pub fn footprint(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let origin = self.origin;
        let size = self.size;
        (0..size.y as i32)
            .flat_map(move |dy| (0..size.x as i32).map(move |dx| origin.offset(dx, dy)))
    }
}

/// Water accumulation on one object. Fill is always clamped to [0, 1];
/// crossing the thresholds is handled by the water systems, not here.
#[derive(Component, Debug, Clone)]
pub struct WaterState {
    pub fill: f32,
    pub height: f32,
    pub fill_rate: f32,
    pub drain_rate: f32,
    pub flooded: bool,
    /// One wave hit per cycle; cleared when the wave recedes.
    pub wave_latched: bool,
}

impl WaterState {
    pub fn from_template(template: &ObjectTemplate) -> Self {
        Self {
            fill: 0.0,
            height: template.height,
            fill_rate: template.fill_rate,
            drain_rate: template.drain_rate,
            flooded: false,
            wave_latched: false,
        }
    }

    pub fn add_fill(&mut self, amount: f32) {
        self.fill = (self.fill + amount).clamp(0.0, 1.0);
    }

    pub fn is_full(&self) -> bool {
        self.fill >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionState {
    Planned,
    Complete,
}

/// Present on objects that go through construction after placement.
#[derive(Component, Debug, Clone)]
pub struct Buildable {
    pub build_time: f32,
    pub builder: Option<Entity>,
    pub state: ConstructionState,
}

/// Present on objects that can take flood damage and die.
#[derive(Component, Debug, Clone)]
pub struct Damageable {
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
}

impl Damageable {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementSpot {
    /// All footprint cells are free.
    Free,
    /// The target cell's occupant hosts this object as its attachment.
    Attach(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    UnknownTemplate,
    OutOfBounds,
    Occupied,
    /// An attachment template was aimed at a cell with no attachable host.
    NoHost,
    InsufficientFunds,
}

/// Queued placement, applied by [`apply_placements`] once per tick.
#[derive(Event, Debug, Clone)]
pub struct PlaceRequest {
    pub template: String,
    pub origin: CellCoord,
}

/// Validate a placement without mutating anything. `dragged` names an entity
/// whose current attachment slot should still count as available, so
/// re-validating the same spot while dragging an attachment succeeds.
pub fn can_be_placed(
    world: &World,
    template: &ObjectTemplate,
    origin: CellCoord,
    dragged: Option<Entity>,
) -> Result<PlacementSpot, PlacementError> {
    let grid = world.resource::<Grid>();

    if template.is_attachment {
        let cell = grid.cell(origin).ok_or(PlacementError::OutOfBounds)?;
        let host = cell.occupant.ok_or(PlacementError::NoHost)?;
        let host_obj = world.get::<GridObject>(host).ok_or(PlacementError::NoHost)?;
        if !host_obj.attachable {
            return Err(PlacementError::NoHost);
        }
        match host_obj.attachment {
            None => Ok(PlacementSpot::Attach(host)),
            Some(existing) if Some(existing) == dragged => Ok(PlacementSpot::Attach(host)),
            Some(_) => Err(PlacementError::Occupied),
        }
    } else {
        for dy in 0..template.size.y as i32 {
            for dx in 0..template.size.x as i32 {
                let coord = origin.offset(dx, dy);
                let cell = grid.cell(coord).ok_or(PlacementError::OutOfBounds)?;
                if cell.is_occupied() {
                    return Err(PlacementError::Occupied);
                }
            }
        }
        Ok(PlacementSpot::Free)
    }
}

/// Place a template instance at `origin`: validates, spends materials, spawns
/// the entity with its capability components, binds grid cells (or the
/// attachment slot), and starts the build timer for buildables.
pub fn try_place(
    world: &mut World,
    template_id: &str,
    origin: CellCoord,
) -> Result<Entity, PlacementError> {
    let template = match world.resource::<TemplateRegistry>().get(template_id) {
        Some(t) => t.clone(),
        None => {
            warn!("placement rejected: unknown template {template_id}");
            return Err(PlacementError::UnknownTemplate);
        }
    };
    let spot = can_be_placed(world, &template, origin, None)?;

    if template.cost > 0
        && !world
            .resource_mut::<ResourceBank>()
            .spend(MATERIALS, template.cost)
    {
        world.send_event(Notification::new("insufficient materials"));
        return Err(PlacementError::InsufficientFunds);
    }

    let uid = world.resource_mut::<TemplateRegistry>().fresh_uid(template_id);

    let mut entity = world.spawn(GridObject {
        uid: uid.clone(),
        kind: template.kind,
        template: template.id.clone(),
        origin,
        size: template.size,
        placed: true,
        attachable: template.attachable,
        is_attachment: template.is_attachment,
        blocks_water: template.blocks_water,
        blocks_people: template.blocks_people,
        movement_cost: template.movement_cost,
        attachment: None,
        parent: None,
        disabled: false,
    });
    if template.kind != ObjectKind::Agent {
        entity.insert(WaterState::from_template(&template));
    }
    if let Some(build_time) = template.build_time {
        entity.insert(Buildable {
            build_time,
            builder: None,
            state: ConstructionState::Planned,
        });
    }
    if let Some(max_health) = template.max_health {
        entity.insert(Damageable::new(max_health));
    }
    let id = entity.id();

    match spot {
        PlacementSpot::Attach(host) => {
            if let Some(mut obj) = world.get_mut::<GridObject>(id) {
                obj.parent = Some(host);
            }
            if let Some(mut host_obj) = world.get_mut::<GridObject>(host) {
                host_obj.attachment = Some(id);
            }
        }
        PlacementSpot::Free => {
            let info = OccupantInfo {
                entity: id,
                kind: template.kind,
                movement_cost: template.movement_cost,
                template: template.id.clone(),
                blocks_people: template.blocks_people,
            };
            let mut grid = world.resource_mut::<Grid>();
            for dy in 0..template.size.y as i32 {
                for dx in 0..template.size.x as i32 {
                    grid.set_occupant(origin.offset(dx, dy), Some(info.clone()));
                }
            }
        }
    }
    world.resource_mut::<Grid>().objects.insert(uid.clone(), id);

    if let Some(build_time) = template.build_time {
        world
            .resource_mut::<TimerRegistry>()
            .start(format!("{uid}{BUILD_TIMER_SUFFIX}"), build_time);
    }

    if world.contains_resource::<SimulationLive>() {
        recalculate_mask(world);
    }

    info!(
        "placed {uid} at ({}, {})",
        origin.x, origin.y
    );
    Ok(id)
}

/// Remove an object from the grid without despawning it: footprint cells (or
/// the attachment slot) are released and the uid is dropped from the object
/// index. The entity survives, so a drag can re-place it.
pub fn detach_object(world: &mut World, entity: Entity) {
    let Some(obj) = world.get::<GridObject>(entity).cloned() else {
        return;
    };
    if let Some(host) = obj.parent {
        if let Some(mut host_obj) = world.get_mut::<GridObject>(host) {
            if host_obj.attachment == Some(entity) {
                host_obj.attachment = None;
            }
        }
    } else {
        let coords: Vec<CellCoord> = obj.footprint().collect();
        let mut grid = world.resource_mut::<Grid>();
        for coord in coords {
            grid.set_occupant(coord, None);
        }
    }
    if let Some(mut obj) = world.get_mut::<GridObject>(entity) {
        obj.placed = false;
        obj.parent = None;
    }
    world.resource_mut::<Grid>().objects.remove(&obj.uid);
    if world.contains_resource::<SimulationLive>() {
        recalculate_mask(world);
    }
}

/// Detach and despawn, notifying presentation.
pub fn destroy_object(world: &mut World, entity: Entity) {
    let Some(obj) = world.get::<GridObject>(entity).cloned() else {
        return;
    };
    detach_object(world, entity);
    if let Some(attachment) = obj.attachment {
        destroy_object(world, attachment);
    }
    world.send_event(PresentationEvent::ObjectDestroyed { entity });
    world.despawn(entity);
    info!("destroyed {}", obj.uid);
}

/// Rebuild the mask overlay from every placed object's footprint.
pub fn recalculate_mask(world: &mut World) {
    world.resource_scope(|world, mut grid: Mut<Grid>| {
        grid.clear_mask();
        let entities: Vec<Entity> = grid.objects.values().copied().collect();
        for entity in entities {
            if let Some(obj) = world.get::<GridObject>(entity) {
                if obj.is_attachment {
                    continue;
                }
                let coords: Vec<CellCoord> = obj.footprint().collect();
                for coord in coords {
                    grid.show_mask_at(coord);
                }
            }
        }
    });
}

/// Drains queued [`PlaceRequest`]s. Failures are logged and dropped; the
/// request carries no reply channel.
pub fn apply_placements(world: &mut World) {
    let requests: Vec<PlaceRequest> = world
        .resource_mut::<Events<PlaceRequest>>()
        .drain()
        .collect();
    for request in requests {
        if let Err(err) = try_place(world, &request.template, request.origin) {
            warn!(
                "placement of {} at ({}, {}) rejected: {:?}",
                request.template, request.origin.x, request.origin.y, err
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
