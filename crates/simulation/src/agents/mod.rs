//! Agents: mobile entities driven by hierarchical state machines.
//!
//! Brains run over a `dyn AgentOps` context so the state code never sees the
//! ECS. Each tick [`update_agent_brains`] builds a context per agent from
//! the world, runs the machine once, and writes the outcome back. Agents are
//! serviced in ascending entity order, so runs with the same seed replay
//! identically.

pub mod states;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::AGENT_SPEED;
use crate::grid::Grid;
use crate::objects::{Buildable, ConstructionState, GridObject, ObjectKind, WaterState};
use crate::pathfinder::{PathComputed, Pathfinder};
use crate::presentation::{Notification, PresentationEvent};
use crate::sim_rng::SimRng;
use crate::templates::TemplateRegistry;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a behaviour state may do to the world, mediated by the brain
/// update. Path results arrive through here one tick after servicing at the
/// earliest.
pub trait AgentOps: Send + Sync {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn speed(&self) -> f32;
    fn dt(&self) -> f32;
    fn request_path(&mut self, to: Vec2, ignore_templates: Vec<String>);
    fn take_path_result(&mut self) -> Option<(bool, Vec<Vec2>)>;
    fn random_range(&mut self, low: f32, high: f32) -> f32;
    fn random_open_position(&mut self) -> Option<Vec2>;
    fn is_build_complete(&self, uid: &str) -> bool;
}

/// Per-agent context assembled by [`update_agent_brains`]. Owns its data so
/// brains can store it behind a `dyn AgentOps` machine.
struct AgentCtx {
    position: Vec2,
    speed: f32,
    dt: f32,
    rng: ChaCha8Rng,
    open_positions: Arc<Vec<Vec2>>,
    completed_builds: Arc<HashSet<String>>,
    path_result: Option<(bool, Vec<Vec2>)>,
    path_request: Option<(Vec2, Vec<String>)>,
}

impl AgentOps for AgentCtx {
    fn position(&self) -> Vec2 {
        self.position
    }
    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
    fn speed(&self) -> f32 {
        self.speed
    }
    fn dt(&self) -> f32 {
        self.dt
    }
    fn request_path(&mut self, to: Vec2, ignore_templates: Vec<String>) {
        self.path_request = Some((to, ignore_templates));
    }
    fn take_path_result(&mut self) -> Option<(bool, Vec<Vec2>)> {
        self.path_result.take()
    }
    fn random_range(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }
    fn random_open_position(&mut self) -> Option<Vec2> {
        if self.open_positions.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.open_positions.len());
        Some(self.open_positions[index])
    }
    fn is_build_complete(&self, uid: &str) -> bool {
        self.completed_builds.contains(uid)
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Clone)]
pub struct Agent {
    pub uid: String,
    pub template: String,
}

#[derive(Component, Debug, Clone)]
pub struct AgentBody {
    pub position: Vec2,
    pub speed: f32,
    pub swimming: bool,
}

#[derive(Component)]
pub struct AgentBrain {
    pub fsm: crate::fsm::Fsm<dyn AgentOps>,
}

/// Spawns an agent of the given template at a world position. Civilians and
/// marshals wander; builders idle until given work.
pub fn spawn_agent(world: &mut World, template_id: &str, position: Vec2) -> Option<Entity> {
    let kind = world
        .resource::<TemplateRegistry>()
        .get(template_id)
        .map(|t| t.kind);
    if kind != Some(ObjectKind::Agent) {
        warn!("spawn_agent rejected template {template_id}");
        return None;
    }
    let uid = world.resource_mut::<TemplateRegistry>().fresh_uid(template_id);

    let initial: Box<dyn crate::fsm::FsmState<dyn AgentOps>> = match template_id {
        "builder" => states::IdleState::boxed(),
        _ => states::WanderState::boxed(),
    };
    let entity = world
        .spawn((
            Agent {
                uid: uid.clone(),
                template: template_id.to_string(),
            },
            AgentBody {
                position,
                speed: AGENT_SPEED,
                swimming: false,
            },
            AgentBrain {
                fsm: crate::fsm::Fsm::new(initial),
            },
        ))
        .id();
    info!("spawned agent {uid}");
    Some(entity)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Cursor into the path-result stream, so brains consume results without
/// draining the event queue for other readers.
#[derive(Resource, Default)]
pub struct PathResultInbox {
    cursor: EventCursor<PathComputed>,
}

/// Runs every brain once, in ascending entity order.
pub fn update_agent_brains(world: &mut World) {
    let dt = world.resource::<Time>().delta_secs();
    if dt <= 0.0 {
        return;
    }

    // results delivered since last tick, keyed by requesting entity
    let mut results: HashMap<u64, (bool, Vec<Vec2>)> = HashMap::new();
    world.resource_scope(|world, mut inbox: Mut<PathResultInbox>| {
        let events = world.resource::<Events<PathComputed>>();
        for event in inbox.cursor.read(events) {
            results.insert(
                event.request_id,
                (event.success, event.path.waypoints.clone()),
            );
        }
    });

    let open_positions: Arc<Vec<Vec2>> = {
        let grid = world.resource::<Grid>();
        let mut open = Vec::with_capacity(grid.empty_cells());
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let coord = crate::grid::CellCoord::new(x, y);
                if let Some(cell) = grid.cell(coord) {
                    if !cell.is_occupied() {
                        open.push(grid.cell_to_world(coord));
                    }
                }
            }
        }
        Arc::new(open)
    };
    let completed_builds: Arc<HashSet<String>> = {
        let mut done = HashSet::new();
        let mut query = world.query::<(&GridObject, &Buildable)>();
        for (obj, buildable) in query.iter(world) {
            if buildable.state == ConstructionState::Complete {
                done.insert(obj.uid.clone());
            }
        }
        Arc::new(done)
    };

    let mut agents: Vec<Entity> = {
        let mut query = world.query_filtered::<Entity, With<AgentBrain>>();
        query.iter(world).collect()
    };
    agents.sort();

    let mut rng = world.resource::<SimRng>().0.clone();
    for entity in agents {
        let Some(body) = world.get::<AgentBody>(entity) else {
            continue;
        };
        let mut ctx = AgentCtx {
            position: body.position,
            speed: body.speed,
            dt,
            rng,
            open_positions: Arc::clone(&open_positions),
            completed_builds: Arc::clone(&completed_builds),
            path_result: results.remove(&entity.to_bits()),
            path_request: None,
        };
        let events = {
            let Some(mut brain) = world.get_mut::<AgentBrain>(entity) else {
                rng = ctx.rng;
                continue;
            };
            brain.fsm.tick(&mut ctx);
            brain.fsm.drain_events()
        };
        rng = ctx.rng;

        if let Some(mut body) = world.get_mut::<AgentBody>(entity) {
            body.position = ctx.position;
        }
        if let Some((to, ignore_templates)) = ctx.path_request {
            world
                .resource_mut::<Pathfinder>()
                .request(entity.to_bits(), ctx.position, to, ignore_templates);
        }
        for event in events {
            if let crate::fsm::FsmEvent::StateError { state_id, message } = event {
                warn!("agent {entity} state {state_id} error: {message}");
                world.send_event(Notification::new(message));
            }
        }
    }
    world.resource_mut::<SimRng>().0 = rng;
}

/// Flags agents standing on flooded ground and cues swim/wade presentation
/// on transitions.
pub fn agent_water_status(
    grid: Res<Grid>,
    water: Query<&WaterState>,
    mut agents: Query<(Entity, &mut AgentBody)>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    for (entity, mut body) in agents.iter_mut() {
        let in_water = grid
            .cell_at_world(body.position)
            .and_then(|cell| cell.occupant)
            .and_then(|occupant| water.get(occupant).ok())
            .is_some_and(|state| state.flooded);
        if in_water != body.swimming {
            body.swimming = in_water;
            if in_water {
                presentation.send(PresentationEvent::AgentSwimming { entity });
            } else {
                presentation.send(PresentationEvent::AgentWading { entity });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
