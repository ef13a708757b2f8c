use bevy::prelude::*;

use crate::config::{
    FLOOD_THRESHOLD, TSUNAMI_ATTENUATION, TSUNAMI_FILL_INJECTION, TSUNAMI_RATE_GAIN,
    TSUNAMI_STAGGER_SECS, WAVE_ARRIVAL_SECS, WAVE_ARRIVAL_TIMER, WAVE_RECEDE_SECS,
    WAVE_RECEDE_TIMER, WAVE_WARNING_SECS, WAVE_WARNING_TIMER,
};
use crate::grid::Grid;
use crate::objects::{GridObject, ObjectKind, WaterState};
use crate::presentation::Notification;
use crate::scheduler::{ScheduledTask, ScheduledTasks};
use crate::timers::{TimerExpired, TimerRegistry};
use crate::water::FloodedEvent;

// ---------------------------------------------------------------------------
// Wave state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    Calm,
    Warned,
    Arrived,
}

/// Escalating wave cycle. The index only ever increases, so height and
/// danger are monotone across a run.
#[derive(Resource, Debug, Clone)]
pub struct WaveState {
    pub index: u32,
    pub phase: WavePhase,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            index: 1,
            phase: WavePhase::Calm,
        }
    }
}

impl WaveState {
    pub fn height(&self) -> f32 {
        (self.index * 5) as f32
    }

    pub fn danger(&self) -> f32 {
        (self.index * 2) as f32
    }
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// Advances the Calm -> Warned -> Arrived -> Calm cycle on timer expiry.
/// Arrival drops a full-force hit on every flooded ocean seed; receding
/// clears the per-wave latches and restarts the countdown.
pub fn wave_cycle(
    mut expiries: EventReader<TimerExpired>,
    time: Res<Time>,
    mut wave: ResMut<WaveState>,
    mut timers: ResMut<TimerRegistry>,
    mut tasks: ResMut<ScheduledTasks>,
    mut objects: Query<(Entity, &GridObject, &mut WaterState)>,
    mut notifications: EventWriter<Notification>,
) {
    let now = time.elapsed_secs_f64();
    for expiry in expiries.read() {
        match expiry.id.as_str() {
            WAVE_WARNING_TIMER => {
                wave.phase = WavePhase::Warned;
                timers.start(WAVE_ARRIVAL_TIMER, WAVE_ARRIVAL_SECS);
                notifications.send(Notification::new("wave incoming"));
                info!("wave {} warned, arriving in {WAVE_ARRIVAL_SECS}s", wave.index);
            }
            WAVE_ARRIVAL_TIMER => {
                wave.phase = WavePhase::Arrived;
                info!(
                    "wave {} arrived, height {} danger {}",
                    wave.index,
                    wave.height(),
                    wave.danger()
                );
                let mut seeds: Vec<Entity> = objects
                    .iter()
                    .filter(|(_, obj, water)| {
                        obj.kind == ObjectKind::Ocean && water.flooded
                    })
                    .map(|(entity, ..)| entity)
                    .collect();
                seeds.sort();
                for seed in seeds {
                    tasks.schedule_at(now, ScheduledTask::WaveHit {
                        target: seed,
                        force: 1.0,
                    });
                }
                wave.index += 1;
                timers.start(WAVE_RECEDE_TIMER, WAVE_RECEDE_SECS);
            }
            WAVE_RECEDE_TIMER => {
                wave.phase = WavePhase::Calm;
                for (.., mut water) in objects.iter_mut() {
                    water.wave_latched = false;
                }
                timers.start(WAVE_WARNING_TIMER, WAVE_WARNING_SECS);
                info!("wave receded, next warning in {WAVE_WARNING_SECS}s");
            }
            _ => {}
        }
    }
}

/// Fires due wave hits. A hit latches its target for the rest of the cycle;
/// a flooded target passes the front on to its neighbours with a stagger
/// (attenuated into latched or attachment-bearing cells), an unflooded
/// target absorbs it as immediate fill plus a permanent fill-rate gain
/// scaled by the current wave danger.
pub fn process_wave_hits(
    time: Res<Time>,
    grid: Res<Grid>,
    wave: Res<WaveState>,
    mut tasks: ResMut<ScheduledTasks>,
    mut objects: Query<(&GridObject, &mut WaterState)>,
    mut flooded_events: EventWriter<FloodedEvent>,
) {
    let now = time.elapsed_secs_f64();
    for task in tasks.drain_due(now) {
        let ScheduledTask::WaveHit { target, force } = task;
        let (flooded, coords) = {
            let Ok((obj, mut water)) = objects.get_mut(target) else {
                continue;
            };
            if water.wave_latched {
                continue;
            }
            water.wave_latched = true;
            (water.flooded, obj.footprint().collect::<Vec<_>>())
        };

        if flooded {
            // pass the front on
            let mut hits: Vec<(Entity, f32)> = Vec::new();
            for coord in coords {
                let (neighbors, count) = grid.neighbors(coord);
                for neighbor in &neighbors[..count] {
                    let Some(cell) = grid.cell(*neighbor) else {
                        continue;
                    };
                    let Some(next) = cell.occupant else { continue };
                    if next == target || cell.occupant_kind() == Some(ObjectKind::Agent) {
                        continue;
                    }
                    let Ok((next_obj, next_water)) = objects.get(next) else {
                        continue;
                    };
                    let mut passed = force;
                    if next_water.wave_latched || next_obj.attachment.is_some() {
                        passed *= TSUNAMI_ATTENUATION;
                    }
                    hits.push((next, passed));
                }
            }
            for (next, passed) in hits {
                tasks.schedule_at(
                    now + TSUNAMI_STAGGER_SECS as f64,
                    ScheduledTask::WaveHit {
                        target: next,
                        force: passed,
                    },
                );
            }
        } else if let Ok((_, mut water)) = objects.get_mut(target) {
            // absorb
            water.fill_rate += TSUNAMI_RATE_GAIN * wave.danger() * force;
            water.add_fill(TSUNAMI_FILL_INJECTION * force);
            debug!("wave hit absorbed, force {force}");
            if !water.flooded && water.fill >= FLOOD_THRESHOLD {
                water.flooded = true;
                flooded_events.send(FloodedEvent { entity: target });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
