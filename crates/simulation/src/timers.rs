use bevy::prelude::*;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Timer registry
// ---------------------------------------------------------------------------

/// Fired once when a named timer runs out. The timer is removed before the
/// event is visible.
#[derive(Event, Debug, Clone)]
pub struct TimerExpired {
    pub id: String,
}

#[derive(Debug, Clone)]
struct TimerEntry {
    duration: f32,
    elapsed: f32,
}

/// String-keyed one-shot timers. Starting an id that is already running
/// restarts it. Expiry is checked once per tick by [`tick_timers`].
#[derive(Resource, Default)]
pub struct TimerRegistry {
    timers: HashMap<String, TimerEntry>,
}

impl TimerRegistry {
    pub fn start(&mut self, id: impl Into<String>, duration: f32) {
        self.timers.insert(
            id.into(),
            TimerEntry {
                duration,
                elapsed: 0.0,
            },
        );
    }

    /// Returns whether a timer with that id was running.
    pub fn cancel(&mut self, id: &str) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }

    pub fn elapsed(&self, id: &str) -> Option<f32> {
        self.timers.get(id).map(|t| t.elapsed)
    }

    pub fn remaining(&self, id: &str) -> Option<f32> {
        self.timers.get(id).map(|t| (t.duration - t.elapsed).max(0.0))
    }

    /// Advances all timers and drains the expired ids in sorted order.
    pub fn advance(&mut self, dt: f32) -> Vec<String> {
        let mut expired = Vec::new();
        for (id, entry) in &mut self.timers {
            entry.elapsed += dt;
            if entry.elapsed >= entry.duration {
                expired.push(id.clone());
            }
        }
        expired.sort();
        for id in &expired {
            self.timers.remove(id);
        }
        expired
    }
}

pub fn tick_timers(
    time: Res<Time>,
    mut registry: ResMut<TimerRegistry>,
    mut expiries: EventWriter<TimerExpired>,
) {
    for id in registry.advance(time.delta_secs()) {
        debug!("timer {id} expired");
        expiries.send(TimerExpired { id });
    }
}
