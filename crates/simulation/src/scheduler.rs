use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Scheduled tasks
// ---------------------------------------------------------------------------

/// A deferred simulation action with a fire time.
#[derive(Debug, Clone)]
pub enum ScheduledTask {
    /// A staged tsunami front hitting one object.
    WaveHit { target: Entity, force: f32 },
}

#[derive(Debug, Clone)]
struct Entry {
    fire_at: f64,
    seq: u64,
    task: ScheduledTask,
}

/// Time-ordered task queue. Tasks scheduled for the same instant fire in
/// submission order.
#[derive(Resource, Default)]
pub struct ScheduledTasks {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl ScheduledTasks {
    pub fn schedule_at(&mut self, fire_at: f64, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { fire_at, seq, task });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every task due at or before `now`, ordered by
    /// fire time then submission order.
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledTask> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|entry| {
            if entry.fire_at <= now {
                due.push(entry.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.fire_at
                .partial_cmp(&b.fire_at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|entry| entry.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(force: f32) -> ScheduledTask {
        ScheduledTask::WaveHit {
            target: Entity::from_raw(1),
            force,
        }
    }

    fn force_of(task: &ScheduledTask) -> f32 {
        match task {
            ScheduledTask::WaveHit { force, .. } => *force,
        }
    }

    #[test]
    fn test_tasks_fire_in_time_then_submission_order() {
        let mut tasks = ScheduledTasks::default();
        tasks.schedule_at(2.0, hit(3.0));
        tasks.schedule_at(1.0, hit(1.0));
        tasks.schedule_at(1.0, hit(2.0));

        let due = tasks.drain_due(2.5);
        let forces: Vec<f32> = due.iter().map(force_of).collect();
        assert_eq!(forces, vec![1.0, 2.0, 3.0]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_future_tasks_stay_queued() {
        let mut tasks = ScheduledTasks::default();
        tasks.schedule_at(5.0, hit(1.0));
        assert!(tasks.drain_due(4.9).is_empty());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.drain_due(5.0).len(), 1);
    }
}
