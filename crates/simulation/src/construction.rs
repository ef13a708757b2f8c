use bevy::prelude::*;

use crate::config::BUILD_TIMER_SUFFIX;
use crate::grid::Grid;
use crate::objects::{Buildable, ConstructionState, GridObject};
use crate::presentation::PresentationEvent;
use crate::timers::TimerExpired;

/// Finishes construction when an object's `{uid}_build` timer fires.
pub fn complete_builds(
    mut expiries: EventReader<TimerExpired>,
    grid: Res<Grid>,
    mut buildables: Query<(&GridObject, &mut Buildable)>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    for expiry in expiries.read() {
        let Some(uid) = expiry.id.strip_suffix(BUILD_TIMER_SUFFIX) else {
            continue;
        };
        let Some(&entity) = grid.objects.get(uid) else {
            continue;
        };
        let Ok((obj, mut buildable)) = buildables.get_mut(entity) else {
            continue;
        };
        if buildable.state != ConstructionState::Complete {
            buildable.state = ConstructionState::Complete;
            buildable.builder = None;
            info!("construction of {} finished", obj.uid);
            presentation.send(PresentationEvent::BuildCompleted { entity });
        }
    }
}
