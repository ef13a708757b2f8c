use bevy::prelude::*;

/// Fire-and-forget notifications to whatever presentation layer is attached.
/// The simulation never reads these back; a headless run simply drops them.
#[derive(Event, Debug, Clone)]
pub enum PresentationEvent {
    /// Water level changed on an object; fill is in [0, 1].
    SetFillVisual { entity: Entity, fill: f32 },
    /// The object was removed violently.
    ObjectDestroyed { entity: Entity },
    /// A damageable object died; show rubble in place of the model.
    ObjectRuined { entity: Entity },
    /// Construction finished.
    BuildCompleted { entity: Entity },
    /// An agent entered flooded ground.
    AgentSwimming { entity: Entity },
    /// An agent left flooded ground.
    AgentWading { entity: Entity },
}

/// Short user-facing condition strings ("no path found", "insufficient
/// materials").
#[derive(Event, Debug, Clone)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
