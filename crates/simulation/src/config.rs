//! Global tuning constants for the settlement simulation.

/// Number of cells per grid axis.
pub const GRID_SIZE: usize = 32;
/// World-space size of one grid cell.
pub const CELL_SIZE: f32 = 1.0;

/// Base pathfinding cost of an empty cell.
pub const BASE_MOVEMENT_COST: i32 = 1;

/// Fill level at which an object floods. Always exactly full.
pub const FLOOD_THRESHOLD: f32 = 1.0;
/// Fill level at or below which a flooded object is reclaimed.
/// Deliberately far below the flood threshold so objects don't oscillate
/// at the boundary.
pub const RECLAIM_THRESHOLD: f32 = 0.1;

/// Default per-second fill transfer factor for water propagation.
pub const DEFAULT_FILL_RATE: f32 = 0.1;
/// Default per-second drain rate.
pub const DEFAULT_DRAIN_RATE: f32 = 0.05;

/// Hit points lost per second while a damageable object stands flooded.
pub const FLOOD_DAMAGE_PER_SECOND: f32 = 4.0;

/// Seconds of calm before the wave warning goes out.
pub const WAVE_WARNING_SECS: f32 = 45.0;
/// Seconds between the warning and the wave front arriving.
pub const WAVE_ARRIVAL_SECS: f32 = 15.0;
/// Seconds the wave takes to recede after arrival.
pub const WAVE_RECEDE_SECS: f32 = 3.0;

/// Delay between staged tsunami hits, producing a visible wave front.
pub const TSUNAMI_STAGGER_SECS: f32 = 0.15;
/// Immediate fill injected into a cell absorbing a wave hit, scaled by force.
pub const TSUNAMI_FILL_INJECTION: f32 = 0.25;
/// Permanent fill-rate gain per point of wave danger on a hit cell.
pub const TSUNAMI_RATE_GAIN: f32 = 0.005;

/// Timer registry keys for the wave cycle.
pub const WAVE_WARNING_TIMER: &str = "wave_warning";
pub const WAVE_ARRIVAL_TIMER: &str = "wave_arrival";
pub const WAVE_RECEDE_TIMER: &str = "wave_recede";

/// Timer key suffix for construction timers, appended to the object uid.
pub const BUILD_TIMER_SUFFIX: &str = "_build";

/// Force multiplier applied when a wave hit passes into an already-latched
/// or attached neighbour.
pub const TSUNAMI_ATTENUATION: f32 = 0.25;

/// World units per second an agent walks.
pub const AGENT_SPEED: f32 = 1.5;
