//! Concrete behaviour states, generic over any [`AgentOps`] context so the
//! same code drives live agents and test doubles.

use bevy::math::Vec2;

use super::AgentOps;
use crate::fsm::{Fsm, FsmEvent, FsmState, StateCore};

pub const IDLE: i32 = 0;
pub const MOVE: i32 = 1;
pub const WAIT: i32 = 2;
pub const WANDER: i32 = 3;
pub const BUILD: i32 = 4;

// ---------------------------------------------------------------------------
// Idle
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct IdleState {
    core: StateCore,
}

impl IdleState {
    pub fn boxed<C: AgentOps + ?Sized>() -> Box<dyn FsmState<C>> {
        Box::new(Self::default())
    }
}

impl<C: AgentOps + ?Sized> FsmState<C> for IdleState {
    fn state_id(&self) -> i32 {
        IDLE
    }
    fn tag(&self) -> &str {
        "idle"
    }
    fn core(&self) -> &StateCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }
    fn run(&mut self, _ctx: &mut C) {}
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Walks the agent along a computed path to a world position. Requests the
/// path on entry and idles until the result is delivered.
pub struct MoveState {
    core: StateCore,
    target: Vec2,
    ignore_templates: Vec<String>,
    waypoints: Option<Vec<Vec2>>,
    next: usize,
}

impl MoveState {
    pub fn to(target: Vec2) -> Self {
        Self {
            core: StateCore::default(),
            target,
            ignore_templates: Vec::new(),
            waypoints: None,
            next: 0,
        }
    }

    pub fn ignoring(mut self, templates: Vec<String>) -> Self {
        self.ignore_templates = templates;
        self
    }

    pub fn boxed<C: AgentOps + ?Sized>(target: Vec2) -> Box<dyn FsmState<C>> {
        Box::new(Self::to(target))
    }
}

impl<C: AgentOps + ?Sized> FsmState<C> for MoveState {
    fn state_id(&self) -> i32 {
        MOVE
    }
    fn tag(&self) -> &str {
        "move"
    }
    fn core(&self) -> &StateCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn enter(&mut self, ctx: &mut C) {
        if ctx.speed() <= 0.0 {
            self.core.set_error("agent movement speed is zero");
            return;
        }
        ctx.request_path(self.target, self.ignore_templates.clone());
    }

    fn run(&mut self, ctx: &mut C) {
        if self.waypoints.is_none() {
            match ctx.take_path_result() {
                Some((true, waypoints)) => {
                    self.waypoints = Some(waypoints);
                    self.next = 0;
                }
                Some((false, _)) => {
                    self.core.set_error("no path to target");
                    return;
                }
                None => return,
            }
        }
        let Some(waypoints) = &self.waypoints else {
            return;
        };

        let mut position = ctx.position();
        let mut remaining = ctx.speed() * ctx.dt();
        while remaining > 0.0 {
            let Some(waypoint) = waypoints.get(self.next) else {
                self.core.mark_complete();
                break;
            };
            let to_waypoint = *waypoint - position;
            let distance = to_waypoint.length();
            if distance <= remaining {
                position = *waypoint;
                remaining -= distance;
                self.next += 1;
                if self.next == waypoints.len() {
                    self.core.mark_complete();
                    break;
                }
            } else {
                position += to_waypoint / distance * remaining;
                break;
            }
        }
        ctx.set_position(position);
    }
}

// ---------------------------------------------------------------------------
// Wait
// ---------------------------------------------------------------------------

enum WaitDuration {
    Fixed(f32),
    /// Resolved once on entry from the simulation RNG.
    Random { low: f32, high: f32 },
}

pub struct WaitState {
    core: StateCore,
    duration: WaitDuration,
    resolved: f32,
    elapsed: f32,
}

impl WaitState {
    pub fn fixed(seconds: f32) -> Self {
        Self {
            core: StateCore::default(),
            duration: WaitDuration::Fixed(seconds),
            resolved: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn random(low: f32, high: f32) -> Self {
        Self {
            core: StateCore::default(),
            duration: WaitDuration::Random { low, high },
            resolved: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn boxed_random<C: AgentOps + ?Sized>(low: f32, high: f32) -> Box<dyn FsmState<C>> {
        Box::new(Self::random(low, high))
    }
}

impl<C: AgentOps + ?Sized> FsmState<C> for WaitState {
    fn state_id(&self) -> i32 {
        WAIT
    }
    fn tag(&self) -> &str {
        "wait"
    }
    fn core(&self) -> &StateCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn enter(&mut self, ctx: &mut C) {
        self.resolved = match self.duration {
            WaitDuration::Fixed(seconds) => seconds,
            WaitDuration::Random { low, high } => ctx.random_range(low, high),
        };
        self.elapsed = 0.0;
    }

    fn run(&mut self, ctx: &mut C) {
        self.elapsed += ctx.dt();
        if self.elapsed >= self.resolved {
            self.core.mark_complete();
        }
    }
}

// ---------------------------------------------------------------------------
// Wander
// ---------------------------------------------------------------------------

/// Endless stroll: a child machine alternates Move to a random open cell and
/// a random dwell. A failed move picks a fresh destination instead of
/// stalling. Wander itself never completes.
pub struct WanderState<C: ?Sized> {
    core: StateCore,
    child: Option<Fsm<C>>,
}

impl<C: AgentOps + ?Sized + 'static> WanderState<C> {
    pub fn boxed() -> Box<dyn FsmState<C>> {
        Box::new(Self {
            core: StateCore::default(),
            child: None,
        })
    }

    fn next_move(ctx: &mut C) -> Box<dyn FsmState<C>> {
        match ctx.random_open_position() {
            Some(target) => MoveState::boxed(target),
            None => WaitState::boxed_random(1.0, 3.0),
        }
    }
}

impl<C: AgentOps + ?Sized + 'static> FsmState<C> for WanderState<C> {
    fn state_id(&self) -> i32 {
        WANDER
    }
    fn tag(&self) -> &str {
        "wander"
    }
    fn core(&self) -> &StateCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn enter(&mut self, ctx: &mut C) {
        self.child = Some(Fsm::new(Self::next_move(ctx)));
    }

    fn run(&mut self, ctx: &mut C) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        child.tick(ctx);
        for event in child.drain_events() {
            match event {
                FsmEvent::StateComplete { state_id: MOVE, .. } => {
                    child.set_state(WaitState::boxed_random(1.0, 3.0), ctx);
                }
                FsmEvent::StateComplete { state_id: WAIT, .. } => {
                    child.set_state(Self::next_move(ctx), ctx);
                }
                FsmEvent::StateError { .. } => {
                    child.set_state(Self::next_move(ctx), ctx);
                }
                _ => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Walk to a construction site, then stand by until its build finishes.
pub struct BuildState<C: ?Sized> {
    core: StateCore,
    site: Vec2,
    site_uid: String,
    child: Option<Fsm<C>>,
    arrived: bool,
}

impl<C: AgentOps + ?Sized + 'static> BuildState<C> {
    pub fn boxed(site: Vec2, site_uid: String) -> Box<dyn FsmState<C>> {
        Box::new(Self {
            core: StateCore::default(),
            site,
            site_uid,
            child: None,
            arrived: false,
        })
    }
}

impl<C: AgentOps + ?Sized + 'static> FsmState<C> for BuildState<C> {
    fn state_id(&self) -> i32 {
        BUILD
    }
    fn tag(&self) -> &str {
        "build"
    }
    fn core(&self) -> &StateCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn enter(&mut self, _ctx: &mut C) {
        self.child = Some(Fsm::new(MoveState::boxed(self.site)));
        self.arrived = false;
    }

    fn run(&mut self, ctx: &mut C) {
        if !self.arrived {
            let Some(child) = self.child.as_mut() else {
                return;
            };
            child.tick(ctx);
            for event in child.drain_events() {
                match event {
                    FsmEvent::StateComplete { state_id: MOVE, .. } => {
                        self.arrived = true;
                    }
                    FsmEvent::StateError { message, .. } => {
                        self.core.set_error(message);
                        return;
                    }
                    _ => {}
                }
            }
        } else if ctx.is_build_complete(&self.site_uid) {
            self.core.mark_complete();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::Fsm;
    use std::collections::HashSet;

    /// Scripted context: paths come back instantly as a straight line to the
    /// target, randomness is the midpoint of the range.
    struct ScriptedCtx {
        position: Vec2,
        speed: f32,
        dt: f32,
        pending: Option<(bool, Vec<Vec2>)>,
        next_path_succeeds: bool,
        open: Vec<Vec2>,
        open_cursor: usize,
        completed_builds: HashSet<String>,
        requests: u32,
    }

    impl ScriptedCtx {
        fn new(speed: f32) -> Self {
            Self {
                position: Vec2::ZERO,
                speed,
                dt: 0.1,
                pending: None,
                next_path_succeeds: true,
                open: vec![Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)],
                open_cursor: 0,
                completed_builds: HashSet::new(),
                requests: 0,
            }
        }
    }

    impl AgentOps for ScriptedCtx {
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
        fn request_path(&mut self, to: Vec2, _ignore_templates: Vec<String>) {
            self.requests += 1;
            self.pending = Some((self.next_path_succeeds, vec![to]));
        }
        fn take_path_result(&mut self) -> Option<(bool, Vec<Vec2>)> {
            self.pending.take()
        }
        fn random_range(&mut self, low: f32, high: f32) -> f32 {
            (low + high) / 2.0
        }
        fn random_open_position(&mut self) -> Option<Vec2> {
            let pos = self.open[self.open_cursor % self.open.len()];
            self.open_cursor += 1;
            Some(pos)
        }
        fn is_build_complete(&self, uid: &str) -> bool {
            self.completed_builds.contains(uid)
        }
    }

    #[test]
    fn test_move_reaches_target_and_completes() {
        let mut ctx = ScriptedCtx::new(1.0);
        let mut fsm: Fsm<ScriptedCtx> = Fsm::new(MoveState::boxed(Vec2::new(0.5, 0.0)));
        for _ in 0..7 {
            fsm.tick(&mut ctx);
        }
        assert_eq!(ctx.position, Vec2::new(0.5, 0.0));
        assert!(fsm.current_is_complete());
        let events = fsm.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, FsmEvent::StateComplete { state_id: MOVE, .. })));
    }

    #[test]
    fn test_move_with_zero_speed_errors() {
        let mut ctx = ScriptedCtx::new(0.0);
        let mut fsm: Fsm<ScriptedCtx> = Fsm::new(MoveState::boxed(Vec2::new(5.0, 0.0)));
        fsm.tick(&mut ctx);
        let events = fsm.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, FsmEvent::StateError { state_id: MOVE, .. })));
        // no path was ever requested
        assert_eq!(ctx.requests, 0);
    }

    #[test]
    fn test_move_errors_on_failed_path() {
        let mut ctx = ScriptedCtx::new(1.0);
        ctx.next_path_succeeds = false;
        let mut fsm: Fsm<ScriptedCtx> = Fsm::new(MoveState::boxed(Vec2::new(5.0, 0.0)));
        fsm.tick(&mut ctx);
        assert!(fsm
            .drain_events()
            .iter()
            .any(|e| matches!(e, FsmEvent::StateError { .. })));
        assert_eq!(ctx.position, Vec2::ZERO);
    }

    #[test]
    fn test_wait_completes_after_duration() {
        let mut ctx = ScriptedCtx::new(1.0);
        let mut fsm: Fsm<ScriptedCtx> = Fsm::new(Box::new(WaitState::fixed(0.25)));
        fsm.tick(&mut ctx);
        fsm.tick(&mut ctx);
        assert!(!fsm.current_is_complete());
        fsm.tick(&mut ctx);
        assert!(fsm.current_is_complete());
    }

    #[test]
    fn test_wander_alternates_move_and_wait() {
        let mut ctx = ScriptedCtx::new(10.0);
        let mut fsm: Fsm<ScriptedCtx> = Fsm::new(WanderState::boxed());
        let mut saw_wait = false;
        let mut moves = 0;
        let mut last_request_count = 0;
        // speed 10 x dt 0.1 covers any single hop per tick; wander should
        // cycle through several move/wait pairs
        for _ in 0..200 {
            fsm.tick(&mut ctx);
            if ctx.requests > last_request_count {
                moves += 1;
                last_request_count = ctx.requests;
            } else {
                saw_wait = true;
            }
            assert!(!fsm.current_is_complete());
        }
        assert!(moves >= 3);
        assert!(saw_wait);
    }

    #[test]
    fn test_build_waits_for_completion_signal() {
        let mut ctx = ScriptedCtx::new(10.0);
        let mut fsm: Fsm<ScriptedCtx> =
            Fsm::new(BuildState::boxed(Vec2::new(0.5, 0.0), "wall_1".to_string()));
        for _ in 0..10 {
            fsm.tick(&mut ctx);
        }
        // arrived, but the build timer has not fired
        assert_eq!(ctx.position, Vec2::new(0.5, 0.0));
        assert!(!fsm.current_is_complete());

        ctx.completed_builds.insert("wall_1".to_string());
        fsm.tick(&mut ctx);
        assert!(fsm.current_is_complete());
    }
}
