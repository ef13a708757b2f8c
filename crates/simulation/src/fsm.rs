//! Hierarchical finite state machines for agent behaviour.
//!
//! The framework is plain Rust over a caller-supplied context type; nothing
//! here touches the ECS. A machine owns exactly one live state, keeps a
//! single-slot undo, and collects its lifecycle events in an outbox the
//! owner drains each tick — the machine never advances itself.

use bevy::prelude::warn;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FsmEvent {
    /// Fired on every transition after the first state was installed.
    StateChanged { previous_id: i32, current_id: i32 },
    /// Fired once per state activation, however many times the state marks
    /// itself complete.
    StateComplete { state_id: i32, tag: String },
    /// A state reported a runtime error; no implicit recovery happens.
    StateError { state_id: i32, message: String },
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Book-keeping every state embeds. Completion is a latch: once set it stays
/// set until the state is re-entered.
#[derive(Debug, Clone, Default)]
pub struct StateCore {
    complete: bool,
    paused: bool,
    error: Option<String>,
}

impl StateCore {
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn reset(&mut self) {
        self.complete = false;
        self.paused = false;
        self.error = None;
    }
}

/// One behaviour state. `C` is the context handed down by the machine's
/// owner every tick; `?Sized` so machines can run over trait objects.
pub trait FsmState<C: ?Sized>: Send + Sync {
    fn state_id(&self) -> i32;
    fn tag(&self) -> &str;
    fn core(&self) -> &StateCore;
    fn core_mut(&mut self) -> &mut StateCore;

    fn enter(&mut self, _ctx: &mut C) {}
    fn run(&mut self, ctx: &mut C);
    fn exit(&mut self, _ctx: &mut C) {}
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

pub struct Fsm<C: ?Sized> {
    current: Box<dyn FsmState<C>>,
    previous: Option<Box<dyn FsmState<C>>>,
    outbox: Vec<FsmEvent>,
    entered: bool,
    completion_reported: bool,
    error_reported: bool,
}

impl<C: ?Sized> Fsm<C> {
    /// Installs the initial state without firing a state-changed event.
    pub fn new(initial: Box<dyn FsmState<C>>) -> Self {
        Self {
            current: initial,
            previous: None,
            outbox: Vec::new(),
            entered: false,
            completion_reported: false,
            error_reported: false,
        }
    }

    pub fn current_id(&self) -> i32 {
        self.current.state_id()
    }

    pub fn current_tag(&self) -> &str {
        self.current.tag()
    }

    pub fn current_is_complete(&self) -> bool {
        self.current.core().is_complete()
    }

    /// Runs the current state once and records any completion or error it
    /// produced. Entering happens lazily on the first tick so the owner's
    /// context is available to it.
    pub fn tick(&mut self, ctx: &mut C) {
        if !self.entered {
            self.entered = true;
            self.current.enter(ctx);
        }
        if self.current.core().is_paused() {
            return;
        }
        if !self.current.core().is_complete() && !self.current.core().has_error() {
            self.current.run(ctx);
        }
        self.collect_state_signals();
    }

    /// Transitions to `next`. A transition to an equivalent state — same id
    /// and tag while the current state is still live — is rejected with a
    /// warning and the machine stays put.
    pub fn set_state(&mut self, next: Box<dyn FsmState<C>>, ctx: &mut C) -> bool {
        let live = !self.current.core().is_complete() && !self.current.core().has_error();
        if live
            && self.entered
            && next.state_id() == self.current.state_id()
            && next.tag() == self.current.tag()
        {
            warn!(
                "rejected transition to equivalent state {} ({})",
                next.state_id(),
                next.tag()
            );
            return false;
        }
        let previous_id = self.current.state_id();
        if self.entered {
            self.current.exit(ctx);
        }
        let old = std::mem::replace(&mut self.current, next);
        self.previous = Some(old);
        self.completion_reported = false;
        self.error_reported = false;
        self.current.enter(ctx);
        self.entered = true;
        self.outbox.push(FsmEvent::StateChanged {
            previous_id,
            current_id: self.current.state_id(),
        });
        true
    }

    /// Single-slot undo: swaps back to the previous state and restarts it
    /// from scratch. Does nothing when no previous state exists.
    pub fn revert_to_previous(&mut self, ctx: &mut C) -> bool {
        let Some(mut previous) = self.previous.take() else {
            return false;
        };
        previous.core_mut().reset();
        let previous_id = self.current.state_id();
        self.current.exit(ctx);
        let old = std::mem::replace(&mut self.current, previous);
        self.previous = Some(old);
        self.completion_reported = false;
        self.error_reported = false;
        self.current.enter(ctx);
        self.outbox.push(FsmEvent::StateChanged {
            previous_id,
            current_id: self.current.state_id(),
        });
        true
    }

    /// Takes everything the machine emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<FsmEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn collect_state_signals(&mut self) {
        if self.current.core().is_complete() && !self.completion_reported {
            self.completion_reported = true;
            self.outbox.push(FsmEvent::StateComplete {
                state_id: self.current.state_id(),
                tag: self.current.tag().to_string(),
            });
        }
        if !self.error_reported {
            if let Some(message) = self.current.core().error.clone() {
                self.error_reported = true;
                self.outbox.push(FsmEvent::StateError {
                    state_id: self.current.state_id(),
                    message,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
