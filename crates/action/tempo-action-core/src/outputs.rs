//! Notifications produced while advancing or seeking actions.
//!
//! Events are queued on an [`Outbox`] during a scheduling pass and drained by
//! the host afterwards, so handlers may mutate the tree freely.

use serde::{Deserialize, Serialize};
use tempo_api_core::TargetId;

use crate::ids::ActionId;

/// Discrete signals emitted while actions advance. One event is queued per
/// target bound to the root of the action that crossed the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActionEvent {
    /// `action` wrapped around to its start.
    Loop {
        action: ActionId,
        root: ActionId,
        target: TargetId,
        /// Time (ms, in the action's scaled timeline) already carried into the new cycle.
        delay: u64,
        loop_count: u32,
    },
    /// `action` reached keyframe `frame`.
    Keyframe {
        action: ActionId,
        root: ActionId,
        target: TargetId,
        /// Time (ms) by which the frame was overshot during this tick.
        delay: u64,
        frame: usize,
        loop_count: u32,
    },
}

impl ActionEvent {
    pub fn action(&self) -> ActionId {
        match self {
            ActionEvent::Loop { action, .. } | ActionEvent::Keyframe { action, .. } => *action,
        }
    }

    pub fn target(&self) -> TargetId {
        match self {
            ActionEvent::Loop { target, .. } | ActionEvent::Keyframe { target, .. } => *target,
        }
    }
}

/// Bounded queue of pending events.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<ActionEvent>,
    posted_this_tick: usize,
    dropped_this_tick: usize,
    cap: usize,
}

impl Outbox {
    pub fn new(max_events_per_tick: usize) -> Self {
        Self {
            events: Vec::new(),
            posted_this_tick: 0,
            dropped_this_tick: 0,
            cap: max_events_per_tick,
        }
    }

    /// Reset the per-pass budget. Pending events stay queued.
    pub fn begin_tick(&mut self) {
        if self.dropped_this_tick > 0 {
            log::warn!(
                "dropped {} action events over the per-tick cap of {}",
                self.dropped_this_tick,
                self.cap
            );
        }
        self.posted_this_tick = 0;
        self.dropped_this_tick = 0;
    }

    #[inline]
    pub fn push(&mut self, event: ActionEvent) {
        if self.posted_this_tick >= self.cap {
            self.dropped_this_tick += 1;
            return;
        }
        self.posted_this_tick += 1;
        self.events.push(event);
    }

    /// Take every queued event. The budget starts over.
    pub fn drain(&mut self) -> Vec<ActionEvent> {
        self.begin_tick();
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
