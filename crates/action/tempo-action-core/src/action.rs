//! Action nodes stored in the tree arena.
//!
//! An action is one of three kinds: [`ActionKind::Spawn`] runs its children in
//! parallel, [`ActionKind::Sequence`] runs them one after another, and
//! [`ActionKind::Keyframe`] interpolates property tracks between frames.
//! Timing state common to every kind lives in [`Timing`].

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempo_api_core::{PropertyId, TargetId, TargetKind};

use crate::frame::Frame;
use crate::ids::ActionId;
use crate::track::Track;

pub const MIN_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 10.0;

/// Tag of an action's kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKindTag {
    Spawn,
    Sequence,
    Keyframe,
}

/// Loop, delay and speed bookkeeping. Times are ms.
///
/// Invariant: `delay_elapsed <= delay <= full_duration`.
#[derive(Clone, Debug)]
pub struct Timing {
    /// Requested repeats; `-1` loops forever, `0` plays once.
    pub loop_count: i32,
    pub loop_elapsed: u32,
    pub delay: u64,
    pub delay_elapsed: u64,
    pub speed: f32,
    /// Own duration plus `delay`.
    pub full_duration: u64,
    /// Sub-millisecond part of scaled time not yet handed out.
    carry: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            loop_count: 0,
            loop_elapsed: 0,
            delay: 0,
            delay_elapsed: 0,
            speed: 1.0,
            full_duration: 0,
            carry: 0.0,
        }
    }
}

impl Timing {
    /// Convert a wall-clock span into this action's timeline. The fraction of
    /// a millisecond left over is kept and added to the next span, so many
    /// short ticks at a slow speed add up to the same time as one long tick.
    #[inline]
    pub(crate) fn scale(&mut self, span: u64) -> u64 {
        if self.speed == 1.0 {
            return span;
        }
        let exact = span as f64 * self.speed as f64 + self.carry;
        let whole = exact.floor();
        self.carry = exact - whole;
        whole as u64
    }

    /// Convert leftover time back to wall-clock. Any non-zero surplus stays
    /// non-zero so a finished action is never mistaken for a running one.
    #[inline]
    pub(crate) fn unscale(&self, surplus: u64) -> u64 {
        if surplus == 0 || self.speed == 1.0 {
            surplus
        } else {
            ((surplus as f64 / self.speed as f64).round() as u64).max(1)
        }
    }

    /// Spend `span` on the remaining delay. `None` while still inside the delay,
    /// otherwise the part of `span` left after it.
    pub(crate) fn consume_delay(&mut self, span: u64) -> Option<u64> {
        if self.delay > self.delay_elapsed {
            let remaining = self.delay - self.delay_elapsed;
            if remaining >= span {
                self.delay_elapsed += span;
                return None;
            }
            self.delay_elapsed = self.delay;
            return Some(span - remaining);
        }
        Some(span)
    }

    /// Whether reaching the end wraps around at all.
    #[inline]
    pub(crate) fn loops(&self) -> bool {
        self.loop_count != 0 && self.full_duration > self.delay
    }

    /// Count one more cycle. Returns false when a finite loop count is spent.
    pub(crate) fn next_loop(&mut self) -> bool {
        if self.loop_count > 0 {
            if self.loop_elapsed < self.loop_count as u32 {
                self.loop_elapsed += 1;
            } else {
                return false;
            }
        }
        true
    }

    pub(crate) fn restart(&mut self) {
        self.delay_elapsed = 0;
        self.loop_elapsed = 0;
        self.carry = 0.0;
    }

    pub(crate) fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() {
            1.0
        } else {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        };
    }
}

/// Ordered children of a spawn or sequence, plus a lazily rebuilt
/// child → position index.
#[derive(Clone, Debug, Default)]
pub struct GroupState {
    children: Vec<ActionId>,
    index_cache: Option<HashMap<ActionId, usize>>,
}

impl GroupState {
    #[inline]
    pub fn children(&self) -> &[ActionId] {
        &self.children
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Position of `child`, rebuilding the index if a mutation dropped it.
    pub fn position(&mut self, child: ActionId) -> Option<usize> {
        let children = &self.children;
        let cache = self.index_cache.get_or_insert_with(|| {
            children
                .iter()
                .enumerate()
                .map(|(i, id)| (*id, i))
                .collect()
        });
        debug_assert_eq!(cache.len(), self.children.len());
        cache.get(&child).copied()
    }

    pub(crate) fn insert(&mut self, index: usize, child: ActionId) {
        self.children.insert(index, child);
        self.index_cache = None;
    }

    pub(crate) fn remove(&mut self, index: usize) -> ActionId {
        self.index_cache = None;
        self.children.remove(index)
    }

    pub(crate) fn take_all(&mut self) -> Vec<ActionId> {
        self.index_cache = None;
        std::mem::take(&mut self.children)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SequenceState {
    pub group: GroupState,
    /// Index of the child currently playing; `None` before start.
    pub current: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct KeyframeState {
    pub frames: Vec<Frame>,
    pub tracks: IndexMap<PropertyId, Track>,
    /// Last frame fully reached; `None` before the first advance.
    pub position: Option<usize>,
    /// Local play time in ms, excluding delay.
    pub time: u64,
}

impl KeyframeState {
    /// Local end of the timeline (time of the last frame).
    #[inline]
    pub fn end_time(&self) -> u64 {
        self.frames.last().map(|f| f.time).unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub enum ActionKind {
    Spawn(GroupState),
    Sequence(SequenceState),
    Keyframe(KeyframeState),
}

impl ActionKind {
    pub fn tag(&self) -> ActionKindTag {
        match self {
            ActionKind::Spawn(_) => ActionKindTag::Spawn,
            ActionKind::Sequence(_) => ActionKindTag::Sequence,
            ActionKind::Keyframe(_) => ActionKindTag::Keyframe,
        }
    }

    pub fn group(&self) -> Option<&GroupState> {
        match self {
            ActionKind::Spawn(g) => Some(g),
            ActionKind::Sequence(s) => Some(&s.group),
            ActionKind::Keyframe(_) => None,
        }
    }

    pub(crate) fn group_mut(&mut self) -> Option<&mut GroupState> {
        match self {
            ActionKind::Spawn(g) => Some(g),
            ActionKind::Sequence(s) => Some(&mut s.group),
            ActionKind::Keyframe(_) => None,
        }
    }

    pub fn keyframe(&self) -> Option<&KeyframeState> {
        match self {
            ActionKind::Keyframe(k) => Some(k),
            _ => None,
        }
    }

    pub(crate) fn keyframe_mut(&mut self) -> Option<&mut KeyframeState> {
        match self {
            ActionKind::Keyframe(k) => Some(k),
            _ => None,
        }
    }
}

/// One action in the arena. Children are owned through the parent's
/// [`GroupState`]; a child only remembers its parent's handle.
#[derive(Clone, Debug)]
pub struct ActionNode {
    pub(crate) parent: Option<ActionId>,
    pub(crate) timing: Timing,
    /// Only ever non-empty on a root.
    pub(crate) targets: Vec<TargetId>,
    pub(crate) target_kind: Option<TargetKind>,
    pub(crate) kind: ActionKind,
}

impl ActionNode {
    pub(crate) fn new(kind: ActionKind) -> Self {
        Self {
            parent: None,
            timing: Timing::default(),
            targets: Vec::new(),
            target_kind: None,
            kind,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<ActionId> {
        self.parent
    }

    #[inline]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    #[inline]
    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    #[inline]
    pub fn target_kind(&self) -> Option<TargetKind> {
        self.target_kind
    }

    #[inline]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }
}
