//! Arena holding every action, addressed by [`ActionId`].
//!
//! Structural mutations (attach, remove, clear, destroy) live here together
//! with duration propagation. Advancing and seeking are implemented per kind
//! in `group.rs` and `keyframe.rs`.

use hashbrown::HashMap;

use crate::action::{ActionKind, ActionKindTag, ActionNode};
use crate::binding::Tick;
use crate::error::{ActionError, Result};
use crate::ids::{ActionId, IdAllocator};

#[derive(Debug, Default)]
pub struct ActionTree {
    pub(crate) nodes: HashMap<ActionId, ActionNode>,
    ids: IdAllocator,
}

impl ActionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&mut self, kind: ActionKind) -> ActionId {
        let id = self.ids.alloc_action();
        self.nodes.insert(id, ActionNode::new(kind));
        id
    }

    #[inline]
    pub fn contains(&self, id: ActionId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ActionId) -> Result<&ActionNode> {
        self.nodes
            .get(&id)
            .ok_or(ActionError::ActionNotFound { action: id })
    }

    pub(crate) fn get_mut(&mut self, id: ActionId) -> Result<&mut ActionNode> {
        self.nodes
            .get_mut(&id)
            .ok_or(ActionError::ActionNotFound { action: id })
    }

    /// Topmost ancestor of `id` (itself when unparented).
    pub fn root(&self, id: ActionId) -> ActionId {
        let mut cursor = id;
        while let Some(parent) = self.nodes.get(&cursor).and_then(|n| n.parent) {
            cursor = parent;
        }
        cursor
    }

    /// True if `ancestor` is `id` or one of its parents.
    pub fn is_ancestor(&self, ancestor: ActionId, id: ActionId) -> bool {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            if cur == ancestor {
                return true;
            }
            cursor = self.nodes.get(&cur).and_then(|n| n.parent);
        }
        false
    }

    /// Attach `child` to `group` at `index` (append when `None` or past the end).
    pub(crate) fn attach(
        &mut self,
        group: ActionId,
        index: Option<usize>,
        child: ActionId,
    ) -> Result<()> {
        let len = {
            let node = self.get(group)?;
            node.kind
                .group()
                .ok_or(ActionError::NotAGroup { action: group })?
                .len()
        };
        // past the end appends
        let index = index.map_or(len, |i| i.min(len));

        let child_node = self.get(child)?;
        let illegal = |reason: &'static str| -> Result<()> {
            Err(ActionError::IllegalChild { child, reason })
        };
        if child_node.parent.is_some() {
            return illegal("already has a parent");
        }
        if !child_node.targets.is_empty() {
            return illegal("has bound targets");
        }
        if self.is_ancestor(child, group) {
            return illegal("would create a cycle");
        }

        if let Some(g) = self.get_mut(group)?.kind.group_mut() {
            g.insert(index, child);
        }
        if let ActionKind::Sequence(seq) = &mut self.get_mut(group)?.kind {
            if let Some(current) = seq.current.as_mut() {
                if *current >= index {
                    *current += 1;
                }
            }
        }
        self.get_mut(child)?.parent = Some(group);
        self.refresh_duration(group);
        Ok(())
    }

    /// Detach the child at `index`; it becomes a standalone root.
    pub(crate) fn remove_child(&mut self, group: ActionId, index: usize) -> Result<ActionId> {
        let node = self.get_mut(group)?;
        let g = node
            .kind
            .group_mut()
            .ok_or(ActionError::NotAGroup { action: group })?;
        if index >= g.len() {
            return Err(ActionError::IndexOutOfRange {
                action: group,
                index,
                len: g.len(),
            });
        }
        let child = g.remove(index);
        if let ActionKind::Sequence(seq) = &mut node.kind {
            seq.current = match seq.current {
                Some(c) if c == index => None,
                Some(c) if c > index => Some(c - 1),
                other => other,
            };
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = None;
        }
        self.refresh_duration(group);
        Ok(child)
    }

    /// Remove `id` from its parent, if any.
    pub(crate) fn detach(&mut self, id: ActionId) -> Result<()> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(());
        };
        let index = self
            .get_mut(parent)?
            .kind
            .group_mut()
            .and_then(|g| g.position(id));
        match index {
            Some(index) => self.remove_child(parent, index).map(|_| ()),
            None => {
                debug_assert!(false, "{id:?} missing from its parent {parent:?}");
                self.get_mut(id)?.parent = None;
                Ok(())
            }
        }
    }

    /// Groups detach every child; keyframe actions drop all frames and tracks.
    pub(crate) fn clear(&mut self, id: ActionId) -> Result<()> {
        let node = self.get_mut(id)?;
        let orphans = match &mut node.kind {
            ActionKind::Spawn(g) => g.take_all(),
            ActionKind::Sequence(seq) => {
                seq.current = None;
                seq.group.take_all()
            }
            ActionKind::Keyframe(kf) => {
                kf.frames.clear();
                kf.tracks.clear();
                kf.position = None;
                kf.time = 0;
                Vec::new()
            }
        };
        for child in orphans {
            if let Some(n) = self.nodes.get_mut(&child) {
                n.parent = None;
            }
        }
        self.refresh_duration(id);
        Ok(())
    }

    /// Remove `id` and its whole subtree from the arena. Returns removed ids.
    pub(crate) fn destroy(&mut self, id: ActionId) -> Result<Vec<ActionId>> {
        self.detach(id)?;
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.remove(&cur) {
                if let Some(g) = node.kind.group() {
                    stack.extend_from_slice(g.children());
                }
                removed.push(cur);
            }
        }
        Ok(removed)
    }

    pub(crate) fn set_delay(&mut self, id: ActionId, delay: u64) -> Result<()> {
        let timing = &mut self.get_mut(id)?.timing;
        if timing.delay == delay {
            return Ok(());
        }
        timing.delay = delay;
        timing.delay_elapsed = timing.delay_elapsed.min(delay);
        self.refresh_duration(id);
        Ok(())
    }

    /// Duration of `id` recomputed from its own content.
    fn computed_duration(&self, id: ActionId) -> u64 {
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        let full = |child: &ActionId| {
            self.nodes
                .get(child)
                .map(|n| n.timing.full_duration)
                .unwrap_or(0)
        };
        let own = match &node.kind {
            ActionKind::Spawn(g) => g.children().iter().map(full).max().unwrap_or(0),
            ActionKind::Sequence(seq) => seq.group.children().iter().map(full).sum(),
            ActionKind::Keyframe(kf) => kf.end_time(),
        };
        own + node.timing.delay
    }

    /// Recompute `id`'s duration and walk up until an ancestor is unchanged.
    pub(crate) fn refresh_duration(&mut self, id: ActionId) {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let computed = self.computed_duration(cur);
            let Some(node) = self.nodes.get_mut(&cur) else {
                break;
            };
            if node.timing.full_duration == computed {
                break;
            }
            node.timing.full_duration = computed;
            cursor = node.parent;
        }
        debug_assert!(
            self.durations_consistent(id),
            "duration bookkeeping diverged from children at {id:?}"
        );
    }

    /// Every action from `id` up to its root agrees with its children.
    fn durations_consistent(&self, id: ActionId) -> bool {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let Some(node) = self.nodes.get(&cur) else {
                return true;
            };
            if node.timing.full_duration != self.computed_duration(cur) {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    /// Advance `id` by `span` ms. Returns the unconsumed surplus; non-zero means done.
    pub(crate) fn advance(
        &mut self,
        id: ActionId,
        span: u64,
        restart: bool,
        tick: &mut Tick<'_>,
    ) -> u64 {
        match self.nodes.get(&id).map(|n| n.kind.tag()) {
            Some(ActionKindTag::Spawn) => self.advance_spawn(id, span, restart, tick),
            Some(ActionKindTag::Sequence) => self.advance_sequence(id, span, restart, tick),
            Some(ActionKindTag::Keyframe) => self.advance_keyframe(id, span, restart, tick),
            None => 0,
        }
    }

    /// Jump to absolute time `time` (delay included) within `id`.
    pub(crate) fn seek_time(&mut self, id: ActionId, time: u64, tick: &mut Tick<'_>) {
        match self.nodes.get(&id).map(|n| n.kind.tag()) {
            Some(ActionKindTag::Spawn) => self.seek_spawn(id, time, tick),
            Some(ActionKindTag::Sequence) => self.seek_sequence(id, time, tick),
            Some(ActionKindTag::Keyframe) => self.seek_keyframe(id, time, tick),
            None => {}
        }
    }

    /// Seek `id` to `time` of its local timeline (delay excluded), resolving
    /// through its ancestors.
    pub(crate) fn seek(&mut self, id: ActionId, time: u64, tick: &mut Tick<'_>) -> Result<()> {
        let node = self.get(id)?;
        let time = time
            .saturating_add(node.timing.delay)
            .min(node.timing.full_duration);
        let parent = node.parent;
        match parent {
            Some(parent) => self.seek_before(parent, time, id, tick),
            None => self.seek_time(id, time, tick),
        }
        Ok(())
    }

    /// Convert a child-relative time into `group`'s timeline and keep climbing.
    pub(crate) fn seek_before(
        &mut self,
        group: ActionId,
        time: u64,
        child: ActionId,
        tick: &mut Tick<'_>,
    ) {
        let Some(node) = self.nodes.get_mut(&group) else {
            return;
        };
        let mut time = time + node.timing.delay;
        let parent = node.parent;
        if let ActionKind::Sequence(seq) = &mut node.kind {
            let preceding = seq.group.position(child).unwrap_or(0);
            let before: Vec<ActionId> = seq.group.children()[..preceding].to_vec();
            time += before
                .iter()
                .filter_map(|c| self.nodes.get(c))
                .map(|n| n.timing.full_duration)
                .sum::<u64>();
        }
        match parent {
            Some(parent) => self.seek_before(parent, time, group, tick),
            None => self.seek_time(group, time, tick),
        }
    }
}
