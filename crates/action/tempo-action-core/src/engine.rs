//! Engine: the scheduler context owned by the host's event loop.
//!
//! It owns the action arena, the center of playing roots, the event outbox
//! and the configuration. Every command a host issues goes through here.

use serde::{Deserialize, Serialize};
use tempo_api_core::{PropertyId, TargetId, TargetKind, Value};

use crate::action::{
    ActionKind, ActionKindTag, ActionNode, GroupState, KeyframeState, SequenceState, Timing,
};
use crate::binding::{TargetHost, Tick};
use crate::center::ActionCenter;
use crate::config::Config;
use crate::curve::Curve;
use crate::error::{ActionError, Result};
use crate::ids::ActionId;
use crate::outputs::{ActionEvent, Outbox};
use crate::tree::ActionTree;

/// Options for [`Engine::transition`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionCfg {
    pub duration: u64,
    pub delay: u64,
    pub curve: Curve,
}

impl Default for TransitionCfg {
    fn default() -> Self {
        Self {
            duration: 300,
            delay: 0,
            curve: Curve::EASE,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    tree: ActionTree,
    center: ActionCenter,
    outbox: Outbox,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        let outbox = Outbox::new(cfg.max_events_per_tick);
        Self {
            cfg,
            tree: ActionTree::new(),
            center: ActionCenter::new(),
            outbox,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn tree(&self) -> &ActionTree {
        &self.tree
    }

    #[inline]
    pub fn center(&self) -> &ActionCenter {
        &self.center
    }

    // ---------------------------------------------------------------------
    // creation and structure

    pub fn create_spawn(&mut self) -> ActionId {
        self.tree.create(ActionKind::Spawn(GroupState::default()))
    }

    pub fn create_sequence(&mut self) -> ActionId {
        self.tree.create(ActionKind::Sequence(SequenceState::default()))
    }

    pub fn create_keyframe(&mut self) -> ActionId {
        self.tree.create(ActionKind::Keyframe(KeyframeState::default()))
    }

    #[inline]
    pub fn contains(&self, id: ActionId) -> bool {
        self.tree.contains(id)
    }

    pub fn node(&self, id: ActionId) -> Result<&ActionNode> {
        self.tree.get(id)
    }

    pub fn kind(&self, id: ActionId) -> Result<ActionKindTag> {
        Ok(self.tree.get(id)?.kind.tag())
    }

    pub fn parent(&self, id: ActionId) -> Result<Option<ActionId>> {
        Ok(self.tree.get(id)?.parent)
    }

    pub fn root(&self, id: ActionId) -> Result<ActionId> {
        self.tree.get(id)?;
        Ok(self.tree.root(id))
    }

    pub fn children(&self, group: ActionId) -> Result<&[ActionId]> {
        self.tree
            .get(group)?
            .kind
            .group()
            .map(|g| g.children())
            .ok_or(ActionError::NotAGroup { action: group })
    }

    fn check_attachable(&self, child: ActionId) -> Result<()> {
        if self.center.contains(child) {
            return Err(ActionError::IllegalChild {
                child,
                reason: "is playing",
            });
        }
        Ok(())
    }

    /// Append `child` to a spawn or sequence.
    pub fn append(&mut self, group: ActionId, child: ActionId) -> Result<()> {
        self.check_attachable(child)?;
        self.tree.attach(group, None, child)
    }

    /// Insert `child` at `index` of a spawn or sequence. An index past the
    /// last child appends.
    pub fn insert(&mut self, group: ActionId, index: usize, child: ActionId) -> Result<()> {
        self.check_attachable(child)?;
        self.tree.attach(group, Some(index), child)
    }

    /// Detach the child at `index`; it is returned as a standalone root.
    pub fn remove_child(&mut self, group: ActionId, index: usize) -> Result<ActionId> {
        self.tree.remove_child(group, index)
    }

    /// Remove `id` from its parent, if it has one.
    pub fn detach(&mut self, id: ActionId) -> Result<()> {
        self.tree.detach(id)
    }

    /// Detach all children of a group, or drop all frames of a keyframe action.
    pub fn clear(&mut self, id: ActionId) -> Result<()> {
        self.tree.clear(id)
    }

    /// Remove `id` and its subtree.
    ///
    /// # Panics
    /// If `id` is still registered as playing.
    pub fn destroy(&mut self, id: ActionId) -> Result<()> {
        assert!(
            !self.center.contains(id),
            "cannot destroy playing action {id:?}; stop it first"
        );
        let removed = self.tree.destroy(id)?;
        log::debug!("destroyed {} actions under {id:?}", removed.len());
        Ok(())
    }

    // ---------------------------------------------------------------------
    // targets

    /// Bind `target` to a root action. All targets of one action share a kind;
    /// binding a target twice is a no-op.
    pub fn bind(&mut self, action: ActionId, target: TargetId, kind: TargetKind) -> Result<()> {
        let node = self.tree.get_mut(action)?;
        if node.parent.is_some() {
            return Err(ActionError::IllegalRoot { action });
        }
        if let Some(bound) = node.target_kind {
            if !node.targets.is_empty() && bound != kind {
                return Err(ActionError::IllegalTargetKind {
                    action,
                    expected: bound.0,
                    actual: kind.0,
                });
            }
        }
        if node.targets.contains(&target) {
            return Ok(());
        }
        node.targets.push(target);
        node.target_kind = Some(kind);
        Ok(())
    }

    /// Unbind `target`. Removing the last target stops the action.
    pub fn unbind(&mut self, action: ActionId, target: TargetId) -> Result<()> {
        let node = self.tree.get_mut(action)?;
        node.targets.retain(|t| *t != target);
        if node.targets.is_empty() {
            node.target_kind = None;
            self.center.del(action);
        }
        Ok(())
    }

    pub fn targets(&self, action: ActionId) -> Result<&[TargetId]> {
        Ok(&self.tree.get(action)?.targets)
    }

    // ---------------------------------------------------------------------
    // playback

    pub fn play(&mut self, id: ActionId) -> Result<()> {
        let root = self.root(id)?;
        self.center.add(root);
        Ok(())
    }

    pub fn stop(&mut self, id: ActionId) -> Result<()> {
        let root = self.root(id)?;
        self.center.del(root);
        Ok(())
    }

    /// True iff the action's root is registered with the center.
    pub fn playing(&self, id: ActionId) -> bool {
        self.tree.contains(id) && self.center.contains(self.tree.root(id))
    }

    pub fn set_playing(&mut self, id: ActionId, playing: bool) -> Result<()> {
        if playing {
            self.play(id)
        } else {
            self.stop(id)
        }
    }

    /// Jump `id` to `time` (ms) of its own timeline, writing values to the
    /// targets of its root.
    pub fn seek(&mut self, id: ActionId, time: u64, host: &mut dyn TargetHost) -> Result<()> {
        let root = self.root(id)?;
        let root_node = self.tree.get(root)?;
        self.outbox.begin_tick();
        let mut tick = Tick {
            root,
            targets: root_node.targets.clone(),
            target_kind: root_node.target_kind,
            host,
            outbox: &mut self.outbox,
            active: &self.center.active,
            epsilon: self.cfg.curve_epsilon,
        };
        self.tree.seek(id, time, &mut tick)
    }

    pub fn seek_play(&mut self, id: ActionId, time: u64, host: &mut dyn TargetHost) -> Result<()> {
        self.seek(id, time, host)?;
        self.play(id)
    }

    pub fn seek_stop(&mut self, id: ActionId, time: u64, host: &mut dyn TargetHost) -> Result<()> {
        self.seek(id, time, host)?;
        self.stop(id)
    }

    /// Drive all playing actions to wall-clock time `now` (ms).
    pub fn advance(&mut self, now: u64, host: &mut dyn TargetHost) {
        self.center
            .advance(now, &mut self.tree, &mut self.outbox, host, &self.cfg);
    }

    /// Take the notifications queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<ActionEvent> {
        self.outbox.drain()
    }

    // ---------------------------------------------------------------------
    // timing

    pub fn timing(&self, id: ActionId) -> Result<&Timing> {
        Ok(&self.tree.get(id)?.timing)
    }

    /// Duration without delay.
    pub fn duration(&self, id: ActionId) -> Result<u64> {
        let t = self.timing(id)?;
        Ok(t.full_duration - t.delay)
    }

    pub fn full_duration(&self, id: ActionId) -> Result<u64> {
        Ok(self.timing(id)?.full_duration)
    }

    /// `-1` loops forever, `0` plays once, `n` repeats `n` more times.
    pub fn set_loop(&mut self, id: ActionId, loop_count: i32) -> Result<()> {
        self.tree.get_mut(id)?.timing.loop_count = loop_count.max(-1);
        Ok(())
    }

    pub fn set_delay(&mut self, id: ActionId, delay: u64) -> Result<()> {
        self.tree.set_delay(id, delay)
    }

    /// Playback rate, clamped to `[0.1, 10]`.
    pub fn set_speed(&mut self, id: ActionId, speed: f32) -> Result<()> {
        self.tree.get_mut(id)?.timing.set_speed(speed);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // keyframes

    pub fn keyframe(&self, id: ActionId) -> Result<&KeyframeState> {
        self.tree.keyframe_state(id)
    }

    /// Append a frame at `time` with the configured default curve.
    pub fn add_frame(&mut self, id: ActionId, time: u64) -> Result<usize> {
        self.tree.add_frame(id, time, self.cfg.default_curve)
    }

    pub fn add_frame_with_curve(&mut self, id: ActionId, time: u64, curve: Curve) -> Result<usize> {
        self.tree.add_frame(id, time, curve)
    }

    pub fn set_frame_time(&mut self, id: ActionId, frame: usize, time: u64) -> Result<()> {
        self.tree.set_frame_time(id, frame, time)
    }

    pub fn set_frame_curve(&mut self, id: ActionId, frame: usize, curve: Curve) -> Result<()> {
        self.tree.set_frame_curve(id, frame, curve)
    }

    pub fn set_frame_value(
        &mut self,
        id: ActionId,
        frame: usize,
        property: PropertyId,
        value: Value,
    ) -> Result<()> {
        self.tree.set_frame_value(id, frame, property, value)
    }

    pub fn frame_value(
        &self,
        id: ActionId,
        frame: usize,
        property: PropertyId,
    ) -> Result<Option<Value>> {
        self.tree.frame_value(id, frame, property)
    }

    pub fn has_property(&self, id: ActionId, property: PropertyId) -> Result<bool> {
        Ok(self.keyframe(id)?.tracks.contains_key(&property))
    }

    /// Capture live property values into `frame`.
    pub fn fetch_frame(
        &mut self,
        id: ActionId,
        frame: usize,
        source: Option<TargetId>,
        host: &dyn TargetHost,
    ) -> Result<()> {
        self.tree.fetch_frame(id, frame, source, host)
    }

    /// Reset `frame` to default property values.
    pub fn flush_frame(&mut self, id: ActionId, frame: usize) -> Result<()> {
        self.tree.flush_frame(id, frame)
    }

    /// Animate `target` from its current values (or `from`) to `to`, then play.
    pub fn transition(
        &mut self,
        target: TargetId,
        to: &[(PropertyId, Value)],
        from: Option<&[(PropertyId, Value)]>,
        cfg: &TransitionCfg,
        host: &mut dyn TargetHost,
    ) -> Result<ActionId> {
        let kind = host
            .kind(target)
            .ok_or(ActionError::TargetNotFound { target: target.0 })?;
        let id = self.create_keyframe();
        let built = self.build_transition(id, target, kind, to, from, cfg, &*host);
        if let Err(err) = built {
            self.tree.destroy(id)?;
            return Err(err);
        }
        self.play(id)?;
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_transition(
        &mut self,
        id: ActionId,
        target: TargetId,
        kind: TargetKind,
        to: &[(PropertyId, Value)],
        from: Option<&[(PropertyId, Value)]>,
        cfg: &TransitionCfg,
        host: &dyn TargetHost,
    ) -> Result<()> {
        self.tree.add_frame(id, 0, cfg.curve)?;
        self.tree.add_frame(id, cfg.duration, cfg.curve)?;
        self.tree.set_delay(id, cfg.delay)?;
        for (property, value) in to {
            self.tree.set_frame_value(id, 1, *property, value.clone())?;
        }
        self.bind(id, target, kind)?;
        match from {
            Some(from) => {
                for (property, value) in from {
                    self.tree.set_frame_value(id, 0, *property, value.clone())?;
                }
            }
            None => self.tree.fetch_frame(id, 0, Some(target), host)?,
        }
        Ok(())
    }
}
