//! Keyframe actions: frame editing, advancing and seeking.

use tempo_api_core::{PropertyId, TargetId, Value};

use crate::action::{ActionNode, KeyframeState, Timing};
use crate::binding::{TargetHost, Tick};
use crate::curve::Curve;
use crate::error::{ActionError, Result};
use crate::frame::Frame;
use crate::ids::ActionId;
use crate::track::Track;
use crate::tree::ActionTree;

impl KeyframeState {
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn track(&self, property: PropertyId) -> Option<&Track> {
        self.tracks.get(&property)
    }

    fn apply_frame(&mut self, f1: usize, tick: &mut Tick<'_>) {
        for track in self.tracks.values_mut() {
            track.transition_frame(f1, tick);
        }
    }

    fn apply_blend(&mut self, f1: usize, f2: usize, x: f32, y: f32, tick: &mut Tick<'_>) {
        for track in self.tracks.values_mut() {
            track.transition(f1, f2, x, y, tick);
        }
    }

    /// Write the value the timeline has at local time `self.time`, with `f1`
    /// the last frame at or before it.
    fn apply_at(&mut self, f1: usize, tick: &mut Tick<'_>) {
        let f2 = f1 + 1;
        if f2 < self.frames.len() {
            let t1 = self.frames[f1].time;
            let t2 = self.frames[f2].time;
            if t2 > t1 {
                let x = self.time.saturating_sub(t1) as f32 / (t2 - t1) as f32;
                let y = self.frames[f1].curve.solve(x, tick.epsilon);
                self.apply_blend(f1, f2, x, y, tick);
                return;
            }
        }
        self.apply_frame(f1, tick);
    }

    /// Walk the frames with `span` ms of budget, starting from `position`.
    /// Returns the surplus once the last frame is passed without looping.
    fn step(&mut self, timing: &mut Timing, id: ActionId, mut span: u64, tick: &mut Tick<'_>) -> u64 {
        'start: loop {
            let mut f1 = self.position.unwrap_or(0);
            let mut f2 = f1 + 1;

            while f2 < self.frames.len() {
                if !tick.root_playing() {
                    return 0;
                }
                let time = self.time + span;
                let t1 = self.frames[f1].time;
                let t2 = self.frames[f2].time;

                if time < t2 {
                    self.time = time;
                    let x = time.saturating_sub(t1) as f32 / (t2 - t1) as f32;
                    let y = self.frames[f1].curve.solve(x, tick.epsilon);
                    self.apply_blend(f1, f2, x, y, tick);
                    return 0;
                }
                if time == t2 {
                    self.time = time;
                    self.position = Some(f2);
                    self.apply_frame(f2, tick);
                    tick.post_keyframe(id, 0, f2, timing.loop_elapsed);
                    return 0;
                }

                span = time - t2;
                self.position = Some(f2);
                self.time = t2;
                tick.post_keyframe(id, span, f2, timing.loop_elapsed);
                f1 = f2;
                f2 += 1;
                if f2 >= self.frames.len() && !timing.loops() {
                    self.apply_frame(f1, tick);
                    return span;
                }
            }

            // resting on the last frame
            if span == 0 || !timing.loops() {
                return span;
            }
            if !timing.next_loop() {
                self.apply_frame(f1, tick);
                return span;
            }
            self.position = Some(0);
            self.time = 0;
            tick.post_loop(id, span, timing.loop_elapsed);
            tick.post_keyframe(id, span, 0, timing.loop_elapsed);
            if !tick.root_playing() {
                return 0;
            }
            continue 'start;
        }
    }
}

fn split_keyframe(node: &mut ActionNode, id: ActionId) -> Result<(&mut Timing, &mut KeyframeState)> {
    let ActionNode { timing, kind, .. } = node;
    let kf = kind
        .keyframe_mut()
        .ok_or(ActionError::NotAKeyframe { action: id })?;
    Ok((timing, kf))
}

impl ActionTree {
    pub(crate) fn keyframe_state(&self, id: ActionId) -> Result<&KeyframeState> {
        self.get(id)?
            .kind
            .keyframe()
            .ok_or(ActionError::NotAKeyframe { action: id })
    }

    fn keyframe_state_mut(&mut self, id: ActionId) -> Result<&mut KeyframeState> {
        self.get_mut(id)?
            .kind
            .keyframe_mut()
            .ok_or(ActionError::NotAKeyframe { action: id })
    }

    /// Append a frame. The first frame always sits at 0; a frame not after
    /// the current last one is pinned to its time.
    pub(crate) fn add_frame(&mut self, id: ActionId, time: u64, curve: Curve) -> Result<usize> {
        let kf = self.keyframe_state_mut(id)?;
        let time = match kf.frames.last() {
            Some(last) => time.max(last.time),
            None => 0,
        };
        let index = kf.frames.len();
        kf.frames.push(Frame::new(index, time, curve));
        for track in kf.tracks.values_mut() {
            track.push_default();
        }
        self.refresh_duration(id);
        Ok(index)
    }

    fn frame_index(&self, id: ActionId, frame: usize) -> Result<()> {
        let len = self.keyframe_state(id)?.frames.len();
        if frame >= len {
            return Err(ActionError::IndexOutOfRange {
                action: id,
                index: frame,
                len,
            });
        }
        Ok(())
    }

    /// Move a frame in time, kept between its neighbours. Frame 0 stays at 0.
    pub(crate) fn set_frame_time(&mut self, id: ActionId, frame: usize, time: u64) -> Result<()> {
        self.frame_index(id, frame)?;
        if frame == 0 {
            return Ok(());
        }
        let kf = self.keyframe_state_mut(id)?;
        let lower = kf.frames[frame - 1].time;
        let upper = kf.frames.get(frame + 1).map(|f| f.time).unwrap_or(u64::MAX);
        kf.frames[frame].time = time.clamp(lower, upper);
        self.refresh_duration(id);
        Ok(())
    }

    pub(crate) fn set_frame_curve(&mut self, id: ActionId, frame: usize, curve: Curve) -> Result<()> {
        self.frame_index(id, frame)?;
        self.keyframe_state_mut(id)?.frames[frame].curve = curve;
        Ok(())
    }

    /// Set a property's value at a frame, creating its track on first use.
    pub(crate) fn set_frame_value(
        &mut self,
        id: ActionId,
        frame: usize,
        property: PropertyId,
        value: Value,
    ) -> Result<()> {
        self.frame_index(id, frame)?;
        if value.kind() != property.value_kind() {
            return Err(ActionError::ValueKindMismatch {
                expected: property.value_kind(),
                actual: value.kind(),
            });
        }
        let kf = self.keyframe_state_mut(id)?;
        let len = kf.frames.len();
        kf.tracks
            .entry(property)
            .or_insert_with(|| Track::new(property, len))
            .set(frame, value);
        Ok(())
    }

    pub(crate) fn frame_value(
        &self,
        id: ActionId,
        frame: usize,
        property: PropertyId,
    ) -> Result<Option<Value>> {
        self.frame_index(id, frame)?;
        Ok(self
            .keyframe_state(id)?
            .tracks
            .get(&property)
            .and_then(|t| t.value(frame))
            .cloned())
    }

    /// Reset every track's value at `frame` to its default.
    pub(crate) fn flush_frame(&mut self, id: ActionId, frame: usize) -> Result<()> {
        self.frame_index(id, frame)?;
        for track in self.keyframe_state_mut(id)?.tracks.values_mut() {
            track.reset(frame);
        }
        Ok(())
    }

    /// Capture live values into `frame`, read from `source` when it matches the
    /// bound kind, otherwise from the root's first bound target.
    pub(crate) fn fetch_frame(
        &mut self,
        id: ActionId,
        frame: usize,
        source: Option<TargetId>,
        host: &dyn TargetHost,
    ) -> Result<()> {
        self.frame_index(id, frame)?;
        let root = self.get(self.root(id))?;
        let bound_kind = root.target_kind;
        let fallback = root.targets.first().copied();

        let from_source = source.and_then(|t| {
            let kind = host.kind(t)?;
            (bound_kind.is_none() || bound_kind == Some(kind)).then_some((t, kind))
        });
        let Some((target, kind)) =
            from_source.or_else(|| Some((fallback?, bound_kind?)))
        else {
            log::debug!("fetch on {id:?} found no target to read from");
            return Ok(());
        };

        for track in self.keyframe_state_mut(id)?.tracks.values_mut() {
            track.fetch(frame, target, kind, host);
        }
        Ok(())
    }

    pub(crate) fn advance_keyframe(
        &mut self,
        id: ActionId,
        span: u64,
        restart: bool,
        tick: &mut Tick<'_>,
    ) -> u64 {
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0;
        };
        let Ok((timing, kf)) = split_keyframe(node, id) else {
            return 0;
        };
        let mut span = timing.scale(span);

        if kf.position.is_none() || restart {
            if restart {
                timing.restart();
                kf.position = None;
                kf.time = 0;
            }
            match timing.consume_delay(span) {
                Some(rest) => span = rest,
                None => return 0,
            }
            if kf.frames.is_empty() {
                return timing.unscale(span);
            }
            kf.position = Some(0);
            kf.time = 0;
            kf.apply_frame(0, tick);
            tick.post_keyframe(id, span, 0, timing.loop_elapsed);
            if span == 0 {
                return 0;
            }
            if kf.frames.len() == 1 {
                return timing.unscale(span);
            }
        }

        let surplus = kf.step(timing, id, span, tick);
        timing.unscale(surplus)
    }

    pub(crate) fn seek_keyframe(&mut self, id: ActionId, time: u64, tick: &mut Tick<'_>) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let Ok((timing, kf)) = split_keyframe(node, id) else {
            return;
        };
        if time < timing.delay {
            timing.delay_elapsed = time;
            kf.position = None;
            kf.time = 0;
            return;
        }
        timing.delay_elapsed = timing.delay;
        timing.loop_elapsed = 0;
        let local = time - timing.delay;
        if kf.frames.is_empty() {
            return;
        }

        let f1 = kf
            .frames
            .iter()
            .rposition(|f| f.time <= local)
            .unwrap_or(0);
        kf.position = Some(f1);
        kf.time = local.min(kf.end_time());
        kf.apply_at(f1, tick);
        if kf.time == kf.frames[f1].time {
            tick.post_keyframe(id, 0, f1, 0);
        }
    }
}
