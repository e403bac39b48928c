//! Per-property value lists inside a keyframe action.

use tempo_api_core::{blend, Accessor, PropertyId, TargetId, TargetKind, Value};

use crate::binding::{TargetHost, Tick};

/// One value per frame for a single property, plus the accessor cached for
/// the kind of targets currently bound.
#[derive(Clone, Debug)]
pub struct Track {
    property: PropertyId,
    values: Vec<Value>,
    resolved: Option<(TargetKind, Option<Accessor>)>,
    current: Option<Value>,
}

impl Track {
    pub(crate) fn new(property: PropertyId, frame_count: usize) -> Self {
        Self {
            property,
            values: vec![property.default_value(); frame_count],
            resolved: None,
            current: None,
        }
    }

    #[inline]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[inline]
    pub fn value(&self, frame: usize) -> Option<&Value> {
        self.values.get(frame)
    }

    /// Last value written by a transition.
    #[inline]
    pub fn current(&self) -> Option<&Value> {
        self.current.as_ref()
    }

    pub(crate) fn set(&mut self, frame: usize, value: Value) {
        debug_assert_eq!(value.kind(), self.property.value_kind());
        if let Some(slot) = self.values.get_mut(frame) {
            *slot = value;
        }
    }

    pub(crate) fn push_default(&mut self) {
        self.values.push(self.property.default_value());
    }

    pub(crate) fn reset(&mut self, frame: usize) {
        if let Some(slot) = self.values.get_mut(frame) {
            *slot = self.property.default_value();
        }
    }

    /// Accessor for `kind`, resolved at most once per kind.
    fn accessor(&mut self, kind: TargetKind, host: &dyn TargetHost) -> Option<Accessor> {
        match self.resolved {
            Some((cached, accessor)) if cached == kind => accessor,
            _ => {
                let accessor = host.resolve(kind, self.property);
                if accessor.is_none() {
                    log::warn!(
                        "targets of kind {} expose no '{}' property; track is inert",
                        kind.0,
                        self.property
                    );
                }
                self.resolved = Some((kind, accessor));
                accessor
            }
        }
    }

    fn write(&mut self, value: Value, tick: &mut Tick<'_>) {
        if let Some(kind) = tick.target_kind {
            if let Some(accessor) = self.accessor(kind, &*tick.host) {
                tick.write(&accessor, &value);
            }
        }
        self.current = Some(value);
    }

    /// Push frame `f1`'s value to every bound target.
    pub(crate) fn transition_frame(&mut self, f1: usize, tick: &mut Tick<'_>) {
        if let Some(value) = self.values.get(f1).cloned() {
            self.write(value, tick);
        }
    }

    /// Push the blend of frames `f1` and `f2` at linear progress `x` / eased progress `y`.
    pub(crate) fn transition(&mut self, f1: usize, f2: usize, x: f32, y: f32, tick: &mut Tick<'_>) {
        let (Some(a), Some(b)) = (self.values.get(f1), self.values.get(f2)) else {
            return;
        };
        let value = blend::interpolate(a, b, x, y);
        self.write(value, tick);
    }

    /// Overwrite frame `frame` with the live value read from `target`.
    pub(crate) fn fetch(
        &mut self,
        frame: usize,
        target: TargetId,
        kind: TargetKind,
        host: &dyn TargetHost,
    ) {
        let Some(accessor) = self.accessor(kind, host) else {
            return;
        };
        match host.get(target, &accessor) {
            Some(value) if value.kind() == self.property.value_kind() => self.set(frame, value),
            Some(value) => log::warn!(
                "host returned a {:?} for '{}', expected {:?}",
                value.kind(),
                self.property,
                self.property.value_kind()
            ),
            None => {}
        }
    }
}
