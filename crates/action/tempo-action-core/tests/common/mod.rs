#![allow(dead_code)]

use std::collections::HashMap;

use tempo_action_core::{
    Accessor, ActionEvent, PropertyId, TargetHost, TargetId, TargetKind, Value,
};

pub const VIEW: TargetKind = TargetKind(1);

/// In-memory host: every target is a `VIEW` exposing every property.
#[derive(Default)]
pub struct MockHost {
    pub values: HashMap<(TargetId, PropertyId), Value>,
    pub writes: usize,
    /// Targets that exist; anything else reports no kind.
    pub live: Vec<TargetId>,
}

impl MockHost {
    pub fn with_targets(targets: &[u64]) -> Self {
        Self {
            live: targets.iter().copied().map(TargetId).collect(),
            ..Self::default()
        }
    }

    pub fn value(&self, target: u64, property: PropertyId) -> Option<&Value> {
        self.values.get(&(TargetId(target), property))
    }

    pub fn float(&self, target: u64, property: PropertyId) -> f32 {
        match self.value(target, property) {
            Some(Value::Float(f)) => *f,
            other => panic!("expected a float for {property}, got {other:?}"),
        }
    }

    pub fn put(&mut self, target: u64, property: PropertyId, value: Value) {
        self.values.insert((TargetId(target), property), value);
    }
}

impl TargetHost for MockHost {
    fn kind(&self, target: TargetId) -> Option<TargetKind> {
        self.live.contains(&target).then_some(VIEW)
    }

    fn resolve(&self, _kind: TargetKind, property: PropertyId) -> Option<Accessor> {
        Some(Accessor::new(property, 0))
    }

    fn get(&self, target: TargetId, accessor: &Accessor) -> Option<Value> {
        self.values.get(&(target, accessor.property)).cloned()
    }

    fn set(&mut self, target: TargetId, accessor: &Accessor, value: &Value) {
        self.writes += 1;
        self.values.insert((target, accessor.property), value.clone());
    }
}

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

pub fn keyframe_hits(events: &[ActionEvent], frame: usize) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ActionEvent::Keyframe { frame: f, .. } if *f == frame))
        .count()
}

pub fn loop_hits(events: &[ActionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ActionEvent::Loop { .. }))
        .count()
}
