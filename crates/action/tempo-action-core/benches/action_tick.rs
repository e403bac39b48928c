//! Per-frame cost of the action center.
//!
//! Run with: `cargo bench -p tempo-action-core`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempo_action_core::{
    Accessor, ActionId, Curve, Engine, PropertyId, TargetHost, TargetId, TargetKind, Value,
};

const VIEW: TargetKind = TargetKind(1);

/// Host that swallows writes.
struct NullHost;

impl TargetHost for NullHost {
    fn kind(&self, _target: TargetId) -> Option<TargetKind> {
        Some(VIEW)
    }

    fn resolve(&self, _kind: TargetKind, property: PropertyId) -> Option<Accessor> {
        Some(Accessor::new(property, 0))
    }

    fn get(&self, _target: TargetId, _accessor: &Accessor) -> Option<Value> {
        None
    }

    fn set(&mut self, _target: TargetId, _accessor: &Accessor, value: &Value) {
        black_box(value);
    }
}

fn pulse(engine: &mut Engine) -> ActionId {
    let id = engine.create_keyframe();
    for (t, o) in [(0, 0.0), (400, 1.0), (800, 0.0)] {
        let f = engine.add_frame_with_curve(id, t, Curve::EASE_IN_OUT).unwrap();
        engine.set_frame_value(id, f, PropertyId::Opacity, Value::f(o)).unwrap();
        engine
            .set_frame_value(id, f, PropertyId::BackgroundColor, Value::rgba(o, 0.5, 1.0 - o, 1.0))
            .unwrap();
    }
    engine.set_loop(id, -1).unwrap();
    id
}

/// `roots` looping roots, each a spawn of a keyframe and a two-step sequence.
fn scene(roots: usize) -> (Engine, Vec<ActionId>) {
    let mut engine = Engine::default();
    let mut ids = Vec::with_capacity(roots);
    for i in 0..roots {
        let spawn = engine.create_spawn();
        let seq = engine.create_sequence();
        let a = pulse(&mut engine);
        let b = pulse(&mut engine);
        let c = pulse(&mut engine);
        engine.append(seq, b).unwrap();
        engine.append(seq, c).unwrap();
        engine.append(spawn, a).unwrap();
        engine.append(spawn, seq).unwrap();
        engine.set_loop(spawn, -1).unwrap();
        engine.bind(spawn, TargetId(i as u64), VIEW).unwrap();
        engine.play(spawn).unwrap();
        ids.push(spawn);
    }
    (engine, ids)
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    for roots in [1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(roots), &roots, |b, &roots| {
            let (mut engine, _) = scene(roots);
            let mut host = NullHost;
            let mut now = 0u64;
            b.iter(|| {
                now += 16;
                engine.advance(now, &mut host);
                black_box(engine.drain_events().len());
            });
        });
    }
    group.finish();
}

fn bench_seek(c: &mut Criterion) {
    let (mut engine, ids) = scene(1);
    let root = ids[0];
    let mut host = NullHost;
    let mut t = 0u64;
    c.bench_function("seek/nested", |b| {
        b.iter(|| {
            t = (t + 37) % 1600;
            engine.seek(root, black_box(t), &mut host).unwrap();
        })
    });
}

criterion_group!(benches, bench_advance, bench_seek);
criterion_main!(benches);
