mod common;

use common::{approx, MockHost, VIEW};
use tempo_action_core::{ActionId, Config, Curve, Engine, PropertyId, TargetId, Value};

fn ramp(engine: &mut Engine, property: PropertyId, duration: u64, to: f32) -> ActionId {
    let id = engine.create_keyframe();
    engine.add_frame_with_curve(id, 0, Curve::LINEAR).unwrap();
    engine.add_frame_with_curve(id, duration, Curve::LINEAR).unwrap();
    engine.set_frame_value(id, 0, property, Value::f(0.0)).unwrap();
    engine.set_frame_value(id, 1, property, Value::f(to)).unwrap();
    id
}

fn linear_x(engine: &mut Engine, duration: u64, to: f32) -> ActionId {
    ramp(engine, PropertyId::X, duration, to)
}

fn playing(engine: &mut Engine, id: ActionId) {
    engine.bind(id, TargetId(1), VIEW).unwrap();
    engine.play(id).unwrap();
}

/// it should cap a single step at the configured frame delta
#[test]
fn large_gaps_are_clamped() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let id = linear_x(&mut engine, 1000, 1000.0);
    playing(&mut engine, id);

    engine.advance(0, &mut host);
    engine.advance(5000, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 200.0, 1e-2));

    let mut custom = Engine::new(Config {
        max_frame_delta: 50,
        ..Config::default()
    });
    let id = linear_x(&mut custom, 1000, 1000.0);
    playing(&mut custom, id);
    custom.advance(0, &mut host);
    custom.advance(400, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 50.0, 1e-2));
}

/// it should treat the first call as the baseline, whatever the clock reads
#[test]
fn first_call_sets_the_baseline() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let id = linear_x(&mut engine, 1000, 1000.0);
    playing(&mut engine, id);

    engine.advance(1_000_000, &mut host);
    assert_eq!(host.float(1, PropertyId::X), 0.0);
    engine.advance(1_000_100, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 100.0, 1e-2));
}

/// it should not run time backwards when the clock does
#[test]
fn clock_going_backwards_is_a_zero_step() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let id = linear_x(&mut engine, 1000, 1000.0);
    playing(&mut engine, id);

    engine.advance(500, &mut host);
    engine.advance(600, &mut host);
    engine.advance(550, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 100.0, 1e-2));
    engine.advance(650, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 200.0, 1e-2));
}

/// it should carry the overshoot of a frame into the next segment
#[test]
fn overshoot_flows_into_the_next_segment() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let id = engine.create_keyframe();
    for (t, x) in [(0, 0.0), (100, 10.0), (200, 30.0)] {
        let f = engine.add_frame_with_curve(id, t, Curve::LINEAR).unwrap();
        engine.set_frame_value(id, f, PropertyId::X, Value::f(x)).unwrap();
    }
    playing(&mut engine, id);

    engine.advance(0, &mut host);
    engine.advance(150, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 20.0, 1e-3));
    assert_eq!(engine.keyframe(id).unwrap().position, Some(1));
    assert_eq!(engine.keyframe(id).unwrap().time, 150);
}

/// it should wrap an infinite loop without ever finishing
#[test]
fn infinite_loop_keeps_playing() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let id = linear_x(&mut engine, 300, 300.0);
    engine.set_loop(id, -1).unwrap();
    playing(&mut engine, id);

    let mut now = 0;
    while now <= 10_000 {
        engine.advance(now, &mut host);
        now += 100;
    }
    assert!(engine.playing(id));
    // 10_000 ms in, a 300 ms cycle sits 100 ms into its 34th run
    assert!(approx(host.float(1, PropertyId::X), 100.0, 1e-2));
}

/// it should spend a group's delay before any child starts
#[test]
fn group_delay_holds_children_back() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let spawn = engine.create_spawn();
    let a = linear_x(&mut engine, 200, 200.0);
    engine.append(spawn, a).unwrap();
    engine.set_delay(spawn, 100).unwrap();
    assert_eq!(engine.full_duration(spawn).unwrap(), 300);
    playing(&mut engine, spawn);

    engine.advance(0, &mut host);
    engine.advance(100, &mut host);
    assert!(host.value(1, PropertyId::X).is_none());
    engine.advance(200, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 100.0, 1e-2));
    engine.advance(300, &mut host);
    engine.advance(400, &mut host);
    assert!(!engine.playing(spawn));
    assert_eq!(host.float(1, PropertyId::X), 200.0);
}

/// it should restart every child when a looping spawn wraps
#[test]
fn looping_spawn_restarts_children() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let spawn = engine.create_spawn();
    let a = linear_x(&mut engine, 200, 200.0);
    engine.append(spawn, a).unwrap();
    engine.set_loop(spawn, 1).unwrap();
    playing(&mut engine, spawn);

    engine.advance(0, &mut host);
    engine.advance(200, &mut host);
    assert_eq!(host.float(1, PropertyId::X), 200.0);
    engine.advance(300, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 100.0, 1e-2));
    assert_eq!(engine.timing(spawn).unwrap().loop_elapsed, 1);
    engine.advance(400, &mut host);
    engine.advance(500, &mut host);
    assert!(!engine.playing(spawn));
}

/// it should honour slow speeds even when every tick is shorter than a scaled millisecond
#[test]
fn slow_speed_with_short_ticks() {
    for (speed, step, expected) in [(0.1f32, 4u64, 0.2f32), (0.15, 16, 0.3)] {
        let mut engine = Engine::default();
        let mut host = MockHost::default();
        let id = ramp(&mut engine, PropertyId::Opacity, 1000, 1.0);
        engine.set_speed(id, speed).unwrap();
        playing(&mut engine, id);

        let mut now = 0;
        while now <= 2000 {
            engine.advance(now, &mut host);
            now += step;
        }
        let opacity = host.float(1, PropertyId::Opacity);
        assert!(
            approx(opacity, expected, 0.002),
            "speed {speed}, {step} ms ticks: opacity {opacity}, expected {expected}"
        );
    }
}

/// it should stretch a slowed group and hand back its surplus in wall time
#[test]
fn slowed_spawn_finishes_in_wall_time() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let spawn = engine.create_spawn();
    let a = linear_x(&mut engine, 200, 200.0);
    engine.append(spawn, a).unwrap();
    engine.set_speed(spawn, 0.5).unwrap();
    playing(&mut engine, spawn);

    engine.advance(0, &mut host);
    engine.advance(100, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 50.0, 1e-2));
    for now in [200, 300, 400] {
        engine.advance(now, &mut host);
    }
    assert_eq!(host.float(1, PropertyId::X), 200.0);
    assert!(engine.playing(spawn));
    engine.advance(500, &mut host);
    assert!(!engine.playing(spawn));
}

/// it should pass a slowed child's leftover to the next sibling at wall speed
#[test]
fn slowed_child_surplus_is_unscaled_for_the_sequence() {
    let mut engine = Engine::default();
    let mut host = MockHost::default();
    let seq = engine.create_sequence();
    let slow = linear_x(&mut engine, 100, 100.0);
    let next = ramp(&mut engine, PropertyId::Y, 100, 100.0);
    engine.set_speed(slow, 0.5).unwrap();
    engine.append(seq, slow).unwrap();
    engine.append(seq, next).unwrap();
    playing(&mut engine, seq);

    engine.advance(0, &mut host);
    engine.advance(100, &mut host);
    assert!(approx(host.float(1, PropertyId::X), 50.0, 1e-2));
    engine.advance(200, &mut host);
    assert_eq!(host.float(1, PropertyId::X), 100.0);
    assert!(host.value(1, PropertyId::Y).is_none());

    // 25 ms of the slowed timeline left over is 50 ms of wall time for the next child
    engine.advance(250, &mut host);
    assert!(approx(host.float(1, PropertyId::Y), 50.0, 1e-2));
}
