//! Core configuration for tempo-action-core.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;

/// Configuration for the scheduler. Passed to [`Engine::new`](crate::Engine::new).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound (ms) for the time step between two ticks. A host resuming
    /// from sleep advances by at most this much.
    pub max_frame_delta: u64,

    /// Tolerance used when solving a frame curve for its parameter.
    pub curve_epsilon: f32,

    /// Maximum notifications queued per tick; extra ones are dropped.
    pub max_events_per_tick: usize,

    /// Curve given to frames created without an explicit one.
    pub default_curve: Curve,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_frame_delta: 200,
            curve_epsilon: 0.001,
            max_events_per_tick: 1024,
            default_curve: Curve::EASE,
        }
    }
}
