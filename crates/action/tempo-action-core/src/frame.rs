//! Keyframes: a point on a keyframe action's local timeline.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;

/// A frame owned by a keyframe action. `curve` eases the segment that
/// starts at this frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    /// Local time in ms, excluding the action's delay.
    pub time: u64,
    pub curve: Curve,
}

impl Frame {
    pub(crate) fn new(index: usize, time: u64, curve: Curve) -> Self {
        Self { index, time, curve }
    }
}
