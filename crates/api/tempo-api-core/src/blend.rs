//! Blending utilities for Value types.
//! - f32 linear interpolation for floats and vector/color components
//! - lengths blend only when both ends share a unit
//! - step blending for Bool/Text/Enum (choose left or right by x < 0.5)
//!
//! Two progress values are passed around: `x` is linear progress through a
//! segment, `y` is the eased progress produced by the segment's curve.

use crate::value::{LengthUnit, Value};

/// Linear interpolation for f32
#[inline]
pub fn lerp_f(a: f32, b: f32, t: f32) -> f32 {
    a - (a - b) * t
}

/// Lerp for fixed-size arrays
fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

/// Interpolate between two values of the same kind.
///
/// Numeric kinds blend with the eased progress `y`. Discrete kinds, lengths in
/// different units and mismatched kinds snap to the nearer endpoint using the
/// linear progress `x`.
pub fn interpolate(a: &Value, b: &Value, x: f32, y: f32) -> Value {
    match (a, b) {
        (Value::Float(af), Value::Float(bf)) => Value::Float(lerp_f(*af, *bf, y)),
        (Value::Vec2(aa), Value::Vec2(bb)) => Value::Vec2(lerp_array(aa, bb, y)),
        (Value::ColorRgba(ac), Value::ColorRgba(bc)) => Value::ColorRgba(lerp_array(ac, bc, y)),
        (
            Value::Length {
                unit: au,
                value: av,
            },
            Value::Length {
                unit: bu,
                value: bv,
            },
        ) if au == bu && !matches!(au, LengthUnit::Auto | LengthUnit::Full) => Value::Length {
            unit: *au,
            value: lerp_f(*av, *bv, y),
        },
        (
            Value::Border {
                width: aw,
                color: ac,
            },
            Value::Border {
                width: bw,
                color: bc,
            },
        ) => Value::Border {
            width: lerp_f(*aw, *bw, y),
            color: lerp_array(ac, bc, y),
        },
        (
            Value::Shadow {
                offset_x: ax,
                offset_y: ay,
                size: asz,
                color: ac,
            },
            Value::Shadow {
                offset_x: bx,
                offset_y: by,
                size: bsz,
                color: bc,
            },
        ) => Value::Shadow {
            offset_x: lerp_f(*ax, *bx, y),
            offset_y: lerp_f(*ay, *by, y),
            size: lerp_f(*asz, *bsz, y),
            color: lerp_array(ac, bc, y),
        },
        _ => step_blend(a, b, x),
    }
}

/// Step blending for step-only types: choose a for t < 0.5, else b.
pub fn step_blend(a: &Value, b: &Value, t: f32) -> Value {
    if t < 0.5 {
        a.clone()
    } else {
        b.clone()
    }
}
