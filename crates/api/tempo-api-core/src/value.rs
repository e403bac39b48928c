//! Value: runtime instances written to target properties.
//! All numeric types use f32; time lives in the action crates, not here.

use serde::{Deserialize, Serialize};

/// Coarse kind of a [`Value`]. Every animatable property maps to exactly one kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Bool,
    Vec2,
    ColorRgba,
    Length,
    Border,
    Shadow,
    Enum,
    Text,
}

impl ValueKind {
    /// Zero value of this kind. Used when a frame is created or flushed.
    pub fn default_value(self) -> Value {
        match self {
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Vec2 => Value::Vec2([0.0, 0.0]),
            ValueKind::ColorRgba => Value::ColorRgba([0.0, 0.0, 0.0, 0.0]),
            ValueKind::Length => Value::Length {
                unit: LengthUnit::Pixel,
                value: 0.0,
            },
            ValueKind::Border => Value::Border {
                width: 0.0,
                color: [0.0, 0.0, 0.0, 0.0],
            },
            ValueKind::Shadow => Value::Shadow {
                offset_x: 0.0,
                offset_y: 0.0,
                size: 0.0,
                color: [0.0, 0.0, 0.0, 0.0],
            },
            ValueKind::Enum => Value::Enum(String::new()),
            ValueKind::Text => Value::Text(String::new()),
        }
    }

    /// Whether values of this kind interpolate continuously (as opposed to snapping).
    #[inline]
    pub fn is_numeric(self) -> bool {
        !matches!(self, ValueKind::Bool | ValueKind::Enum | ValueKind::Text)
    }
}

/// Unit of a [`Value::Length`]. Lengths only blend when both ends share a unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Sized by the host layout; the numeric value is ignored.
    Auto,
    /// Fill the parent; the numeric value is ignored.
    Full,
    Pixel,
    Percent,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Boolean (step)
    Bool(bool),

    /// 2D vector
    Vec2([f32; 2]),

    /// RGBA color; channel range is chosen by the host
    ColorRgba([f32; 4]),

    /// Layout length with unit
    Length { unit: LengthUnit, value: f32 },

    /// Border width plus color
    Border { width: f32, color: [f32; 4] },

    /// Drop shadow
    Shadow {
        offset_x: f32,
        offset_y: f32,
        size: f32,
        color: [f32; 4],
    },

    /// Keyword value (text alignment, font family keyword, ...); step-only
    Enum(String),

    /// Text / string; step-only for interpolation
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Length { .. } => ValueKind::Length,
            Value::Border { .. } => ValueKind::Border,
            Value::Shadow { .. } => ValueKind::Shadow,
            Value::Enum(_) => ValueKind::Enum,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Convenience constructors
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Value::ColorRgba([r, g, b, a])
    }

    pub fn px(value: f32) -> Self {
        Value::Length {
            unit: LengthUnit::Pixel,
            value,
        }
    }

    pub fn percent(value: f32) -> Self {
        Value::Length {
            unit: LengthUnit::Percent,
            value,
        }
    }

    /// Scalar view of numeric values, if any.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Length { value, .. } => Some(*value),
            _ => None,
        }
    }
}
