//! Animatable property ids and handles to external targets.
//!
//! Targets (views) live outside this workspace. The core only ever sees a
//! [`TargetId`], the [`TargetKind`] the host reports for it, and an
//! [`Accessor`] token the host hands out for a `(kind, property)` pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{LengthUnit, Value, ValueKind};

/// Opaque handle to a bound target owned by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Host-defined kind of a target ("view kind"). Targets bound to the same
/// action must share a kind so accessors can be resolved once.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TargetKind(pub u32);

/// Token produced by the host's property registry for `(kind, property)`.
/// `slot` is free for the host to use (field offset, setter index, ...).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Accessor {
    pub property: PropertyId,
    pub kind: ValueKind,
    pub slot: u32,
}

impl Accessor {
    pub fn new(property: PropertyId, slot: u32) -> Self {
        Self {
            property,
            kind: property.value_kind(),
            slot,
        }
    }
}

/// Closed set of animatable properties.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyId {
    X,
    Y,
    ScaleX,
    ScaleY,
    SkewX,
    SkewY,
    OriginX,
    OriginY,
    RotateZ,
    Opacity,
    Visible,
    Width,
    Height,
    BackgroundColor,
    Border,
    Shadow,
    TextColor,
    TextSize,
    TextAlign,
    TextFamily,
}

impl PropertyId {
    pub const ALL: [PropertyId; 20] = [
        PropertyId::X,
        PropertyId::Y,
        PropertyId::ScaleX,
        PropertyId::ScaleY,
        PropertyId::SkewX,
        PropertyId::SkewY,
        PropertyId::OriginX,
        PropertyId::OriginY,
        PropertyId::RotateZ,
        PropertyId::Opacity,
        PropertyId::Visible,
        PropertyId::Width,
        PropertyId::Height,
        PropertyId::BackgroundColor,
        PropertyId::Border,
        PropertyId::Shadow,
        PropertyId::TextColor,
        PropertyId::TextSize,
        PropertyId::TextAlign,
        PropertyId::TextFamily,
    ];

    /// The single value kind this property carries.
    pub fn value_kind(self) -> ValueKind {
        match self {
            PropertyId::X
            | PropertyId::Y
            | PropertyId::ScaleX
            | PropertyId::ScaleY
            | PropertyId::SkewX
            | PropertyId::SkewY
            | PropertyId::OriginX
            | PropertyId::OriginY
            | PropertyId::RotateZ
            | PropertyId::Opacity
            | PropertyId::TextSize => ValueKind::Float,
            PropertyId::Visible => ValueKind::Bool,
            PropertyId::Width | PropertyId::Height => ValueKind::Length,
            PropertyId::BackgroundColor | PropertyId::TextColor => ValueKind::ColorRgba,
            PropertyId::Border => ValueKind::Border,
            PropertyId::Shadow => ValueKind::Shadow,
            PropertyId::TextAlign => ValueKind::Enum,
            PropertyId::TextFamily => ValueKind::Text,
        }
    }

    /// Resting value for a freshly created or flushed frame.
    pub fn default_value(self) -> Value {
        match self {
            PropertyId::ScaleX | PropertyId::ScaleY | PropertyId::Opacity => Value::Float(1.0),
            PropertyId::Visible => Value::Bool(true),
            PropertyId::Width | PropertyId::Height => Value::Length {
                unit: LengthUnit::Auto,
                value: 0.0,
            },
            PropertyId::TextSize => Value::Float(16.0),
            PropertyId::TextAlign => Value::Enum("left".to_string()),
            other => other.value_kind().default_value(),
        }
    }

    /// snake_case name as used in action descriptions.
    pub fn name(self) -> &'static str {
        match self {
            PropertyId::X => "x",
            PropertyId::Y => "y",
            PropertyId::ScaleX => "scale_x",
            PropertyId::ScaleY => "scale_y",
            PropertyId::SkewX => "skew_x",
            PropertyId::SkewY => "skew_y",
            PropertyId::OriginX => "origin_x",
            PropertyId::OriginY => "origin_y",
            PropertyId::RotateZ => "rotate_z",
            PropertyId::Opacity => "opacity",
            PropertyId::Visible => "visible",
            PropertyId::Width => "width",
            PropertyId::Height => "height",
            PropertyId::BackgroundColor => "background_color",
            PropertyId::Border => "border",
            PropertyId::Shadow => "shadow",
            PropertyId::TextColor => "text_color",
            PropertyId::TextSize => "text_size",
            PropertyId::TextAlign => "text_align",
            PropertyId::TextFamily => "text_family",
        }
    }

    /// Inverse of [`PropertyId::name`]. Also accepts camelCase spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .flat_map(|c| {
                if c.is_ascii_uppercase() {
                    vec!['_', c.to_ascii_lowercase()]
                } else {
                    vec![c]
                }
            })
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == normalized.as_str())
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in PropertyId::ALL {
            assert_eq!(PropertyId::from_name(p.name()), Some(p));
        }
        assert_eq!(
            PropertyId::from_name("backgroundColor"),
            Some(PropertyId::BackgroundColor)
        );
        assert_eq!(PropertyId::from_name("nope"), None);
    }

    #[test]
    fn defaults_carry_the_property_kind() {
        for p in PropertyId::ALL {
            assert_eq!(p.default_value().kind(), p.value_kind(), "{p}");
        }
    }
}
