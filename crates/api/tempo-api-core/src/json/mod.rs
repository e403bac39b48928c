use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::value::{LengthUnit, Value, ValueKind};

/// Errors produced while turning shorthand JSON into a [`Value`].
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("value json parse error: {0}")]
    Parse(String),
    #[error("expected a {expected:?} value, got {actual:?}")]
    KindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("cannot read {input} as a {kind:?} value")]
    InvalidShorthand { kind: ValueKind, input: String },
}

/// Normalize shorthand `Value` JSON into the canonical `{ "type": ..., "data": ... }`
/// representation understood by the serde derives on [`Value`]. This helper accepts
/// both shorthand objects such as `{ "color": [1, 0, 0, 1] }` and primitive aliases
/// like `1.0` or `[0, 1]`.
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => json!({ "type": "float", "data": n }),
        JsonValue::Bool(b) => json!({ "type": "bool", "data": b }),
        JsonValue::String(s) => {
            if let Some(rgba) = parse_hex_color(&s) {
                json!({ "type": "colorrgba", "data": rgba })
            } else if let Some((unit, value)) = parse_length_str(&s) {
                json!({ "type": "length", "data": { "unit": unit, "value": value } })
            } else {
                json!({ "type": "text", "data": s })
            }
        }
        JsonValue::Array(arr) if arr.iter().all(|x| x.is_number()) => match arr.len() {
            2 => json!({ "type": "vec2", "data": arr }),
            3 => {
                let mut rgba = arr;
                rgba.push(json!(1.0));
                json!({ "type": "colorrgba", "data": rgba })
            }
            _ => json!({ "type": "colorrgba", "data": arr }),
        },
        JsonValue::Object(obj) => {
            if obj.contains_key("type") && obj.contains_key("data") {
                return JsonValue::Object(obj);
            }
            if let Some(text) = obj.get("text").and_then(|x| x.as_str()) {
                return json!({ "type": "text", "data": text });
            }
            if let Some(tag) = obj.get("enum").and_then(|x| x.as_str()) {
                return json!({ "type": "enum", "data": tag });
            }
            if let Some(f) = obj.get("float").and_then(|x| x.as_f64()) {
                return json!({ "type": "float", "data": f });
            }
            if let Some(b) = obj.get("bool").and_then(|x| x.as_bool()) {
                return json!({ "type": "bool", "data": b });
            }
            if let Some(arr) = obj.get("vec2").and_then(|x| x.as_array()) {
                return json!({ "type": "vec2", "data": arr });
            }
            if let Some(color) = obj.get("color").filter(|_| obj.len() == 1) {
                return normalize_value_json(color.clone());
            }
            if let Some(length) = obj.get("length") {
                return normalize_value_json(length.clone());
            }
            if obj.contains_key("width") && obj.contains_key("color") {
                let color = color_from_json(obj.get("color")).unwrap_or([0.0; 4]);
                return json!({
                    "type": "border",
                    "data": { "width": num(obj.get("width")), "color": color }
                });
            }
            if obj.contains_key("size") && obj.contains_key("color") {
                let color = color_from_json(obj.get("color")).unwrap_or([0.0; 4]);
                return json!({
                    "type": "shadow",
                    "data": {
                        "offset_x": num(obj.get("offset_x")),
                        "offset_y": num(obj.get("offset_y")),
                        "size": num(obj.get("size")),
                        "color": color
                    }
                });
            }
            JsonValue::Object(obj)
        }
        other => other,
    }
}

/// Convenience helper that normalizes Value JSON then deserializes it into the
/// strongly typed [`Value`] enum.
pub fn parse_value(value: JsonValue) -> Result<Value, serde_json::Error> {
    let normalized = normalize_value_json(value);
    serde_json::from_value(normalized)
}

/// Read shorthand JSON as a value of a known kind. The expected kind settles
/// ambiguous shorthands: `12` is a float for `Float` but a pixel length for
/// `Length`, `"center"` is text for `Text` but a keyword for `Enum`.
pub fn parse_value_for(kind: ValueKind, value: JsonValue) -> Result<Value, JsonError> {
    let invalid = |input: &JsonValue| JsonError::InvalidShorthand {
        kind,
        input: input.to_string(),
    };
    let parsed = match (kind, &value) {
        (ValueKind::Length, JsonValue::Number(n)) => Value::Length {
            unit: LengthUnit::Pixel,
            value: n.as_f64().unwrap_or_default() as f32,
        },
        (ValueKind::Length, JsonValue::String(s)) => {
            let (unit, v) = parse_length_str(s).ok_or_else(|| invalid(&value))?;
            Value::Length { unit, value: v }
        }
        (ValueKind::Float, JsonValue::String(s)) => {
            Value::Float(s.trim().parse::<f32>().map_err(|_| invalid(&value))?)
        }
        (ValueKind::Enum, JsonValue::String(s)) => Value::Enum(s.clone()),
        (ValueKind::Text, JsonValue::String(s)) => Value::Text(s.clone()),
        (ValueKind::ColorRgba, JsonValue::String(s)) => {
            Value::ColorRgba(parse_hex_color(s).ok_or_else(|| invalid(&value))?)
        }
        _ => parse_value(value).map_err(|e| JsonError::Parse(e.to_string()))?,
    };
    if parsed.kind() != kind {
        return Err(JsonError::KindMismatch {
            expected: kind,
            actual: parsed.kind(),
        });
    }
    Ok(parsed)
}

/// `"auto"`, `"full"`, `"50%"`, `"12px"` or a bare number string.
fn parse_length_str(s: &str) -> Option<(LengthUnit, f32)> {
    let s = s.trim();
    match s {
        "auto" => return Some((LengthUnit::Auto, 0.0)),
        "full" => return Some((LengthUnit::Full, 0.0)),
        _ => {}
    }
    if let Some(pct) = s.strip_suffix('%') {
        return pct.trim().parse().ok().map(|v| (LengthUnit::Percent, v));
    }
    let px = s.strip_suffix("px").unwrap_or(s);
    if px.is_empty() || px == s && !s.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return None;
    }
    px.trim().parse().ok().map(|v| (LengthUnit::Pixel, v))
}

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`; channels come out in 0..1.
fn parse_hex_color(s: &str) -> Option<[f32; 4]> {
    let hex = s.trim().strip_prefix('#')?;
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    let channels: Vec<u8> = match digits.len() {
        3 | 4 => digits.iter().map(|d| d * 17).collect(),
        6 | 8 => digits.chunks(2).map(|p| p[0] * 16 + p[1]).collect(),
        _ => return None,
    };
    let mut out = [0.0, 0.0, 0.0, 1.0];
    for (slot, c) in out.iter_mut().zip(channels) {
        *slot = c as f32 / 255.0;
    }
    Some(out)
}

fn color_from_json(v: Option<&JsonValue>) -> Option<[f32; 4]> {
    match parse_value(v?.clone()).ok()? {
        Value::ColorRgba(c) => Some(c),
        _ => None,
    }
}

fn num(v: Option<&JsonValue>) -> f64 {
    v.and_then(|x| x.as_f64()).unwrap_or_default()
}
