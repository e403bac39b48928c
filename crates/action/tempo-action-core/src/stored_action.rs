//! JSON action descriptions and building action trees from them.
//!
//! Descriptions are parsed into [`ActionDesc`] first, so a malformed document
//! never touches the engine; building then creates, fills and links actions,
//! destroying anything half-built on error.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tempo_api_core::json::parse_value_for;
use tempo_api_core::{PropertyId, Value};

use crate::curve::Curve;
use crate::engine::Engine;
use crate::error::{ActionError, Result};
use crate::ids::ActionId;

/// Parsed description of an action tree, ready for [`Engine::load_action`].
#[derive(Clone, Debug, PartialEq)]
pub struct ActionDesc {
    pub kind: ActionDescKind,
    pub loop_count: i32,
    pub delay: u64,
    pub speed: f32,
    pub playing: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionDescKind {
    Spawn(Vec<ActionDesc>),
    Sequence(Vec<ActionDesc>),
    Keyframe(Vec<FrameDesc>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameDesc {
    pub time: u64,
    pub curve: Option<Curve>,
    pub values: Vec<(PropertyId, Value)>,
}

/// Public API: parse an action description.
///
/// Accepted shapes:
/// - an array: a keyframe action whose entries are frames;
/// - `{ "seq": [...] }` / `{ "spawn": [...] }`: groups of nested descriptions;
/// - `{ "keyframe": [...] }` (or an object with none of the above): keyframes.
///
/// Objects may also carry `loop`, `delay` (ms), `speed` and `playing`.
/// A frame is `{ "time": ms, "curve": name | [x1, y1, x2, y2], <property>: <value>, ... }`,
/// values using the shorthand understood by `tempo_api_core::json`.
pub fn parse_action_json(s: &str) -> Result<ActionDesc> {
    let raw: RawAction = serde_json::from_str(s)?;
    to_desc(raw)
}

fn to_desc(raw: RawAction) -> Result<ActionDesc> {
    match raw {
        RawAction::Frames(frames) => Ok(ActionDesc {
            kind: ActionDescKind::Keyframe(to_frames(frames)?),
            loop_count: 0,
            delay: 0,
            speed: 1.0,
            playing: false,
        }),
        RawAction::Object(obj) => {
            let kind = if let Some(children) = obj.seq {
                ActionDescKind::Sequence(children.into_iter().map(to_desc).collect::<Result<_>>()?)
            } else if let Some(children) = obj.spawn {
                ActionDescKind::Spawn(children.into_iter().map(to_desc).collect::<Result<_>>()?)
            } else {
                ActionDescKind::Keyframe(to_frames(obj.keyframe.unwrap_or_default())?)
            };
            Ok(ActionDesc {
                kind,
                loop_count: obj.loop_count.max(-1),
                delay: to_ms(obj.delay),
                speed: obj.speed,
                playing: obj.playing,
            })
        }
    }
}

fn to_frames(frames: Vec<RawFrame>) -> Result<Vec<FrameDesc>> {
    frames
        .into_iter()
        .map(|f| -> Result<FrameDesc> {
            let mut values = Vec::with_capacity(f.props.len());
            for (key, json) in f.props {
                let property = PropertyId::from_name(&key).ok_or_else(|| ActionError::Parse {
                    reason: format!("unknown property '{key}'"),
                })?;
                values.push((property, parse_value_for(property.value_kind(), json)?));
            }
            Ok(FrameDesc {
                time: to_ms(f.time),
                curve: f.curve,
                values,
            })
        })
        .collect()
}

fn to_ms(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}

impl Engine {
    /// Build the action tree described by `desc`. Plays the new root if any
    /// description in the tree asks to be playing.
    pub fn load_action(&mut self, desc: &ActionDesc) -> Result<ActionId> {
        let id = self.build_action(desc)?;
        if wants_play(desc) {
            self.play(id)?;
        }
        Ok(id)
    }

    /// [`parse_action_json`] followed by [`Engine::load_action`].
    pub fn load_action_json(&mut self, s: &str) -> Result<ActionId> {
        let desc = parse_action_json(s)?;
        self.load_action(&desc)
    }

    fn build_action(&mut self, desc: &ActionDesc) -> Result<ActionId> {
        let id = match desc.kind {
            ActionDescKind::Spawn(_) => self.create_spawn(),
            ActionDescKind::Sequence(_) => self.create_sequence(),
            ActionDescKind::Keyframe(_) => self.create_keyframe(),
        };
        if let Err(err) = self.fill_action(id, desc) {
            self.destroy(id)?;
            return Err(err);
        }
        Ok(id)
    }

    fn fill_action(&mut self, id: ActionId, desc: &ActionDesc) -> Result<()> {
        match &desc.kind {
            ActionDescKind::Spawn(children) | ActionDescKind::Sequence(children) => {
                for child in children {
                    let child = self.build_action(child)?;
                    self.append(id, child)?;
                }
            }
            ActionDescKind::Keyframe(frames) => {
                let default_curve = self.config().default_curve;
                for frame in frames {
                    let index = self.add_frame_with_curve(
                        id,
                        frame.time,
                        frame.curve.unwrap_or(default_curve),
                    )?;
                    for (property, value) in &frame.values {
                        self.set_frame_value(id, index, *property, value.clone())?;
                    }
                }
            }
        }
        self.set_loop(id, desc.loop_count)?;
        self.set_delay(id, desc.delay)?;
        self.set_speed(id, desc.speed)?;
        Ok(())
    }
}

fn wants_play(desc: &ActionDesc) -> bool {
    desc.playing
        || match &desc.kind {
            ActionDescKind::Spawn(children) | ActionDescKind::Sequence(children) => {
                children.iter().any(wants_play)
            }
            ActionDescKind::Keyframe(_) => false,
        }
}

// ---------------- Raw JSON shapes ----------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAction {
    Frames(Vec<RawFrame>),
    Object(RawObject),
}

#[derive(Debug, Deserialize)]
struct RawObject {
    #[serde(default, rename = "loop")]
    loop_count: i32,
    #[serde(default)]
    delay: f64,
    #[serde(default = "default_speed")]
    speed: f32,
    #[serde(default)]
    playing: bool,
    #[serde(default)]
    seq: Option<Vec<RawAction>>,
    #[serde(default)]
    spawn: Option<Vec<RawAction>>,
    #[serde(default)]
    keyframe: Option<Vec<RawFrame>>,
}

fn default_speed() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    time: f64,
    #[serde(default)]
    curve: Option<Curve>,
    #[serde(flatten)]
    props: Map<String, JsonValue>,
}
