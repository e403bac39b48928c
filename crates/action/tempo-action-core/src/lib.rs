//! Tempo Action Core (engine-agnostic)
//!
//! Timed, composable actions that drive interpolated changes to properties of
//! host-owned targets. Actions form trees: spawns run children in parallel,
//! sequences run them back to back, keyframe actions interpolate property
//! tracks between frames. An [`Engine`] owns the tree and the center of
//! playing roots; the host calls [`Engine::advance`] once per frame and drains
//! the queued [`ActionEvent`]s afterwards.

pub mod action;
pub mod binding;
pub mod center;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod frame;
mod group;
pub mod ids;
mod keyframe;
pub mod outputs;
pub mod stored_action;
pub mod track;
pub mod tree;

// Re-exports for consumers (hosts)
pub use action::{ActionKind, ActionKindTag, ActionNode, KeyframeState, Timing};
pub use binding::TargetHost;
pub use center::ActionCenter;
pub use config::Config;
pub use curve::Curve;
pub use engine::{Engine, TransitionCfg};
pub use error::{ActionError, Result};
pub use frame::Frame;
pub use ids::ActionId;
pub use outputs::{ActionEvent, Outbox};
pub use stored_action::{parse_action_json, ActionDesc, ActionDescKind, FrameDesc};
pub use track::Track;
pub use tree::ActionTree;
pub use tempo_api_core::{Accessor, LengthUnit, PropertyId, TargetId, TargetKind, Value, ValueKind};
