//! tempo-api-core: value model shared by the action crates (core, engine-agnostic)

pub mod blend;
pub mod json;
pub mod property;
pub mod value;

pub use property::{Accessor, PropertyId, TargetId, TargetKind};
pub use value::{LengthUnit, Value, ValueKind};
