//! Host seam: how actions reach the targets they animate.
//!
//! Targets are owned by the host (a view tree). Actions only hold
//! [`TargetId`]s; every read and write goes through a [`TargetHost`].

use indexmap::IndexMap;
use tempo_api_core::{Accessor, PropertyId, TargetId, TargetKind, Value};

use crate::center::Activation;
use crate::ids::ActionId;
use crate::outputs::{ActionEvent, Outbox};

/// Implemented by the host that owns bound targets.
pub trait TargetHost {
    /// Kind of a live target, or `None` if it no longer exists.
    fn kind(&self, target: TargetId) -> Option<TargetKind>;

    /// Accessor for `property` on targets of `kind`, if that kind exposes it.
    fn resolve(&self, kind: TargetKind, property: PropertyId) -> Option<Accessor>;

    /// Current value of a property.
    fn get(&self, target: TargetId, accessor: &Accessor) -> Option<Value>;

    /// Write a property value.
    fn set(&mut self, target: TargetId, accessor: &Accessor, value: &Value);
}

/// Context threaded through one advance or seek of a root action.
pub struct Tick<'a> {
    pub(crate) root: ActionId,
    pub(crate) targets: Vec<TargetId>,
    pub(crate) target_kind: Option<TargetKind>,
    pub(crate) host: &'a mut dyn TargetHost,
    pub(crate) outbox: &'a mut Outbox,
    pub(crate) active: &'a IndexMap<ActionId, Activation>,
    pub(crate) epsilon: f32,
}

impl<'a> Tick<'a> {
    /// Whether the root is still registered with the center.
    #[inline]
    pub(crate) fn root_playing(&self) -> bool {
        self.active.contains_key(&self.root)
    }

    pub(crate) fn write(&mut self, accessor: &Accessor, value: &Value) {
        for &target in &self.targets {
            self.host.set(target, accessor, value);
        }
    }

    pub(crate) fn post_loop(&mut self, action: ActionId, delay: u64, loop_count: u32) {
        log::debug!("action {action:?} looped ({loop_count}), carry {delay}ms");
        for &target in &self.targets {
            self.outbox.push(ActionEvent::Loop {
                action,
                root: self.root,
                target,
                delay,
                loop_count,
            });
        }
    }

    pub(crate) fn post_keyframe(
        &mut self,
        action: ActionId,
        delay: u64,
        frame: usize,
        loop_count: u32,
    ) {
        log::trace!("action {action:?} reached frame {frame}");
        for &target in &self.targets {
            self.outbox.push(ActionEvent::Keyframe {
                action,
                root: self.root,
                target,
                delay,
                frame,
                loop_count,
            });
        }
    }
}
