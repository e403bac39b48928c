//! Identifiers and a simple allocator for actions.

use serde::{Deserialize, Serialize};

/// Handle to an action stored in the [`ActionTree`](crate::tree::ActionTree) arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ActionId(pub u32);

/// Monotonic allocator for ActionId.
/// IDs are never reused while the allocator lives; they are opaque externally.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_action: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_action(&mut self) -> ActionId {
        let id = ActionId(self.next_action);
        self.next_action = self.next_action.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
