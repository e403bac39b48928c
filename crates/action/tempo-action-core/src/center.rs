//! The per-frame driver: the set of playing root actions.

use indexmap::IndexMap;

use crate::binding::{TargetHost, Tick};
use crate::config::Config;
use crate::ids::ActionId;
use crate::outputs::Outbox;
use crate::tree::ActionTree;

/// Per-root bookkeeping inside the center.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Activation {
    /// False until the root received its start tick.
    pub started: bool,
}

/// Registry of playing roots. Membership is what "playing" means.
#[derive(Debug, Default)]
pub struct ActionCenter {
    pub(crate) active: IndexMap<ActionId, Activation>,
    prev_time: Option<u64>,
}

impl ActionCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root. No-op if already present.
    pub fn add(&mut self, root: ActionId) {
        if !self.active.contains_key(&root) {
            log::debug!("action {root:?} starts playing");
            self.active.insert(root, Activation::default());
        }
    }

    /// Unregister a root. Idempotent.
    pub fn del(&mut self, root: ActionId) {
        if self.active.shift_remove(&root).is_some() {
            log::debug!("action {root:?} stops playing");
        }
    }

    #[inline]
    pub fn contains(&self, root: ActionId) -> bool {
        self.active.contains_key(&root)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.active.keys().copied()
    }

    /// Drive every playing root to wall-clock time `now` (ms).
    ///
    /// The first call only sets the baseline. Steps are capped at
    /// `cfg.max_frame_delta`. A root registered since the last call gets a
    /// zero-length start tick first. Roots that report surplus have finished
    /// and are removed; roots without targets are dropped.
    pub fn advance(
        &mut self,
        now: u64,
        tree: &mut ActionTree,
        outbox: &mut Outbox,
        host: &mut dyn TargetHost,
        cfg: &Config,
    ) {
        outbox.begin_tick();
        if self.active.is_empty() {
            return;
        }
        let delta = match self.prev_time {
            Some(prev) => now.saturating_sub(prev).min(cfg.max_frame_delta),
            None => 0,
        };
        self.prev_time = Some(now);

        let mut runs: Vec<(ActionId, u64)> = Vec::with_capacity(self.active.len());
        let mut orphaned = Vec::new();
        for (&id, activation) in self.active.iter_mut() {
            let bound = tree.get(id).map(|n| !n.targets.is_empty()).unwrap_or(false);
            if !bound {
                orphaned.push(id);
            } else if activation.started {
                runs.push((id, delta));
            } else {
                activation.started = true;
                runs.push((id, 0));
            }
        }
        for id in orphaned {
            log::debug!("action {id:?} has no targets left; dropping it");
            self.del(id);
        }

        let mut finished = Vec::new();
        for (id, span) in runs {
            if !self.active.contains_key(&id) {
                continue;
            }
            let Ok(node) = tree.get(id) else {
                continue;
            };
            let mut tick = Tick {
                root: id,
                targets: node.targets.clone(),
                target_kind: node.target_kind,
                host: &mut *host,
                outbox: &mut *outbox,
                active: &self.active,
                epsilon: cfg.curve_epsilon,
            };
            if tree.advance(id, span, false, &mut tick) != 0 {
                finished.push(id);
            }
        }
        for id in finished {
            log::debug!("action {id:?} finished");
            self.del(id);
        }
    }
}
