//! Advancing and seeking spawn (parallel) and sequence (serial) groups.

use crate::action::ActionKind;
use crate::binding::Tick;
use crate::ids::ActionId;
use crate::tree::ActionTree;

impl ActionTree {
    pub(crate) fn advance_spawn(
        &mut self,
        id: ActionId,
        span: u64,
        mut restart: bool,
        tick: &mut Tick<'_>,
    ) -> u64 {
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0;
        };
        let mut span = node.timing.scale(span);
        if restart {
            node.timing.restart();
        }
        match node.timing.consume_delay(span) {
            Some(rest) => span = rest,
            None => return 0,
        }
        let children = node.kind.group().map(|g| g.children().to_vec()).unwrap_or_default();

        let mut surplus = span;
        loop {
            for &child in &children {
                surplus = surplus.min(self.advance(child, span, restart, tick));
            }
            if surplus == 0 {
                break;
            }
            let Some(node) = self.nodes.get_mut(&id) else {
                return 0;
            };
            if !node.timing.loops() || !node.timing.next_loop() {
                break;
            }
            restart = true;
            span = surplus;
            let loop_count = node.timing.loop_elapsed;
            tick.post_loop(id, span, loop_count);
            if !tick.root_playing() {
                return 0;
            }
        }

        self.nodes
            .get(&id)
            .map(|n| n.timing.unscale(surplus))
            .unwrap_or(surplus)
    }

    pub(crate) fn advance_sequence(
        &mut self,
        id: ActionId,
        span: u64,
        mut restart: bool,
        tick: &mut Tick<'_>,
    ) -> u64 {
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0;
        };
        let mut span = node.timing.scale(span);
        let ActionKind::Sequence(seq) = &mut node.kind else {
            return 0;
        };

        if seq.current.is_none() || restart {
            if restart {
                node.timing.restart();
                seq.current = None;
            }
            match node.timing.consume_delay(span) {
                Some(rest) => span = rest,
                None => return 0,
            }
            if seq.group.is_empty() {
                return node.timing.unscale(span);
            }
            restart = true;
            seq.current = Some(0);
        }

        loop {
            let Some(node) = self.nodes.get_mut(&id) else {
                return 0;
            };
            let ActionKind::Sequence(seq) = &mut node.kind else {
                return 0;
            };
            let len = seq.group.len();
            let index = match seq.current {
                Some(index) if index < len => index,
                // current child vanished; restart from the first one if any remain
                _ if len > 0 => {
                    restart = true;
                    seq.current = Some(0);
                    0
                }
                _ => break,
            };
            let child = seq.group.children()[index];

            span = self.advance(child, span, restart, tick);
            if span == 0 {
                break;
            }

            let Some(node) = self.nodes.get_mut(&id) else {
                return 0;
            };
            let ActionKind::Sequence(seq) = &mut node.kind else {
                return 0;
            };
            restart = true;
            if index + 1 < seq.group.len() {
                seq.current = Some(index + 1);
                continue;
            }

            if !node.timing.loops() || !node.timing.next_loop() {
                break;
            }
            let loop_count = node.timing.loop_elapsed;
            seq.current = Some(0);
            tick.post_loop(id, span, loop_count);
            if !tick.root_playing() {
                return 0;
            }
        }

        self.nodes
            .get(&id)
            .map(|n| n.timing.unscale(span))
            .unwrap_or(span)
    }

    pub(crate) fn seek_spawn(&mut self, id: ActionId, time: u64, tick: &mut Tick<'_>) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if time < node.timing.delay {
            node.timing.delay_elapsed = time;
            return;
        }
        node.timing.delay_elapsed = node.timing.delay;
        node.timing.loop_elapsed = 0;
        let time = time - node.timing.delay;
        let children = node.kind.group().map(|g| g.children().to_vec()).unwrap_or_default();
        for child in children {
            self.seek_time(child, time, tick);
        }
    }

    pub(crate) fn seek_sequence(&mut self, id: ActionId, time: u64, tick: &mut Tick<'_>) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let delay = node.timing.delay;
        let ActionKind::Sequence(seq) = &mut node.kind else {
            return;
        };
        if time < delay {
            node.timing.delay_elapsed = time;
            seq.current = None;
            return;
        }
        node.timing.delay_elapsed = delay;
        node.timing.loop_elapsed = 0;
        let time = time - delay;
        let children = seq.group.children().to_vec();

        let mut start = 0u64;
        let mut target = None;
        for (index, child) in children.iter().enumerate() {
            let full = self
                .nodes
                .get(child)
                .map(|n| n.timing.full_duration)
                .unwrap_or(0);
            if start + full > time {
                target = Some((index, time - start));
                break;
            }
            start += full;
        }
        // past the end: the last child rests at its own end
        let target = target.or_else(|| {
            let last = children.len().checked_sub(1)?;
            let full = self.nodes.get(&children[last])?.timing.full_duration;
            Some((last, full))
        });

        let Some((index, local)) = target else {
            return;
        };
        if let Some(ActionKind::Sequence(seq)) = self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            seq.current = Some(index);
        }
        self.seek_time(children[index], local, tick);
    }
}
