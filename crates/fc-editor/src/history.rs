//! Linear undo/redo history of diagram snapshots.
//!
//! Every committing operation pushes the state it is about to replace onto
//! `past` and drops the redo branch. Undo swaps the current diagram with the
//! newest past snapshot; redo swaps it back. Snapshots are deep copies, so
//! nothing in history aliases the live diagram.
//!
//! Continuous gestures commit once, at gesture end, passing the pre-gesture
//! state as an explicit override.

use fc_core::Diagram;
use std::collections::VecDeque;
use std::mem;

#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Diagram>,
    /// Front is the next redo.
    future: VecDeque<Diagram>,
    /// Maximum undo depth; oldest snapshots are dropped past it.
    max_depth: Option<usize>,
}

impl History {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            past: Vec::new(),
            future: VecDeque::new(),
            max_depth,
        }
    }

    /// Record `snapshot` as the state before a change and clear redo.
    pub fn commit(&mut self, snapshot: Diagram) {
        self.past.push(snapshot);
        if let Some(max) = self.max_depth
            && self.past.len() > max
        {
            let excess = self.past.len() - max;
            self.past.drain(..excess);
        }
        self.future.clear();
        log::trace!(
            "history: commit ({} past, redo cleared)",
            self.past.len()
        );
    }

    /// Restore the newest past snapshot into `current`.
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Diagram) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push_front(mem::replace(current, previous));
        true
    }

    /// Re-apply the next redo snapshot into `current`.
    pub fn redo(&mut self, current: &mut Diagram) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        self.past.push(mem::replace(current, next));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{Node, NodeId, NodeType, Position};
    use pretty_assertions::assert_eq;

    fn with_node(d: &Diagram, id: &str) -> Diagram {
        let mut next = d.clone();
        next.insert_node(Node::new(
            NodeId::intern(id),
            NodeType::Process,
            id,
            Position::default(),
        ));
        next
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = History::new(None);
        let mut current = Diagram::new();
        h.commit(current.clone());
        current = with_node(&current, "h_a");
        let after = current.clone();

        assert!(h.undo(&mut current));
        assert!(current.is_empty());
        assert!(h.can_redo());
        assert!(h.redo(&mut current));
        assert_eq!(current, after);
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_on_empty_past_is_noop() {
        let mut h = History::new(None);
        let mut current = with_node(&Diagram::new(), "h_keep");
        let before = current.clone();
        assert!(!h.undo(&mut current));
        assert!(!h.redo(&mut current));
        assert_eq!(current, before);
    }

    #[test]
    fn commit_after_undo_clears_future() {
        let mut h = History::new(None);
        let mut current = Diagram::new();
        h.commit(current.clone());
        current = with_node(&current, "h_b");
        h.undo(&mut current);
        assert_eq!(h.future_len(), 1);

        h.commit(current.clone());
        assert_eq!(h.future_len(), 0);
        assert_eq!(h.past_len(), 1);
    }

    #[test]
    fn redo_order_is_most_recent_undo_first() {
        let mut h = History::new(None);
        let mut current = Diagram::new();
        let states: Vec<Diagram> = ["h_1", "h_2", "h_3"]
            .iter()
            .scan(Diagram::new(), |d, id| {
                *d = with_node(d, id);
                Some(d.clone())
            })
            .collect();
        for s in &states {
            h.commit(current.clone());
            current = s.clone();
        }
        for _ in 0..3 {
            h.undo(&mut current);
        }
        assert!(current.is_empty());
        for s in &states {
            h.redo(&mut current);
            assert_eq!(&current, s);
        }
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut h = History::new(Some(2));
        let mut current = Diagram::new();
        for id in ["h_d1", "h_d2", "h_d3"] {
            h.commit(current.clone());
            current = with_node(&current, id);
        }
        assert_eq!(h.past_len(), 2);
        h.undo(&mut current);
        h.undo(&mut current);
        assert!(!h.can_undo());
        // The empty diagram fell off the bottom.
        assert_eq!(current.nodes.len(), 1);
    }
}
