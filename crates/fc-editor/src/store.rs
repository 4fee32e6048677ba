//! Diagram store: the live diagram, its selection, and undo history.
//!
//! Committing operations validate first and only then snapshot the
//! pre-mutation state into [`History`], so a rejected operation never leaves
//! a spurious undo step. Invalid targets are silent no-ops reported through
//! the `bool`/`Option` return. Transient operations (`move_nodes`,
//! `set_node_geometry`) skip history; the gesture that drives them commits
//! once at its end.
//!
//! The store also keeps the latest analysis suggestions. Structural changes
//! make them stale, so they are cleared.

use crate::history::History;
use fc_core::exchange::parse_diagram;
use fc_core::{
    ArrowType, DEFAULT_NODE_TEXT, Diagram, EdgeId, ExchangeError, Node, NodeId, NodeType,
    Position, Selection, Size,
};

#[derive(Debug, Clone, Default)]
pub struct DiagramStore {
    diagram: Diagram,
    pub selection: Selection,
    history: History,
    suggestions: Option<Vec<String>>,
}

impl DiagramStore {
    pub fn new(history_depth: Option<usize>) -> Self {
        Self {
            history: History::new(history_depth),
            ..Self::default()
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn suggestions(&self) -> Option<&[String]> {
        self.suggestions.as_deref()
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = Some(suggestions);
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions = None;
    }

    /// Push `snapshot` (or the current diagram) onto history.
    pub fn commit(&mut self, snapshot: Option<Diagram>) {
        let snapshot = snapshot.unwrap_or_else(|| self.diagram.clone());
        self.history.commit(snapshot);
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Add a node of `kind` with the default text. Returns its fresh id.
    pub fn add_node(&mut self, kind: NodeType, position: Position) -> NodeId {
        self.commit(None);
        let id = self.diagram.fresh_node_id();
        self.diagram
            .insert_node(Node::new(id, kind, DEFAULT_NODE_TEXT, position));
        self.suggestions = None;
        log::debug!("store: add {} {id}", kind.as_str());
        id
    }

    /// Add a fully specified node. Rejected on id clash.
    pub fn insert_node(&mut self, node: Node) -> bool {
        if self.diagram.contains_node(node.id) {
            return false;
        }
        self.commit(None);
        log::debug!("store: insert {}", node.id);
        self.diagram.insert_node(node);
        self.suggestions = None;
        true
    }

    pub fn update_node_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.diagram.node(id) {
            Some(n) if n.text != text => {}
            _ => return false,
        }
        self.commit(None);
        if let Some(n) = self.diagram.node_mut(id) {
            n.text = text.to_string();
        }
        self.suggestions = None;
        true
    }

    /// Set the fill override; an empty string clears it.
    pub fn update_node_color(&mut self, id: NodeId, color: &str) -> bool {
        let color = (!color.is_empty()).then(|| color.to_string());
        match self.diagram.node(id) {
            Some(n) if n.color != color => {}
            _ => return false,
        }
        self.commit(None);
        if let Some(n) = self.diagram.node_mut(id) {
            n.color = color;
        }
        true
    }

    /// Transient: place nodes at absolute positions (clamped ≥ 0).
    pub fn move_nodes(&mut self, positions: &[(NodeId, Position)]) {
        for &(id, position) in positions {
            self.diagram.set_position(id, position);
        }
        self.suggestions = None;
    }

    /// Transient: set a node's size field and position. `None` falls back
    /// to the type's default size.
    pub fn set_node_geometry(&mut self, id: NodeId, size: Option<Size>, position: Position) {
        if let Some(n) = self.diagram.node_mut(id) {
            n.size = size;
            n.position = position.clamped();
        }
    }

    // ─── Edges ───────────────────────────────────────────────────────────

    /// Connect `from → to`. Self-loops and duplicate pairs are no-ops.
    pub fn connect_nodes(&mut self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.diagram.can_connect(from, to) {
            log::debug!("store: connect {from} -> {to} rejected");
            return None;
        }
        self.commit(None);
        let id = self.diagram.connect(from, to)?;
        self.suggestions = None;
        log::debug!("store: connect {from} -> {to} as {id}");
        Some(id)
    }

    /// Set an edge label; an empty string removes it.
    pub fn update_edge_label(&mut self, id: EdgeId, label: &str) -> bool {
        let label = (!label.is_empty()).then(|| label.to_string());
        match self.diagram.edge(id) {
            Some(e) if e.label != label => {}
            _ => return false,
        }
        self.commit(None);
        if let Some(e) = self.diagram.edge_mut(id) {
            e.label = label;
        }
        true
    }

    /// Move one or both endpoints of an edge. Omitted ends stay put.
    pub fn update_edge_connection(
        &mut self,
        id: EdgeId,
        from: Option<NodeId>,
        to: Option<NodeId>,
    ) -> bool {
        let Some(edge) = self.diagram.edge(id) else {
            return false;
        };
        let (from, to) = (from.unwrap_or(edge.from), to.unwrap_or(edge.to));
        if !self.diagram.can_reconnect(id, from, to) {
            log::debug!("store: reconnect {id} to {from} -> {to} rejected");
            return false;
        }
        self.commit(None);
        self.diagram.reconnect(id, from, to);
        self.suggestions = None;
        true
    }

    /// Swap an edge's endpoints. Rejected if the reverse edge exists.
    pub fn flip_edge_direction(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.diagram.edge(id) else {
            return false;
        };
        let (from, to) = (edge.to, edge.from);
        self.update_edge_connection(id, Some(from), Some(to))
    }

    pub fn update_edge_arrow_type(&mut self, id: EdgeId, arrow: ArrowType) -> bool {
        match self.diagram.edge(id) {
            Some(e) if e.arrow() != arrow => {}
            _ => return false,
        }
        self.commit(None);
        if let Some(e) = self.diagram.edge_mut(id) {
            e.arrow_type = Some(arrow);
        }
        true
    }

    // ─── Whole-diagram operations ────────────────────────────────────────

    /// Delete every selected node and edge, cascading to edges of deleted
    /// nodes. No-op with an empty selection.
    pub fn delete_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let before = self.diagram.clone();
        let (nodes, edges) = (
            std::mem::take(&mut self.selection.nodes),
            std::mem::take(&mut self.selection.edges),
        );
        if !self.diagram.remove(&nodes, &edges) {
            return false;
        }
        self.history.commit(before);
        self.suggestions = None;
        log::debug!("store: deleted {} nodes, {} edges", nodes.len(), edges.len());
        true
    }

    /// Replace the diagram wholesale (file load, assistant result).
    pub fn load(&mut self, diagram: Diagram) {
        self.commit(None);
        self.diagram = diagram;
        self.selection.clear();
        self.suggestions = None;
        log::debug!(
            "store: loaded {} nodes, {} edges",
            self.diagram.nodes.len(),
            self.diagram.edges.len()
        );
    }

    /// Strictly validate `json` and load it. On error nothing changes.
    pub fn load_json(&mut self, json: &str) -> Result<(), ExchangeError> {
        let diagram = parse_diagram(json).inspect_err(|e| {
            log::warn!("store: rejected diagram payload: {e}");
        })?;
        self.load(diagram);
        Ok(())
    }

    /// Remove everything. No-op when already empty.
    pub fn clear(&mut self) -> bool {
        if self.diagram.is_empty() {
            return false;
        }
        self.load(Diagram::new());
        true
    }

    /// Install a repositioned copy of an earlier snapshot as one undo step.
    /// Last writer wins: edits made since the snapshot are overwritten.
    pub fn replace_positions(&mut self, layout: Diagram) {
        self.commit(None);
        self.diagram = layout;
        self.selection.retain_existing(&self.diagram);
        self.suggestions = None;
        log::debug!("store: layout applied to {} nodes", self.diagram.nodes.len());
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.diagram) {
            return false;
        }
        self.selection.clear();
        self.suggestions = None;
        log::debug!("store: undo ({} left)", self.history.past_len());
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.diagram) {
            return false;
        }
        self.selection.clear();
        self.suggestions = None;
        log::debug!("store: redo ({} left)", self.history.future_len());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
