//! Flowchart data model.
//!
//! A diagram is an ordered list of typed nodes and an ordered list of
//! directed edges between them. Order matters: later nodes paint on top,
//! hit testing walks in reverse, and the snap engine enumerates targets
//! front to back.
//!
//! The mutating helpers on [`Diagram`] keep the structural invariants
//! (no self-loops, one edge per ordered pair, no dangling endpoints,
//! non-negative positions). History and selection live in the editor.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Text given to nodes created from the palette.
pub const DEFAULT_NODE_TEXT: &str = "New node";

// ─── Node ────────────────────────────────────────────────────────────────

/// The four flowchart shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// Rounded terminal (start / end).
    StartEnd,
    Process,
    /// Diamond; rendered as a rotated square.
    Decision,
    /// Parallelogram for input/output steps.
    Io,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::StartEnd,
        NodeType::Process,
        NodeType::Decision,
        NodeType::Io,
    ];

    /// Exchange-format name (`"start-end"`, `"process"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::StartEnd => "start-end",
            NodeType::Process => "process",
            NodeType::Decision => "decision",
            NodeType::Io => "io",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Canvas-space point (top-left of a node, pointer positions, anchors).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates to be non-negative.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

/// Explicit node size overriding the type default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A shape on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub text: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// CSS color string overriding the type's default fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeType, text: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
            position: position.clamped(),
            size: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

// ─── Edge ────────────────────────────────────────────────────────────────

/// Arrowhead placement on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArrowType {
    /// One arrowhead at the `to` end.
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "bi-directional")]
    Bidirectional,
    #[serde(rename = "none")]
    None,
}

impl ArrowType {
    pub const ALL: [ArrowType; 3] = [ArrowType::Default, ArrowType::Bidirectional, ArrowType::None];

    pub fn as_str(self) -> &'static str {
        match self {
            ArrowType::Default => "default",
            ArrowType::Bidirectional => "bi-directional",
            ArrowType::None => "none",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn head_at_to(self) -> bool {
        matches!(self, ArrowType::Default | ArrowType::Bidirectional)
    }

    pub fn head_at_from(self) -> bool {
        matches!(self, ArrowType::Bidirectional)
    }
}

/// A directed connector between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Absent in the exchange format means [`ArrowType::Default`].
    #[serde(
        rename = "arrowType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub arrow_type: Option<ArrowType>,
}

impl Edge {
    pub fn new(id: EdgeId, from: NodeId, to: NodeId) -> Self {
        Self {
            id,
            from,
            to,
            label: None,
            arrow_type: None,
        }
    }

    /// Effective arrow type.
    pub fn arrow(&self) -> ArrowType {
        self.arrow_type.unwrap_or_default()
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

/// Which end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    From,
    To,
}

// ─── Diagram ─────────────────────────────────────────────────────────────

/// Nodes and edges. Also the history snapshot type: cloning is a deep copy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether the directed pair `(from, to)` is already used by an edge
    /// other than `except`.
    pub fn has_pair(&self, from: NodeId, to: NodeId, except: Option<EdgeId>) -> bool {
        self.edges
            .iter()
            .any(|e| e.from == from && e.to == to && Some(e.id) != except)
    }

    /// Whether an edge `(from, to)` may be created.
    pub fn can_connect(&self, from: NodeId, to: NodeId) -> bool {
        from != to
            && self.contains_node(from)
            && self.contains_node(to)
            && !self.has_pair(from, to, None)
    }

    /// Generate a node id not used in this diagram.
    pub fn fresh_node_id(&self) -> NodeId {
        NodeId::fresh("node", |id| self.is_id_taken(id))
    }

    /// Generate an edge id not used in this diagram.
    pub fn fresh_edge_id(&self) -> EdgeId {
        NodeId::fresh("edge", |id| self.is_id_taken(id))
    }

    fn is_id_taken(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id) || self.edges.iter().any(|e| e.id == id)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append a node, clamping its position. Returns `false` on id clash.
    pub fn insert_node(&mut self, mut node: Node) -> bool {
        if self.contains_node(node.id) {
            return false;
        }
        node.position = node.position.clamped();
        self.nodes.push(node);
        true
    }

    /// Append an edge `(from, to)` unless it would break an invariant.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.can_connect(from, to) {
            return None;
        }
        let id = self.fresh_edge_id();
        self.edges.push(Edge::new(id, from, to));
        Some(id)
    }

    /// Whether `edge` may be moved to `(from, to)`. Unchanged endpoints
    /// count as "no".
    pub fn can_reconnect(&self, edge: EdgeId, from: NodeId, to: NodeId) -> bool {
        let Some(e) = self.edge(edge) else {
            return false;
        };
        (e.from != from || e.to != to)
            && from != to
            && self.contains_node(from)
            && self.contains_node(to)
            && !self.has_pair(from, to, Some(edge))
    }

    /// Move an edge's endpoints. Rejects self-loops, dangling endpoints,
    /// and pairs already used by a different edge.
    pub fn reconnect(&mut self, edge: EdgeId, from: NodeId, to: NodeId) -> bool {
        if !self.can_reconnect(edge, from, to) {
            return false;
        }
        match self.edge_mut(edge) {
            Some(e) => {
                e.from = from;
                e.to = to;
                true
            }
            None => false,
        }
    }

    /// Set a node's position, clamped to non-negative coordinates.
    pub fn set_position(&mut self, id: NodeId, position: Position) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.position = position.clamped();
                true
            }
            None => false,
        }
    }

    /// Remove the given nodes and edges, plus every edge touching a
    /// removed node. Returns `true` if anything was removed.
    pub fn remove(&mut self, nodes: &[NodeId], edges: &[EdgeId]) -> bool {
        let nodes: HashSet<NodeId> = nodes.iter().copied().collect();
        let edges: HashSet<EdgeId> = edges.iter().copied().collect();
        let before = (self.nodes.len(), self.edges.len());
        self.nodes.retain(|n| !nodes.contains(&n.id));
        self.edges.retain(|e| {
            !edges.contains(&e.id) && !nodes.contains(&e.from) && !nodes.contains(&e.to)
        });
        before != (self.nodes.len(), self.edges.len())
    }
}

// ─── Selection ───────────────────────────────────────────────────────────

/// Selected node and edge ids, kept in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    /// Replace the selection with a single node.
    pub fn select_node(&mut self, id: NodeId) {
        self.nodes.clear();
        self.edges.clear();
        self.nodes.push(id);
    }

    /// Replace the selection with a single edge.
    pub fn select_edge(&mut self, id: EdgeId) {
        self.nodes.clear();
        self.edges.clear();
        self.edges.push(id);
    }

    /// Shift-click on a node: toggle membership, edges untouched.
    pub fn toggle_node(&mut self, id: NodeId) {
        toggle(&mut self.nodes, id);
    }

    /// Shift-click on an edge: toggle membership, nodes untouched.
    pub fn toggle_edge(&mut self, id: EdgeId) {
        toggle(&mut self.edges, id);
    }

    /// Union nodes into the node selection (marquee).
    pub fn extend_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            if !self.nodes.contains(&id) {
                self.nodes.push(id);
            }
        }
    }

    /// Drop ids that no longer exist in `diagram`.
    pub fn retain_existing(&mut self, diagram: &Diagram) {
        self.nodes.retain(|id| diagram.contains_node(*id));
        self.edges.retain(|id| diagram.edge(*id).is_some());
    }
}

fn toggle(ids: &mut Vec<NodeId>, id: NodeId) {
    if let Some(pos) = ids.iter().position(|x| *x == id) {
        ids.remove(pos);
    } else {
        ids.push(id);
    }
}
