//! Render view: a flat, host-agnostic description of one frame.
//!
//! The editor fills an [`Overlay`] with its transient state (guides,
//! rubber band, marquee); [`RenderView::build`] combines it with the
//! diagram and selection. Hosts paint the view; exporters receive it after
//! [`RenderView::prepare_for_capture`] has stripped every editing
//! decoration.

use crate::hit::{
    CONNECT_HANDLE_RADIUS, ENDPOINT_HANDLE_RADIUS, connect_handle_center, resize_handle_rect,
};
use crate::route::{ArrowHead, EdgeRoute, arrowheads, route_edge};
use fc_core::geometry::bounds;
use fc_core::{Diagram, EdgeId, Guide, NodeId, NodeType, Selection};
use kurbo::{Line, Point, Rect};
use serde::Serialize;
use smallvec::SmallVec;

// ─── Items ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub kind: NodeType,
    pub text: String,
    pub rect: Rect,
    pub color: Option<String>,
    pub selected: bool,
    /// Text is being edited in place; the host shows an input instead.
    pub editing: bool,
    /// Highlighted as the drop target of a connect/reconnect gesture.
    pub connect_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub id: EdgeId,
    pub route: EdgeRoute,
    pub label: Option<String>,
    pub arrowheads: SmallVec<[ArrowHead; 2]>,
    pub selected: bool,
    pub editing: bool,
}

/// Interactive handles drawn on selected items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HandleView {
    Resize(Rect),
    Connect { center: Point, radius: f64 },
    Endpoint { center: Point, radius: f64 },
}

/// Editor state drawn on top of the diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub guides: Vec<Guide>,
    /// Connect preview from the source anchor to the pointer.
    pub rubber_band: Option<Line>,
    pub marquee: Option<Rect>,
    pub connect_target: Option<NodeId>,
    pub editing_node: Option<NodeId>,
    pub editing_edge: Option<EdgeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub handles: Vec<HandleView>,
    pub guides: Vec<Guide>,
    pub rubber_band: Option<Line>,
    pub marquee: Option<Rect>,
    /// Canvas area to capture, in canvas units.
    pub content: Rect,
}

impl RenderView {
    pub fn build(
        diagram: &Diagram,
        selection: &Selection,
        overlay: &Overlay,
        content: Rect,
    ) -> Self {
        let nodes = diagram
            .nodes
            .iter()
            .map(|n| NodeView {
                id: n.id,
                kind: n.kind,
                text: n.text.clone(),
                rect: bounds(n),
                color: n.color.clone(),
                selected: selection.contains_node(n.id),
                editing: overlay.editing_node == Some(n.id),
                connect_target: overlay.connect_target == Some(n.id),
            })
            .collect();

        let mut handles = Vec::new();
        let edges = diagram
            .edges
            .iter()
            .filter_map(|e| {
                let route = route_edge(diagram, e)?;
                let selected = selection.contains_edge(e.id);
                if selected {
                    for center in [route.start, route.end] {
                        handles.push(HandleView::Endpoint {
                            center,
                            radius: ENDPOINT_HANDLE_RADIUS,
                        });
                    }
                }
                Some(EdgeView {
                    id: e.id,
                    route,
                    label: e.label.clone(),
                    arrowheads: arrowheads(&route, e.arrow()),
                    selected,
                    editing: overlay.editing_edge == Some(e.id),
                })
            })
            .collect();

        for n in diagram.nodes.iter().filter(|n| selection.contains_node(n.id)) {
            handles.push(HandleView::Resize(resize_handle_rect(n)));
            handles.push(HandleView::Connect {
                center: connect_handle_center(n),
                radius: CONNECT_HANDLE_RADIUS,
            });
        }

        Self {
            nodes,
            edges,
            handles,
            guides: overlay.guides.clone(),
            rubber_band: overlay.rubber_band,
            marquee: overlay.marquee,
            content,
        }
    }

    /// Strip selection rings, handles, guides, previews, and in-place
    /// editors so a capture shows only the diagram.
    pub fn prepare_for_capture(&mut self) {
        for n in &mut self.nodes {
            n.selected = false;
            n.editing = false;
            n.connect_target = false;
        }
        for e in &mut self.edges {
            e.selected = false;
            e.editing = false;
        }
        self.handles.clear();
        self.guides.clear();
        self.rubber_band = None;
        self.marquee = None;
    }

    pub fn has_decorations(&self) -> bool {
        !self.handles.is_empty()
            || !self.guides.is_empty()
            || self.rubber_band.is_some()
            || self.marquee.is_some()
            || self.nodes.iter().any(|n| n.selected || n.editing || n.connect_target)
            || self.edges.iter().any(|e| e.selected || e.editing)
    }
}
