//! Hit testing: canvas point → what the pointer pressed.
//!
//! Priority, highest first:
//! 1. endpoint handles of selected edges
//! 2. resize / connect handles of selected nodes (topmost node first)
//! 3. node bodies, reverse diagram order (last painted = topmost)
//! 4. edge strokes, within a tolerance band
//!
//! Anything else is background.

use crate::route::route_edge;
use fc_core::geometry::{bounds, intersects};
use fc_core::{Diagram, EdgeEnd, EdgeId, Node, NodeId, Selection};
use kurbo::{Point, Rect};

/// Side of the square resize handle.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;
/// How far the resize handle reaches inside the node's corner.
pub const RESIZE_HANDLE_INSET: f64 = 10.0;
pub const CONNECT_HANDLE_RADIUS: f64 = 8.0;
/// Gap between the node's bottom edge and the connect handle centre.
pub const CONNECT_HANDLE_OFFSET: f64 = 2.0;
/// Half the width of the invisible stroke used to pick edges.
pub const EDGE_HIT_TOLERANCE: f64 = 7.5;
pub const ENDPOINT_HANDLE_RADIUS: f64 = 7.0;

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Background,
    Node(NodeId),
    ResizeHandle(NodeId),
    ConnectHandle(NodeId),
    Edge(EdgeId),
    EdgeEndpoint(EdgeId, EdgeEnd),
}

/// Square straddling the bottom-right corner.
pub fn resize_handle_rect(node: &Node) -> Rect {
    let b = bounds(node);
    let x0 = b.x1 - RESIZE_HANDLE_INSET;
    let y0 = b.y1 - RESIZE_HANDLE_INSET;
    Rect::new(x0, y0, x0 + RESIZE_HANDLE_SIZE, y0 + RESIZE_HANDLE_SIZE)
}

/// Centre of the connect handle, just below the bottom-centre anchor.
pub fn connect_handle_center(node: &Node) -> Point {
    let b = bounds(node);
    Point::new((b.x0 + b.x1) / 2.0, b.y1 + CONNECT_HANDLE_OFFSET)
}

fn rect_contains(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Find what is under `p`.
pub fn hit_test(diagram: &Diagram, selection: &Selection, p: Point) -> Hit {
    for edge in diagram.edges.iter().rev() {
        if !selection.contains_edge(edge.id) {
            continue;
        }
        let Some(route) = route_edge(diagram, edge) else {
            continue;
        };
        if route.start.distance(p) <= ENDPOINT_HANDLE_RADIUS {
            return Hit::EdgeEndpoint(edge.id, EdgeEnd::From);
        }
        if route.end.distance(p) <= ENDPOINT_HANDLE_RADIUS {
            return Hit::EdgeEndpoint(edge.id, EdgeEnd::To);
        }
    }

    for node in diagram.nodes.iter().rev() {
        if !selection.contains_node(node.id) {
            continue;
        }
        if rect_contains(resize_handle_rect(node), p) {
            return Hit::ResizeHandle(node.id);
        }
        if connect_handle_center(node).distance(p) <= CONNECT_HANDLE_RADIUS {
            return Hit::ConnectHandle(node.id);
        }
    }

    if let Some(id) = node_at(diagram, p) {
        return Hit::Node(id);
    }

    for edge in diagram.edges.iter().rev() {
        if let Some(route) = route_edge(diagram, edge)
            && route.distance_to(p) <= EDGE_HIT_TOLERANCE
        {
            return Hit::Edge(edge.id);
        }
    }

    Hit::Background
}

/// Topmost node whose body contains `p`. Used for connection targets.
pub fn node_at(diagram: &Diagram, p: Point) -> Option<NodeId> {
    diagram
        .nodes
        .iter()
        .rev()
        .find(|n| rect_contains(bounds(n), p))
        .map(|n| n.id)
}

/// Nodes whose bounds strictly overlap `rect`, in diagram order.
/// Used for marquee selection.
pub fn hit_test_rect(diagram: &Diagram, rect: Rect) -> Vec<NodeId> {
    diagram
        .nodes
        .iter()
        .filter(|n| intersects(bounds(n), rect))
        .map(|n| n.id)
        .collect()
}
