//! Edge routing: straight connectors between side midpoints.
//!
//! Each node offers four anchors (top, right, bottom, left midpoints).
//! An edge uses the closest anchor pair; on ties the earlier pair in
//! that order wins.

use fc_core::geometry::bounds;
use fc_core::{ArrowType, Diagram, Edge, Node};
use kurbo::{Line, ParamCurveNearest, Point, Rect, Vec2};
use serde::Serialize;
use smallvec::SmallVec;

/// Arrowhead length along the edge.
pub const ARROW_LENGTH: f64 = 10.0;
/// Half the arrowhead's base width.
pub const ARROW_HALF_WIDTH: f64 = 5.0;

/// Top, right, bottom, left midpoints.
pub fn side_midpoints(r: Rect) -> [Point; 4] {
    let c = r.center();
    [
        Point::new(c.x, r.y0),
        Point::new(r.x1, c.y),
        Point::new(c.x, r.y1),
        Point::new(r.x0, c.y),
    ]
}

/// Resolved straight path of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeRoute {
    pub start: Point,
    pub end: Point,
}

impl EdgeRoute {
    pub fn line(&self) -> Line {
        Line::new(self.start, self.end)
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Shortest distance from `p` to the segment.
    pub fn distance_to(&self, p: Point) -> f64 {
        self.line().nearest(p, 1e-6).distance_sq.sqrt()
    }
}

/// Route between two nodes using the closest anchor pair.
pub fn route_between(from: &Node, to: &Node) -> EdgeRoute {
    let from_points = side_midpoints(bounds(from));
    let to_points = side_midpoints(bounds(to));
    // Bottom of source to top of target unless something is closer.
    let mut best = EdgeRoute {
        start: from_points[2],
        end: to_points[0],
    };
    let mut best_dist = f64::INFINITY;
    for p1 in from_points {
        for p2 in to_points {
            let d = p1.distance(p2);
            if d < best_dist {
                best_dist = d;
                best = EdgeRoute { start: p1, end: p2 };
            }
        }
    }
    best
}

/// Route an edge of `diagram`; `None` if an endpoint is missing.
pub fn route_edge(diagram: &Diagram, edge: &Edge) -> Option<EdgeRoute> {
    Some(route_between(diagram.node(edge.from)?, diagram.node(edge.to)?))
}

/// Triangle drawn at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

fn arrowhead(tip: Point, tail: Point) -> Option<ArrowHead> {
    let dir: Vec2 = tip - tail;
    let len = dir.hypot();
    if len < f64::EPSILON {
        return None;
    }
    let unit = dir / len;
    let base = tip - unit * ARROW_LENGTH;
    let normal = Vec2::new(-unit.y, unit.x) * ARROW_HALF_WIDTH;
    Some(ArrowHead {
        tip,
        left: base + normal,
        right: base - normal,
    })
}

/// Arrowheads for an edge: at `to` unless `None`, also at `from` when
/// bidirectional.
pub fn arrowheads(route: &EdgeRoute, arrow: ArrowType) -> SmallVec<[ArrowHead; 2]> {
    let mut heads = SmallVec::new();
    if arrow.head_at_to() {
        heads.extend(arrowhead(route.end, route.start));
    }
    if arrow.head_at_from() {
        heads.extend(arrowhead(route.start, route.end));
    }
    heads
}
