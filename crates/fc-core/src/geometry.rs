//! Geometry resolver and coordinate mapper.
//!
//! Every geometry-dependent computation (snapping, hit testing, marquee,
//! minimap, content sizing) goes through [`dimensions`] so that a node's
//! explicit size and its type default are resolved in one place.

use crate::model::{Node, NodeType, Position, Size};
use kurbo::{Point, Rect, Vec2};

/// Smallest size a resize gesture can produce.
pub const MIN_WIDTH: f64 = 80.0;
pub const MIN_HEIGHT: f64 = 40.0;

/// Default box for decision nodes (square so the rotated diamond fits).
pub const DECISION_SIZE: Size = Size::new(120.0, 120.0);
/// Default box for every other node type.
pub const DEFAULT_SIZE: Size = Size::new(150.0, 60.0);

/// Type default dimensions.
pub fn default_dimensions(kind: NodeType) -> Size {
    match kind {
        NodeType::Decision => DECISION_SIZE,
        NodeType::StartEnd | NodeType::Process | NodeType::Io => DEFAULT_SIZE,
    }
}

/// Effective `{width, height}`: the explicit size if set, else the type default.
pub fn dimensions(node: &Node) -> Size {
    node.size.unwrap_or_else(|| default_dimensions(node.kind))
}

/// Canvas-space bounding box.
pub fn bounds(node: &Node) -> Rect {
    let size = dimensions(node);
    Rect::new(
        node.position.x,
        node.position.y,
        node.position.x + size.width,
        node.position.y + size.height,
    )
}

pub fn center(node: &Node) -> Point {
    bounds(node).center()
}

/// Anchor a new connection starts from: bottom centre of the box.
pub fn connect_anchor(node: &Node) -> Point {
    let b = bounds(node);
    Point::new((b.x0 + b.x1) / 2.0, b.y1)
}

/// Strict overlap test: touching edges do not count.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Normalised rectangle spanned by two corner points, in any order.
pub fn rect_from_corners(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Position::new(p.x, p.y)
    }
}

impl From<Position> for Point {
    fn from(p: Position) -> Self {
        Point::new(p.x, p.y)
    }
}

// ─── Coordinate mapping ──────────────────────────────────────────────────

/// Map a client (screen) point into canvas space.
///
/// `origin` is the client position of the viewport's top-left corner and
/// `scroll` the canvas-space offset of that corner.
pub fn to_canvas_coords(client: Point, origin: Point, scroll: Vec2, zoom: f64) -> Point {
    Point::new(
        (client.x - origin.x) / zoom + scroll.x,
        (client.y - origin.y) / zoom + scroll.y,
    )
}

/// Inverse of [`to_canvas_coords`].
pub fn to_client_coords(canvas: Point, origin: Point, scroll: Vec2, zoom: f64) -> Point {
    Point::new(
        (canvas.x - scroll.x) * zoom + origin.x,
        (canvas.y - scroll.y) * zoom + origin.y,
    )
}
