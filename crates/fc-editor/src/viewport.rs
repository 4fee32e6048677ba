//! Viewport: zoom, scroll, content sizing, and the minimap contract.
//!
//! Scroll is kept in canvas units, so `client → canvas` is
//! `(client - origin) / zoom + scroll`. The content box always starts at the
//! canvas origin and reaches `content_padding` past the furthest node, but
//! never less than the visible area.

use crate::config::EditorConfig;
use fc_core::Diagram;
use fc_core::geometry::{bounds, to_canvas_coords, to_client_coords};
use kurbo::{Point, Rect, Size, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    /// Top-left of the visible area, in canvas units.
    scroll: Vec2,
    /// Client position of the canvas element's top-left corner.
    origin: Point,
    /// Visible area in client pixels.
    client_size: Size,
    /// Cached content box, refreshed by [`Viewport::update_content`].
    content: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll: Vec2::ZERO,
            origin: Point::ZERO,
            client_size: Size::new(800.0, 600.0),
            content: Size::new(800.0, 600.0),
        }
    }
}

impl Viewport {
    pub fn new(origin: Point, client_size: Size) -> Self {
        Self {
            origin,
            client_size,
            content: client_size,
            ..Self::default()
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn content(&self) -> Size {
        self.content
    }

    /// Host resized or moved the canvas element.
    pub fn set_client_rect(&mut self, origin: Point, client_size: Size) {
        self.origin = origin;
        self.client_size = client_size;
    }

    /// Visible area in canvas units.
    pub fn visible_size(&self) -> Size {
        Size::new(
            self.client_size.width / self.zoom,
            self.client_size.height / self.zoom,
        )
    }

    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.scroll.to_point(), self.visible_size())
    }

    pub fn to_canvas(&self, client: Point) -> Point {
        to_canvas_coords(client, self.origin, self.scroll, self.zoom)
    }

    pub fn to_client(&self, canvas: Point) -> Point {
        to_client_coords(canvas, self.origin, self.scroll, self.zoom)
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    /// Set the zoom, clamped. Returns `true` if it changed.
    pub fn set_zoom(&mut self, zoom: f64, config: &EditorConfig) -> bool {
        let zoom = config.clamp_zoom(zoom);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = zoom;
        self.clamp_scroll();
        log::trace!("viewport: zoom {:.2}", zoom);
        true
    }

    pub fn zoom_in(&mut self, config: &EditorConfig) -> bool {
        self.set_zoom(self.zoom + config.zoom_step, config)
    }

    pub fn zoom_out(&mut self, config: &EditorConfig) -> bool {
        self.set_zoom(self.zoom - config.zoom_step, config)
    }

    /// Wheel with the command modifier: `zoom += -delta_y / divisor`.
    pub fn wheel_zoom(&mut self, delta_y: f64, config: &EditorConfig) -> bool {
        self.set_zoom(self.zoom - delta_y / config.wheel_zoom_divisor, config)
    }

    // ─── Content & scroll ────────────────────────────────────────────────

    /// Recompute the content box for `diagram` at the current zoom.
    pub fn update_content(&mut self, diagram: &Diagram, config: &EditorConfig) {
        let visible = self.visible_size();
        let (mut max_x, mut max_y) = (0.0_f64, 0.0_f64);
        if !diagram.nodes.is_empty() {
            for n in &diagram.nodes {
                let b = bounds(n);
                max_x = max_x.max(b.x1);
                max_y = max_y.max(b.y1);
            }
            max_x += config.content_padding;
            max_y += config.content_padding;
        }
        self.content = Size::new(visible.width.max(max_x), visible.height.max(max_y));
        self.clamp_scroll();
    }

    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.content)
    }

    /// Scroll to `scroll`, clamped to `[0, content - visible]`.
    pub fn scroll_to(&mut self, scroll: Vec2) {
        self.scroll = scroll;
        self.clamp_scroll();
    }

    pub fn scroll_by(&mut self, delta: Vec2) {
        self.scroll_to(self.scroll + delta);
    }

    fn clamp_scroll(&mut self) {
        let visible = self.visible_size();
        let max_x = (self.content.width - visible.width).max(0.0);
        let max_y = (self.content.height - visible.height).max(0.0);
        self.scroll = Vec2::new(self.scroll.x.clamp(0.0, max_x), self.scroll.y.clamp(0.0, max_y));
    }

    /// Zoom 1.0, scroll centred on the content box.
    pub fn reset_view(&mut self, diagram: &Diagram, config: &EditorConfig) {
        self.zoom = 1.0;
        self.update_content(diagram, config);
        let visible = self.visible_size();
        self.scroll_to(Vec2::new(
            (self.content.width - visible.width) / 2.0,
            (self.content.height - visible.height) / 2.0,
        ));
        log::debug!(
            "viewport: reset, scroll ({:.0}, {:.0})",
            self.scroll.x,
            self.scroll.y
        );
    }

    // ─── Minimap ─────────────────────────────────────────────────────────

    pub fn minimap(&self, config: &EditorConfig) -> Minimap {
        Minimap::new(self, config.minimap_width)
    }

    /// Click at `p` (minimap pixels): centre the visible area there.
    pub fn minimap_click(&mut self, p: Point, config: &EditorConfig) {
        let map = self.minimap(config);
        let visible = self.visible_size();
        let target = map.to_canvas(p);
        self.scroll_to(Vec2::new(
            target.x - visible.width / 2.0,
            target.y - visible.height / 2.0,
        ));
    }

    /// Drag of the minimap viewport rectangle by `delta` minimap pixels.
    pub fn minimap_drag(&mut self, delta: Vec2, config: &EditorConfig) {
        let map = self.minimap(config);
        if map.scale > 0.0 {
            self.scroll_by(delta / map.scale);
        }
    }
}

/// Geometry of the overview map at the current viewport state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Minimap {
    /// Minimap pixels per canvas unit.
    pub scale: f64,
    pub size: Size,
    /// The visible area, in minimap pixels.
    pub viewport: Rect,
}

impl Minimap {
    fn new(vp: &Viewport, width: f64) -> Self {
        let scale = if vp.content.width > 0.0 {
            width / vp.content.width
        } else {
            0.0
        };
        let visible = vp.visible_rect();
        Self {
            scale,
            size: Size::new(width, vp.content.height * scale),
            viewport: Rect::new(
                visible.x0 * scale,
                visible.y0 * scale,
                visible.x1 * scale,
                visible.y1 * scale,
            ),
        }
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        if self.scale <= 0.0 {
            return Point::ZERO;
        }
        Point::new(p.x / self.scale, p.y / self.scale)
    }
}
