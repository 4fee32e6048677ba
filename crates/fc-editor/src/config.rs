//! Editor tunables.
//!
//! Every constant the interaction layer depends on lives here so hosts can
//! adjust them at construction. `Default` gives the stock behaviour.

use fc_core::SNAP_THRESHOLD;
use fc_core::geometry::{MIN_HEIGHT, MIN_WIDTH};

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Snap distance in canvas units; pairings must be strictly closer.
    pub snap_threshold: f64,
    /// Smallest width a resize may produce.
    pub min_width: f64,
    pub min_height: f64,
    /// Client pixels the pointer must travel before a background press
    /// becomes a pan instead of a click.
    pub pan_threshold: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per zoom-in / zoom-out step.
    pub zoom_step: f64,
    /// Wheel `deltaY` units per 1.0 of zoom.
    pub wheel_zoom_divisor: f64,
    /// Space added right of and below the furthest node.
    pub content_padding: f64,
    pub minimap_width: f64,
    /// Undo depth; `None` keeps every snapshot.
    pub history_depth: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
            pan_threshold: 5.0,
            min_zoom: 0.2,
            max_zoom: 2.5,
            zoom_step: 0.15,
            wheel_zoom_divisor: 100.0,
            content_padding: 300.0,
            minimap_width: 200.0,
            history_depth: None,
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = Some(depth);
        self
    }

    /// Clamp `zoom` into `[min_zoom, max_zoom]`.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_constants() {
        let c = EditorConfig::default();
        assert_eq!(c.snap_threshold, 8.0);
        assert_eq!((c.min_width, c.min_height), (80.0, 40.0));
        assert_eq!(c.pan_threshold, 5.0);
        assert_eq!(c.content_padding, 300.0);
        assert!(c.history_depth.is_none());
    }

    #[test]
    fn zoom_clamps_to_limits() {
        let c = EditorConfig::default();
        assert_eq!(c.clamp_zoom(0.05), 0.2);
        assert_eq!(c.clamp_zoom(9.0), 2.5);
        assert_eq!(c.clamp_zoom(1.3), 1.3);
    }
}
