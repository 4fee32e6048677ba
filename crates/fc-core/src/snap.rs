//! Alignment snapping for node drags.
//!
//! The primary dragged box exposes three reference lines per axis
//! (left / centre / right, top / middle / bottom). Each is compared with the
//! same three lines of every stationary box, giving 9 pairings per axis per
//! target. Pairings are enumerated dragged-line-major and targets in diagram
//! order:
//!
//! ```text
//! left×left, left×center, left×right, center×left, … right×right
//! ```
//!
//! A pairing qualifies when the unsnapped distance is strictly below the
//! threshold. Every qualifying pairing contributes a guide line; the delta
//! correction on each axis comes from the **first** qualifying pairing
//! only, even if a later one is closer.

use kurbo::{Rect, Vec2};
use serde::Serialize;
use smallvec::SmallVec;

/// Distance (canvas units) under which two reference lines snap together.
pub const SNAP_THRESHOLD: f64 = 8.0;

/// A transient alignment guide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "axis", content = "at", rename_all = "lowercase")]
pub enum Guide {
    /// Vertical line at canvas `x`.
    Vertical(f64),
    /// Horizontal line at canvas `y`.
    Horizontal(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Delta after snapping.
    pub delta: Vec2,
    pub guides: SmallVec<[Guide; 6]>,
}

fn vertical_lines(r: Rect) -> [f64; 3] {
    [r.x0, (r.x0 + r.x1) / 2.0, r.x1]
}

fn horizontal_lines(r: Rect) -> [f64; 3] {
    [r.y0, (r.y0 + r.y1) / 2.0, r.y1]
}

/// Run the 9 pairings of one axis against one target.
///
/// `correction` is filled by the first qualifying pairing seen across all
/// targets; matched target lines are pushed through `guide`.
fn snap_axis(
    dragged: [f64; 3],
    target: [f64; 3],
    threshold: f64,
    correction: &mut Option<f64>,
    mut guide: impl FnMut(f64),
) {
    for d in dragged {
        for t in target {
            if (d - t).abs() < threshold {
                if correction.is_none() {
                    *correction = Some(t - d);
                }
                guide(t);
            }
        }
    }
}

/// Snap a drag of `primary` (its pre-drag bounds) by `delta` against
/// `targets`.
///
/// Distances are measured on the unsnapped position, so the guide set does
/// not depend on which pairing won.
pub fn compute_snap(
    primary: Rect,
    delta: Vec2,
    targets: impl IntoIterator<Item = Rect>,
    threshold: f64,
) -> SnapResult {
    let moved = primary + delta;
    let dx_lines = vertical_lines(moved);
    let dy_lines = horizontal_lines(moved);

    let mut correction_x = None;
    let mut correction_y = None;
    let mut guides = SmallVec::new();

    for target in targets {
        snap_axis(
            dx_lines,
            vertical_lines(target),
            threshold,
            &mut correction_x,
            |x| guides.push(Guide::Vertical(x)),
        );
        snap_axis(
            dy_lines,
            horizontal_lines(target),
            threshold,
            &mut correction_y,
            |y| guides.push(Guide::Horizontal(y)),
        );
    }

    let snapped = Vec2::new(
        delta.x + correction_x.unwrap_or(0.0),
        delta.y + correction_y.unwrap_or(0.0),
    );
    log::trace!(
        "snap: raw ({:.1}, {:.1}) -> ({:.1}, {:.1}), {} guides",
        delta.x,
        delta.y,
        snapped.x,
        snapped.y,
        guides.len()
    );
    SnapResult {
        delta: snapped,
        guides,
    }
}
