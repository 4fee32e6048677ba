//! Pointer interaction state machine.
//!
//! Exactly one gesture is active at a time:
//!
//! ```text
//! none ─┬─ press node body ─────────► dragging ─────┐
//!       ├─ press resize handle ─────► resizing ─────┤
//!       ├─ press connect handle ────► connecting ───┤
//!       ├─ press edge endpoint ─────► reconnecting ─┼─ pointer-up ─► none
//!       ├─ press background ────────► panning ──────┤
//!       └─ shift+press background ──► marquee ──────┘
//! ```
//!
//! Leaving `none` asks the host to capture the pointer; returning to it
//! releases the capture. Moves mutate the diagram transiently; pointer-up
//! commits at most one history step holding the pre-gesture state.

use crate::config::EditorConfig;
use crate::input::Modifiers;
use crate::store::DiagramStore;
use crate::viewport::Viewport;
use fc_core::geometry::{center, connect_anchor, dimensions, rect_from_corners};
use fc_core::{
    Diagram, EdgeEnd, EdgeId, Guide, NodeId, Position, Size, bounds, compute_snap,
};
use fc_render::{Overlay, hit_test_rect, node_at};
use kurbo::{Line, Point, Rect, Vec2};
use smallvec::{SmallVec, smallvec};
use std::mem;

// ─── Effects & errors ────────────────────────────────────────────────────

/// Instruction from the editor to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    /// Route pointer moves and the release to the editor even when the
    /// pointer leaves the canvas.
    CapturePointer,
    ReleasePointer,
    Redraw,
    /// Show and focus the in-place text input.
    FocusTextEditor,
}

pub type Effects = SmallVec<[Effect; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("cannot start {requested} while {active} is in progress")]
    Busy { active: Mode, requested: Mode },
}

/// Gesture kind without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    None,
    Dragging,
    Resizing,
    Connecting,
    Reconnecting,
    Panning,
    Marquee,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::None => "none",
            Mode::Dragging => "dragging",
            Mode::Resizing => "resizing",
            Mode::Connecting => "connecting",
            Mode::Reconnecting => "reconnecting",
            Mode::Panning => "panning",
            Mode::Marquee => "marquee",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Gesture state ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    /// The node under the pointer at press time.
    pub pressed: NodeId,
    /// Canvas point of the press.
    pub start: Point,
    /// Pre-drag positions in diagram order; the first entry is the primary
    /// box the snap engine aligns.
    pub initial: SmallVec<[(NodeId, Position); 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resize {
    pub node: NodeId,
    pub start: Point,
    /// Resolved size at press time.
    pub initial_size: Size,
    pub initial_position: Position,
    /// The node's own size field, restored into the undo snapshot.
    pub explicit_size: Option<Size>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    None,
    Dragging(Drag),
    Resizing(Resize),
    Connecting {
        source: NodeId,
        /// Bottom-centre of the source node.
        anchor: Point,
        pointer: Point,
    },
    Reconnecting {
        edge: EdgeId,
        end: EdgeEnd,
        pointer: Point,
    },
    Panning {
        /// Client point of the press.
        start: Point,
        start_scroll: Vec2,
        /// Threshold exceeded; until then the press may still be a click.
        active: bool,
    },
    Marquee {
        start: Point,
        end: Point,
    },
}

impl Gesture {
    pub fn mode(&self) -> Mode {
        match self {
            Gesture::None => Mode::None,
            Gesture::Dragging(_) => Mode::Dragging,
            Gesture::Resizing(_) => Mode::Resizing,
            Gesture::Connecting { .. } => Mode::Connecting,
            Gesture::Reconnecting { .. } => Mode::Reconnecting,
            Gesture::Panning { .. } => Mode::Panning,
            Gesture::Marquee { .. } => Mode::Marquee,
        }
    }
}

/// What a pointer-up did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No gesture was active.
    Idle,
    /// A drag that moved nothing: click selection was applied.
    Clicked(NodeId),
    Moved,
    /// `true` if the size changed and a snapshot was committed.
    Resized(bool),
    Connected(Option<EdgeId>),
    Reconnected(bool),
    Panned,
    /// Background press released under the pan threshold.
    BackgroundClick,
    /// Number of nodes inside the marquee.
    Marquee(usize),
}

/// Mutable editor state a transition may touch.
pub struct InteractionContext<'a> {
    pub store: &'a mut DiagramStore,
    pub viewport: &'a mut Viewport,
    pub config: &'a EditorConfig,
}

// ─── Machine ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    gesture: Gesture,
    /// Alignment guides of the latest drag move.
    guides: SmallVec<[Guide; 6]>,
}

fn started() -> Effects {
    smallvec![Effect::CapturePointer, Effect::Redraw]
}

impl Interaction {
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn mode(&self) -> Mode {
        self.gesture.mode()
    }

    pub fn is_busy(&self) -> bool {
        self.mode() != Mode::None
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    fn ensure_idle(&self, requested: Mode) -> Result<(), InteractionError> {
        match self.mode() {
            Mode::None => Ok(()),
            active => Err(InteractionError::Busy { active, requested }),
        }
    }

    fn start(&mut self, gesture: Gesture) -> Effects {
        log::debug!("interaction: none -> {}", gesture.mode());
        self.gesture = gesture;
        started()
    }

    // ─── Begin ───────────────────────────────────────────────────────────

    /// Press on a node body. Drags the whole node selection if the pressed
    /// node is part of it, else the pressed node alone.
    pub fn begin_drag(
        &mut self,
        store: &DiagramStore,
        node: NodeId,
        at: Point,
    ) -> Result<Effects, InteractionError> {
        self.ensure_idle(Mode::Dragging)?;
        let diagram = store.diagram();
        if !diagram.contains_node(node) {
            return Ok(Effects::new());
        }
        let group = store.selection.contains_node(node);
        let initial = diagram
            .nodes
            .iter()
            .filter(|n| {
                if group {
                    store.selection.contains_node(n.id)
                } else {
                    n.id == node
                }
            })
            .map(|n| (n.id, n.position))
            .collect();
        Ok(self.start(Gesture::Dragging(Drag {
            pressed: node,
            start: at,
            initial,
        })))
    }

    pub fn begin_resize(
        &mut self,
        store: &DiagramStore,
        node: NodeId,
        at: Point,
    ) -> Result<Effects, InteractionError> {
        self.ensure_idle(Mode::Resizing)?;
        let Some(n) = store.diagram().node(node) else {
            return Ok(Effects::new());
        };
        Ok(self.start(Gesture::Resizing(Resize {
            node,
            start: at,
            initial_size: dimensions(n),
            initial_position: n.position,
            explicit_size: n.size,
        })))
    }

    pub fn begin_connect(
        &mut self,
        store: &DiagramStore,
        source: NodeId,
        at: Point,
    ) -> Result<Effects, InteractionError> {
        self.ensure_idle(Mode::Connecting)?;
        let Some(n) = store.diagram().node(source) else {
            return Ok(Effects::new());
        };
        Ok(self.start(Gesture::Connecting {
            source,
            anchor: connect_anchor(n),
            pointer: at,
        }))
    }

    pub fn begin_reconnect(
        &mut self,
        store: &DiagramStore,
        edge: EdgeId,
        end: EdgeEnd,
        at: Point,
    ) -> Result<Effects, InteractionError> {
        self.ensure_idle(Mode::Reconnecting)?;
        if store.diagram().edge(edge).is_none() {
            return Ok(Effects::new());
        }
        Ok(self.start(Gesture::Reconnecting {
            edge,
            end,
            pointer: at,
        }))
    }

    /// Press on the background without shift. `client` is in client pixels.
    pub fn begin_pan(
        &mut self,
        viewport: &Viewport,
        client: Point,
    ) -> Result<Effects, InteractionError> {
        self.ensure_idle(Mode::Panning)?;
        Ok(self.start(Gesture::Panning {
            start: client,
            start_scroll: viewport.scroll(),
            active: false,
        }))
    }

    pub fn begin_marquee(&mut self, at: Point) -> Result<Effects, InteractionError> {
        self.ensure_idle(Mode::Marquee)?;
        Ok(self.start(Gesture::Marquee { start: at, end: at }))
    }

    // ─── Move ────────────────────────────────────────────────────────────

    /// Pointer moved to `canvas` (canvas units) / `client` (client pixels).
    pub fn pointer_move(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        canvas: Point,
        client: Point,
    ) -> Effects {
        match &mut self.gesture {
            Gesture::None => return Effects::new(),
            Gesture::Dragging(drag) => {
                let raw = canvas - drag.start;
                if raw == Vec2::ZERO {
                    // Back at the press point: pre-drag positions, no snapping.
                    let diagram = ctx.store.diagram();
                    let displaced = drag
                        .initial
                        .iter()
                        .any(|&(id, p)| diagram.node(id).is_some_and(|n| n.position != p));
                    if displaced {
                        ctx.store.move_nodes(&drag.initial);
                    }
                    self.guides.clear();
                    return smallvec![Effect::Redraw];
                }
                let diagram = ctx.store.diagram();
                let result = primary_rect(diagram, drag).map(|primary| {
                    let targets = diagram
                        .nodes
                        .iter()
                        .filter(|n| !drag.initial.iter().any(|(id, _)| *id == n.id))
                        .map(bounds);
                    compute_snap(primary, raw, targets, ctx.config.snap_threshold)
                });
                let Some(snap) = result else {
                    return Effects::new();
                };
                let moved: SmallVec<[(NodeId, Position); 4]> = drag
                    .initial
                    .iter()
                    .map(|&(id, p)| (id, Position::new(p.x + snap.delta.x, p.y + snap.delta.y)))
                    .collect();
                ctx.store.move_nodes(&moved);
                self.guides = snap.guides;
            }
            Gesture::Resizing(r) => {
                let d = canvas - r.start;
                let size = Size::new(
                    (r.initial_size.width + d.x).max(ctx.config.min_width),
                    (r.initial_size.height + d.y).max(ctx.config.min_height),
                );
                // Back at the start: keep the node's own size field, even one
                // below the minimum.
                let field = if d == Vec2::ZERO || size == r.initial_size {
                    r.explicit_size
                } else {
                    Some(size)
                };
                ctx.store.set_node_geometry(r.node, field, r.initial_position);
                log::trace!("resize {}: {:.0}×{:.0}", r.node, size.width, size.height);
            }
            Gesture::Connecting { pointer, .. } | Gesture::Reconnecting { pointer, .. } => {
                *pointer = canvas;
            }
            Gesture::Panning {
                start,
                start_scroll,
                active,
            } => {
                let delta = client - *start;
                let t = ctx.config.pan_threshold;
                if !*active && (delta.x.abs() > t || delta.y.abs() > t) {
                    *active = true;
                    log::trace!("pan: threshold exceeded");
                }
                if !*active {
                    return Effects::new();
                }
                let zoom = ctx.viewport.zoom();
                ctx.viewport.scroll_to(*start_scroll - delta / zoom);
            }
            Gesture::Marquee { end, .. } => *end = canvas,
        }
        smallvec![Effect::Redraw]
    }

    // ─── Release ─────────────────────────────────────────────────────────

    /// Pointer released. The release point also counts as the final move;
    /// releasing where the gesture started changes nothing.
    pub fn pointer_up(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        canvas: Point,
        client: Point,
        modifiers: Modifiers,
    ) -> (Outcome, Effects) {
        if !self.is_busy() {
            return (Outcome::Idle, Effects::new());
        }
        self.pointer_move(ctx, canvas, client);
        let gesture = mem::take(&mut self.gesture);
        self.guides.clear();
        log::debug!("interaction: {} -> none", gesture.mode());

        let store = &mut *ctx.store;
        let outcome = match gesture {
            Gesture::None => Outcome::Idle,
            Gesture::Dragging(drag) => finish_drag(store, drag, modifiers),
            Gesture::Resizing(r) => finish_resize(store, r),
            Gesture::Connecting { source, .. } => {
                let target = node_at(store.diagram(), canvas);
                Outcome::Connected(target.and_then(|t| store.connect_nodes(source, t)))
            }
            Gesture::Reconnecting { edge, end, .. } => {
                let target = node_at(store.diagram(), canvas);
                let ok = target.is_some_and(|t| match end {
                    EdgeEnd::From => store.update_edge_connection(edge, Some(t), None),
                    EdgeEnd::To => store.update_edge_connection(edge, None, Some(t)),
                });
                Outcome::Reconnected(ok)
            }
            Gesture::Panning { active: true, .. } => Outcome::Panned,
            Gesture::Panning { active: false, .. } => {
                store.selection.clear();
                Outcome::BackgroundClick
            }
            Gesture::Marquee { start, end } => {
                let hits = hit_test_rect(store.diagram(), rect_from_corners(start, end));
                let n = hits.len();
                store.selection.extend_nodes(hits);
                Outcome::Marquee(n)
            }
        };
        (outcome, smallvec![Effect::ReleasePointer, Effect::Redraw])
    }

    // ─── Overlay ─────────────────────────────────────────────────────────

    /// Transient drawing state for the current gesture.
    pub fn overlay(&self, diagram: &Diagram) -> Overlay {
        let mut overlay = Overlay {
            guides: self.guides.to_vec(),
            ..Overlay::default()
        };
        match &self.gesture {
            Gesture::Connecting {
                anchor, pointer, ..
            } => {
                overlay.rubber_band = Some(Line::new(*anchor, *pointer));
                overlay.connect_target = node_at(diagram, *pointer);
            }
            Gesture::Reconnecting { edge, end, pointer } => {
                overlay.rubber_band = reconnect_preview(diagram, *edge, *end, *pointer);
                overlay.connect_target = node_at(diagram, *pointer);
            }
            Gesture::Marquee { start, end } => {
                overlay.marquee = Some(rect_from_corners(*start, *end));
            }
            _ => {}
        }
        overlay
    }
}

/// Pre-drag bounds of the primary dragged node.
fn primary_rect(diagram: &Diagram, drag: &Drag) -> Option<Rect> {
    let &(id, position) = drag.initial.first()?;
    let node = diagram.node(id)?;
    let size = dimensions(node);
    Some(Rect::new(
        position.x,
        position.y,
        position.x + size.width,
        position.y + size.height,
    ))
}

fn finish_drag(store: &mut DiagramStore, drag: Drag, modifiers: Modifiers) -> Outcome {
    let diagram = store.diagram();
    let moved = drag.initial.iter().any(|(id, p)| {
        diagram.node(*id).is_some_and(|n| n.position != *p)
    });
    if moved {
        let mut before = diagram.clone();
        for &(id, p) in &drag.initial {
            before.set_position(id, p);
        }
        store.commit(Some(before));
        log::debug!("drag: committed {} nodes", drag.initial.len());
        // A dragged node outside the selection becomes selected.
        if !store.selection.contains_node(drag.pressed) {
            if modifiers.shift {
                store.selection.toggle_node(drag.pressed);
            } else {
                store.selection.select_node(drag.pressed);
            }
        }
        return Outcome::Moved;
    }
    if modifiers.shift {
        store.selection.toggle_node(drag.pressed);
    } else {
        store.selection.select_node(drag.pressed);
    }
    Outcome::Clicked(drag.pressed)
}

fn finish_resize(store: &mut DiagramStore, r: Resize) -> Outcome {
    let Some(node) = store.diagram().node(r.node) else {
        return Outcome::Resized(false);
    };
    if dimensions(node) == r.initial_size {
        return Outcome::Resized(false);
    }
    let mut before = store.diagram().clone();
    if let Some(n) = before.node_mut(r.node) {
        n.size = r.explicit_size;
        n.position = r.initial_position;
    }
    store.commit(Some(before));
    log::debug!("resize: committed {}", r.node);
    Outcome::Resized(true)
}

/// Line from the fixed end's centre to the pointer.
fn reconnect_preview(diagram: &Diagram, edge: EdgeId, end: EdgeEnd, pointer: Point) -> Option<Line> {
    let e = diagram.edge(edge)?;
    match end {
        EdgeEnd::To => Some(Line::new(center(diagram.node(e.from)?), pointer)),
        EdgeEnd::From => Some(Line::new(pointer, center(diagram.node(e.to)?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{Node, NodeType};
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: DiagramStore,
        viewport: Viewport,
        config: EditorConfig,
        machine: Interaction,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: DiagramStore::new(None),
                viewport: Viewport::default(),
                config: EditorConfig::default(),
                machine: Interaction::default(),
            }
        }

        fn node(&mut self, kind: NodeType, x: f64, y: f64) -> NodeId {
            self.store.add_node(kind, Position::new(x, y))
        }

        fn ctx(&mut self) -> (&mut Interaction, InteractionContext<'_>) {
            (
                &mut self.machine,
                InteractionContext {
                    store: &mut self.store,
                    viewport: &mut self.viewport,
                    config: &self.config,
                },
            )
        }

        fn move_to(&mut self, p: Point) -> Effects {
            let (m, mut ctx) = self.ctx();
            m.pointer_move(&mut ctx, p, p)
        }

        fn release(&mut self, p: Point, modifiers: Modifiers) -> (Outcome, Effects) {
            let (m, mut ctx) = self.ctx();
            m.pointer_up(&mut ctx, p, p, modifiers)
        }
    }

    #[test]
    fn begin_requests_capture_and_release_frees_it() {
        let mut f = Fixture::new();
        let effects = f.machine.begin_marquee(Point::new(1.0, 1.0)).unwrap();
        assert_eq!(effects.as_slice(), &[Effect::CapturePointer, Effect::Redraw]);
        let (_, effects) = f.release(Point::new(2.0, 2.0), Modifiers::SHIFT);
        assert!(effects.contains(&Effect::ReleasePointer));
        assert_eq!(f.machine.mode(), Mode::None);
    }

    #[test]
    fn second_gesture_is_busy() {
        let mut f = Fixture::new();
        f.machine.begin_marquee(Point::ZERO).unwrap();
        let err = f
            .machine
            .begin_pan(&f.viewport, Point::ZERO)
            .unwrap_err();
        assert_eq!(
            err,
            InteractionError::Busy {
                active: Mode::Marquee,
                requested: Mode::Panning
            }
        );
        assert_eq!(f.machine.mode(), Mode::Marquee);
    }

    #[test]
    fn drag_commits_one_pre_gesture_snapshot() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        let depth = f.store.history().past_len();
        let before = f.store.diagram().clone();

        f.machine
            .begin_drag(&f.store, a, Point::new(120.0, 120.0))
            .unwrap();
        for step in 1..=5 {
            f.move_to(Point::new(120.0 + 40.0 * step as f64, 120.0));
        }
        let (outcome, _) = f.release(Point::new(320.0, 140.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Moved);
        assert_eq!(
            f.store.diagram().node(a).unwrap().position,
            Position::new(300.0, 120.0)
        );
        assert_eq!(f.store.history().past_len(), depth + 1);
        assert!(f.store.undo());
        assert_eq!(f.store.diagram(), &before);
    }

    #[test]
    fn drag_positions_clamp_at_zero() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 10.0, 10.0);
        f.machine.begin_drag(&f.store, a, Point::new(20.0, 20.0)).unwrap();
        f.move_to(Point::new(-100.0, 15.0));
        assert_eq!(
            f.store.diagram().node(a).unwrap().position,
            Position::new(0.0, 5.0)
        );
    }

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        let b = f.node(NodeType::Process, 400.0, 100.0);
        f.store.selection.select_node(b);
        let depth = f.store.history().past_len();

        f.machine.begin_drag(&f.store, a, Point::new(120.0, 120.0)).unwrap();
        let (outcome, _) = f.release(Point::new(120.0, 120.0), Modifiers::SHIFT);
        assert_eq!(outcome, Outcome::Clicked(a));
        assert_eq!(f.store.selection.nodes, vec![b, a], "shift toggles in");
        assert_eq!(f.store.history().past_len(), depth, "no history");
    }

    #[test]
    fn selected_group_moves_together() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 0.0, 0.0);
        let b = f.node(NodeType::Process, 0.0, 500.0);
        let c = f.node(NodeType::Process, 600.0, 600.0);
        f.store.selection.select_node(a);
        f.store.selection.toggle_node(b);

        f.machine.begin_drag(&f.store, b, Point::new(10.0, 510.0)).unwrap();
        f.release(Point::new(60.0, 530.0), Modifiers::NONE);
        let d = f.store.diagram();
        assert_eq!(d.node(a).unwrap().position, Position::new(50.0, 20.0));
        assert_eq!(d.node(b).unwrap().position, Position::new(50.0, 520.0));
        assert_eq!(d.node(c).unwrap().position, Position::new(600.0, 600.0));
    }

    #[test]
    fn resize_respects_minimum_and_keeps_position() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        f.machine
            .begin_resize(&f.store, a, Point::new(250.0, 160.0))
            .unwrap();
        let (outcome, _) = f.release(Point::new(50.0, 300.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Resized(true));
        let n = f.store.diagram().node(a).unwrap();
        assert_eq!(n.size, Some(Size::new(80.0, 200.0)));
        assert_eq!(n.position, Position::new(100.0, 100.0));

        assert!(f.store.undo());
        assert_eq!(f.store.diagram().node(a).unwrap().size, None);
    }

    #[test]
    fn resize_without_movement_records_nothing() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Decision, 0.0, 0.0);
        let depth = f.store.history().past_len();
        f.machine.begin_resize(&f.store, a, Point::new(120.0, 120.0)).unwrap();
        let (outcome, _) = f.release(Point::new(120.0, 120.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Resized(false));
        assert_eq!(f.store.history().past_len(), depth);
    }

    #[test]
    fn connect_onto_other_node_adds_edge() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        let b = f.node(NodeType::Process, 100.0, 300.0);
        f.machine.begin_connect(&f.store, a, Point::new(175.0, 162.0)).unwrap();
        f.move_to(Point::new(170.0, 320.0));
        let overlay = f.machine.overlay(f.store.diagram());
        assert_eq!(overlay.connect_target, Some(b));
        assert_eq!(
            overlay.rubber_band,
            Some(Line::new((175.0, 160.0), (170.0, 320.0)))
        );

        let (outcome, _) = f.release(Point::new(170.0, 320.0), Modifiers::NONE);
        let Outcome::Connected(Some(e)) = outcome else {
            panic!("expected an edge, got {outcome:?}");
        };
        let edge = f.store.diagram().edge(e).unwrap();
        assert_eq!((edge.from, edge.to), (a, b));
    }

    #[test]
    fn connect_onto_source_or_background_is_noop() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        f.machine.begin_connect(&f.store, a, Point::new(175.0, 162.0)).unwrap();
        let (outcome, _) = f.release(Point::new(150.0, 120.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Connected(None));
        f.machine.begin_connect(&f.store, a, Point::new(175.0, 162.0)).unwrap();
        let (outcome, _) = f.release(Point::new(700.0, 700.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Connected(None));
        assert!(f.store.diagram().edges.is_empty());
    }

    #[test]
    fn reconnect_moves_target_end() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        let b = f.node(NodeType::Process, 100.0, 300.0);
        let c = f.node(NodeType::Process, 400.0, 300.0);
        let e = f.store.connect_nodes(a, b).unwrap();
        f.machine
            .begin_reconnect(&f.store, e, EdgeEnd::To, Point::new(175.0, 300.0))
            .unwrap();
        let (outcome, _) = f.release(Point::new(450.0, 320.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Reconnected(true));
        assert_eq!(f.store.diagram().edge(e).unwrap().to, c);
    }

    #[test]
    fn pan_below_threshold_is_background_click() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 0.0, 0.0);
        f.store.selection.select_node(a);
        f.machine.begin_pan(&f.viewport, Point::new(500.0, 500.0)).unwrap();
        // Threshold is per axis, so a diagonal jitter stays a click.
        assert!(f.move_to(Point::new(504.0, 504.0)).is_empty());
        let (outcome, _) = f.release(Point::new(504.0, 504.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::BackgroundClick);
        assert!(f.store.selection.is_empty());
    }

    #[test]
    fn marquee_unions_into_node_selection() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 0.0, 0.0);
        let b = f.node(NodeType::Process, 300.0, 0.0);
        let c = f.node(NodeType::Process, 600.0, 0.0);
        let e = f.store.connect_nodes(a, b).unwrap();
        f.store.selection.select_edge(e);
        f.store.selection.toggle_node(c);

        f.machine.begin_marquee(Point::new(-10.0, -10.0)).unwrap();
        f.move_to(Point::new(320.0, 20.0));
        assert!(f.machine.overlay(f.store.diagram()).marquee.is_some());
        let (outcome, _) = f.release(Point::new(320.0, 20.0), Modifiers::SHIFT);
        assert_eq!(outcome, Outcome::Marquee(2));
        assert_eq!(f.store.selection.nodes, vec![c, a, b]);
        assert_eq!(f.store.selection.edges, vec![e], "edges untouched");
    }

    #[test]
    fn click_near_alignment_line_does_not_snap() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 103.0, 100.0);
        f.node(NodeType::Process, 100.0, 400.0);
        let depth = f.store.history().past_len();

        f.machine.begin_drag(&f.store, a, Point::new(120.0, 120.0)).unwrap();
        let (outcome, _) = f.release(Point::new(120.0, 120.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Clicked(a));
        assert_eq!(
            f.store.diagram().node(a).unwrap().position,
            Position::new(103.0, 100.0)
        );
        assert_eq!(f.store.history().past_len(), depth);
        assert_eq!(f.store.selection.nodes, vec![a]);

        // Out and back before release is still a click.
        f.machine.begin_drag(&f.store, a, Point::new(120.0, 120.0)).unwrap();
        f.move_to(Point::new(300.0, 300.0));
        let (outcome, _) = f.release(Point::new(120.0, 120.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Clicked(a));
        assert_eq!(
            f.store.diagram().node(a).unwrap().position,
            Position::new(103.0, 100.0)
        );
        assert!(f.machine.guides().is_empty());
    }

    #[test]
    fn dragging_unselected_node_selects_it() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 0.0, 0.0);
        let b = f.node(NodeType::Process, 400.0, 400.0);
        f.store.selection.select_node(b);

        f.machine.begin_drag(&f.store, a, Point::new(10.0, 10.0)).unwrap();
        let (outcome, _) = f.release(Point::new(60.0, 40.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Moved);
        assert_eq!(f.store.selection.nodes, vec![a]);
        assert_eq!(
            f.store.diagram().node(b).unwrap().position,
            Position::new(400.0, 400.0)
        );
    }

    #[test]
    fn resize_press_keeps_undersized_explicit_size() {
        let mut f = Fixture::new();
        let id = NodeId::intern("rs_small");
        let mut node = Node::new(id, NodeType::Process, "small", Position::new(100.0, 100.0));
        node.size = Some(Size::new(50.0, 30.0));
        let mut d = Diagram::new();
        d.insert_node(node);
        f.store.load(d);
        let depth = f.store.history().past_len();

        f.machine.begin_resize(&f.store, id, Point::new(148.0, 128.0)).unwrap();
        let (outcome, _) = f.release(Point::new(148.0, 128.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Resized(false));
        assert_eq!(
            f.store.diagram().node(id).unwrap().size,
            Some(Size::new(50.0, 30.0))
        );
        assert_eq!(f.store.history().past_len(), depth);
    }

    #[test]
    fn pan_past_threshold_scrolls_by_inverse_delta() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 1500.0, 1200.0);
        f.store.selection.select_node(a);
        f.viewport.set_zoom(2.0, &f.config);
        f.viewport.update_content(f.store.diagram(), &f.config);
        f.viewport.scroll_to(Vec2::new(100.0, 100.0));

        f.machine.begin_pan(&f.viewport, Point::new(500.0, 500.0)).unwrap();
        assert!(f.move_to(Point::new(504.0, 496.0)).is_empty());
        assert_eq!(f.viewport.scroll(), Vec2::new(100.0, 100.0));

        f.move_to(Point::new(460.0, 470.0));
        assert_eq!(f.viewport.scroll(), Vec2::new(120.0, 115.0));
        let (outcome, _) = f.release(Point::new(460.0, 470.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Panned);
        assert_eq!(f.store.selection.nodes, vec![a]);
    }

    #[test]
    fn reconnect_onto_self_loop_or_existing_pair_is_rejected() {
        let mut f = Fixture::new();
        let a = f.node(NodeType::Process, 100.0, 100.0);
        let b = f.node(NodeType::Process, 100.0, 300.0);
        let c = f.node(NodeType::Process, 400.0, 300.0);
        let e = f.store.connect_nodes(a, b).unwrap();
        f.store.connect_nodes(a, c).unwrap();
        let depth = f.store.history().past_len();

        // To-end dropped on the source: self-loop.
        f.machine
            .begin_reconnect(&f.store, e, EdgeEnd::To, Point::new(175.0, 300.0))
            .unwrap();
        let (outcome, _) = f.release(Point::new(150.0, 120.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Reconnected(false));

        // To-end dropped on `c`: a -> c already exists.
        f.machine
            .begin_reconnect(&f.store, e, EdgeEnd::To, Point::new(175.0, 300.0))
            .unwrap();
        let (outcome, _) = f.release(Point::new(450.0, 320.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Reconnected(false));

        // From-end dropped on the target: self-loop.
        f.machine
            .begin_reconnect(&f.store, e, EdgeEnd::From, Point::new(175.0, 160.0))
            .unwrap();
        let (outcome, _) = f.release(Point::new(150.0, 320.0), Modifiers::NONE);
        assert_eq!(outcome, Outcome::Reconnected(false));

        let edge = f.store.diagram().edge(e).unwrap();
        assert_eq!((edge.from, edge.to), (a, b));
        assert_eq!(f.store.history().past_len(), depth);
    }
}
