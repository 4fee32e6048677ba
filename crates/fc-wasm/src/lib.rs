//! WASM bridge for FC: exposes the flowchart editor to a browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host forwards DOM
//! events, paints the render view it reads back as JSON, and performs the
//! assistant requests itself, handing the raw reply text to the
//! `apply_*_reply` methods.

mod svg;

pub use svg::SvgExporter;

use fc_core::{ArrowType, NodeId, NodeType};
use fc_editor::assist::{self, AssistError};
use fc_editor::{Editor, EditorConfig, Effects, InputEvent, Modifiers, ShortcutMap};
use fc_render::ExportFormat;
use kurbo::{Point, Size, Vec2};
use wasm_bindgen::prelude::*;

fn effects_json(effects: &Effects) -> String {
    serde_json::to_string(effects).unwrap_or_else(|_| "[]".to_string())
}

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn ok_json() -> String {
    r#"{"ok":true}"#.to_string()
}

/// The main WASM-facing canvas controller.
///
/// All interaction from the page goes through this struct. Pointer
/// handlers return a JSON array of effects (`"capturePointer"`,
/// `"releasePointer"`, `"redraw"`, `"focusTextEditor"`).
#[wasm_bindgen]
pub struct FlowCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl FlowCanvas {
    /// Create a controller for a canvas element of the given client size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        let mut editor = Editor::new(EditorConfig::default());
        editor.set_client_rect(Point::ZERO, Size::new(width, height));
        Self { editor }
    }

    /// The canvas element moved or resized (`getBoundingClientRect`).
    pub fn set_client_rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.editor
            .set_client_rect(Point::new(left, top), Size::new(width, height));
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        effects_json(&self.editor.handle_event(&InputEvent::from_pointer_down(x, y, mods)))
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        effects_json(&self.editor.handle_event(&InputEvent::from_pointer_move(x, y, mods)))
    }

    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        effects_json(&self.editor.handle_event(&InputEvent::from_pointer_up(x, y, mods)))
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> String {
        effects_json(&self.editor.handle_event(&InputEvent::DoubleClick { x, y }))
    }

    /// Returns `true` if the zoom changed; the host then calls
    /// `preventDefault` on the wheel event.
    pub fn handle_wheel(&mut self, delta_y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        !self
            .editor
            .handle_event(&InputEvent::Wheel { delta_y, modifiers })
            .is_empty()
    }

    /// Handle a keyboard shortcut. Returns JSON:
    /// `{"changed":bool,"action":"<name>"}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let action = match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(a) => a.name(),
            None => return r#"{"changed":false,"action":"none"}"#.to_string(),
        };
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let effects = self.editor.handle_event(&InputEvent::key(key, modifiers));
        let changed = if effects.is_empty() { "false" } else { "true" };
        format!(r#"{{"changed":{changed},"action":"{action}"}}"#)
    }

    // ─── Text editing ────────────────────────────────────────────────────

    /// Mirror the in-place input's value.
    pub fn set_edit_text(&mut self, text: &str) {
        self.editor.set_edit_text(text);
    }

    /// Input lost focus: commit.
    pub fn commit_text_edit(&mut self) -> bool {
        self.editor.commit_text_edit()
    }

    /// JSON `{"kind":"node"|"edge","id":"..","text":".."}` or `null`.
    pub fn text_edit_json(&self) -> String {
        let Some(edit) = self.editor.text_editor().current() else {
            return "null".to_string();
        };
        let (kind, id) = match edit.target {
            fc_editor::EditTarget::Node(id) => ("node", id),
            fc_editor::EditTarget::EdgeLabel(id) => ("edge", id),
        };
        serde_json::json!({ "kind": kind, "id": id.as_str(), "text": edit.draft }).to_string()
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Palette drop. Returns the new node id, or `""` for an unknown type.
    pub fn drop_node(&mut self, kind: &str, x: f64, y: f64) -> String {
        match NodeType::from_str_opt(kind) {
            Some(kind) => self.editor.drop_node(kind, Point::new(x, y)).as_str().to_string(),
            None => {
                log::warn!("unknown node type `{kind}`");
                String::new()
            }
        }
    }

    pub fn update_node_color(&mut self, node_id: &str, color: &str) -> bool {
        self.editor
            .store_mut()
            .update_node_color(NodeId::intern(node_id), color)
    }

    pub fn update_edge_label(&mut self, edge_id: &str, label: &str) -> bool {
        self.editor
            .store_mut()
            .update_edge_label(NodeId::intern(edge_id), label)
    }

    pub fn update_edge_arrow_type(&mut self, edge_id: &str, arrow: &str) -> bool {
        let Some(arrow) = ArrowType::from_str_opt(arrow) else {
            return false;
        };
        self.editor
            .store_mut()
            .update_edge_arrow_type(NodeId::intern(edge_id), arrow)
    }

    pub fn flip_edge_direction(&mut self, edge_id: &str) -> bool {
        self.editor
            .store_mut()
            .flip_edge_direction(NodeId::intern(edge_id))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected()
    }

    pub fn clear(&mut self) -> bool {
        self.editor.clear()
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.store().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.store().can_redo()
    }

    /// Selected ids as JSON `{"nodes":[..],"edges":[..]}`.
    pub fn selection_json(&self) -> String {
        serde_json::to_string(&self.editor.store().selection)
            .unwrap_or_else(|_| r#"{"nodes":[],"edges":[]}"#.to_string())
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        self.editor.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.editor.zoom_out()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.editor.set_zoom(zoom)
    }

    pub fn reset_view(&mut self) {
        self.editor.reset_view();
    }

    /// `{"zoom","scrollX","scrollY","contentWidth","contentHeight"}`;
    /// scroll is in canvas units.
    pub fn viewport_json(&self) -> String {
        let vp = self.editor.viewport();
        serde_json::json!({
            "zoom": vp.zoom(),
            "scrollX": vp.scroll().x,
            "scrollY": vp.scroll().y,
            "contentWidth": vp.content().width,
            "contentHeight": vp.content().height,
        })
        .to_string()
    }

    pub fn minimap_json(&self) -> String {
        serde_json::to_string(&self.editor.minimap()).unwrap_or_else(|_| "null".to_string())
    }

    pub fn minimap_click(&mut self, x: f64, y: f64) {
        self.editor.minimap_click(Point::new(x, y));
    }

    pub fn minimap_drag(&mut self, dx: f64, dy: f64) {
        self.editor.minimap_drag(Vec2::new(dx, dy));
    }

    // ─── Rendering, files & export ───────────────────────────────────────

    /// The frame to paint, overlay included.
    pub fn render_view_json(&self) -> String {
        serde_json::to_string(&self.editor.render_view()).unwrap_or_else(|_| "null".to_string())
    }

    /// Load a saved diagram. Returns `{"ok":true}` or `{"ok":false,"error":".."}`;
    /// on error the diagram is untouched.
    pub fn load_json(&mut self, json: &str) -> String {
        match self.editor.load_json(json) {
            Ok(()) => ok_json(),
            Err(e) => error_json(e),
        }
    }

    pub fn save_json(&self) -> String {
        self.editor.save_json().unwrap_or_else(|e| {
            log::warn!("save failed: {e}");
            String::new()
        })
    }

    /// SVG document of the diagram, or `""` when there is nothing to export.
    pub fn export_svg(&self) -> String {
        match self.editor.export(&SvgExporter, ExportFormat::Svg) {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_default(),
            Err(e) => {
                log::warn!("export failed: {e}");
                String::new()
            }
        }
    }

    /// Structural lint diagnostics as JSON.
    pub fn lint_json(&self) -> String {
        serde_json::to_string(&self.editor.lint()).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Assistant replies ───────────────────────────────────────────────

    /// `true` when the host should call `generate` (empty diagram) rather
    /// than `edit`.
    pub fn wants_generate(&self) -> bool {
        self.editor.diagram().nodes.is_empty()
    }

    /// Snapshot to send with an edit, layout, or analysis request.
    pub fn snapshot_json(&self) -> String {
        self.save_json()
    }

    /// Apply a generate/edit reply.
    pub fn apply_diagram_reply(&mut self, reply: &str) -> String {
        match assist::diagram_from_reply(Some(reply.to_string())) {
            Ok(diagram) => {
                self.editor.apply_assist_diagram(diagram);
                ok_json()
            }
            Err(e) => error_json(e),
        }
    }

    /// Apply a layout reply; only node positions are taken.
    pub fn apply_layout_reply(&mut self, reply: &str) -> String {
        let result = assist::diagram_from_reply(Some(reply.to_string()))
            .and_then(|layout| assist::check_layout(self.editor.diagram(), &layout));
        match result {
            Ok(laid_out) => {
                self.editor.apply_assist_layout(laid_out);
                ok_json()
            }
            Err(e) => error_json(e),
        }
    }

    /// Store suggestions from an analysis reply.
    pub fn apply_analysis_reply(&mut self, reply: &str) -> String {
        if self.editor.diagram().nodes.is_empty() {
            return error_json(AssistError::EmptyDiagram);
        }
        match assist::suggestions_from_reply(Some(reply.to_string())) {
            Ok(list) => {
                self.editor.apply_assist_suggestions(list);
                ok_json()
            }
            Err(e) => error_json(e),
        }
    }

    pub fn suggestions_json(&self) -> String {
        serde_json::to_string(&self.editor.store().suggestions()).unwrap_or_else(|_| "null".to_string())
    }
}

/// Set up a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FC WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Strictly validate a saved diagram. Returns JSON: `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    match fc_core::parse_diagram(json) {
        Ok(_) => ok_json(),
        Err(e) => error_json(e),
    }
}

/// `flowchart-<date>.<ext>` for a download link.
#[wasm_bindgen]
pub fn export_file_name(date: &str, extension: &str) -> String {
    match ExportFormat::from_extension(extension) {
        Some(format) => fc_render::export::export_file_name(date, format),
        None => String::new(),
    }
}

/// [`export_file_name`] stamped with today's date (browser clock, UTC).
#[wasm_bindgen]
pub fn export_file_name_today(extension: &str) -> String {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    export_file_name(iso.get(..10).unwrap_or_default(), extension)
}
