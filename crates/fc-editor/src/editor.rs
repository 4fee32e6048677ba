//! Editor facade: one owner for the store, viewport, gesture machine, and
//! text editor.
//!
//! Hosts feed [`InputEvent`]s to [`Editor::handle_event`] and act on the
//! returned [`Effects`]. Everything else (palette drops, file load/save,
//! export, assistant results) goes through the methods below.

use crate::assist;
use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use crate::interaction::{Effect, Effects, Interaction, InteractionContext, InteractionError};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::DiagramStore;
use crate::text_edit::{EditTarget, TextEditor};
use crate::viewport::{Minimap, Viewport};
use fc_core::exchange::to_json;
use fc_core::{
    Diagram, ExchangeError, LintDiagnostic, NodeId, NodeType, Position, lint_diagram,
};
use fc_render::{ExportError, ExportFormat, Exporter, Hit, RenderView, export_view, hit_test};
use kurbo::{Point, Size};
use smallvec::smallvec;

#[derive(Debug, Clone, Default)]
pub struct Editor {
    store: DiagramStore,
    viewport: Viewport,
    interaction: Interaction,
    text: TextEditor,
    config: EditorConfig,
}

fn redraw() -> Effects {
    smallvec![Effect::Redraw]
}

fn redraw_if(changed: bool) -> Effects {
    if changed { redraw() } else { Effects::new() }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let mut editor = Self {
            store: DiagramStore::new(config.history_depth),
            config,
            ..Self::default()
        };
        editor.refresh_content();
        editor
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    /// Direct store access for operations without an input binding
    /// (color, arrow type, flip). Call [`Editor::refresh_content`] after
    /// structural changes.
    pub fn store_mut(&mut self) -> &mut DiagramStore {
        &mut self.store
    }

    pub fn diagram(&self) -> &Diagram {
        self.store.diagram()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn text_editor(&self) -> &TextEditor {
        &self.text
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Host layout changed: canvas origin and size in client pixels.
    pub fn set_client_rect(&mut self, origin: Point, size: Size) {
        self.viewport.set_client_rect(origin, size);
        self.refresh_content();
    }

    pub fn refresh_content(&mut self) {
        self.viewport.update_content(self.store.diagram(), &self.config);
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) -> Effects {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y, modifiers } => {
                self.pointer_up(Point::new(*x, *y), *modifiers)
            }
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y)),
            InputEvent::Wheel { delta_y, modifiers } => self.wheel(*delta_y, *modifiers),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        }
    }

    fn pointer_down(&mut self, client: Point, modifiers: Modifiers) -> Effects {
        // Pressing the canvas blurs the text input.
        let mut effects = redraw_if(self.commit_text_edit());
        let at = self.viewport.to_canvas(client);
        let hit = hit_test(self.store.diagram(), &self.store.selection, at);
        log::trace!("pointer down at ({:.0}, {:.0}): {hit:?}", at.x, at.y);

        let begun: Result<Effects, InteractionError> = match hit {
            Hit::EdgeEndpoint(edge, end) => {
                self.interaction
                    .begin_reconnect(&self.store, edge, end, at)
            }
            Hit::ResizeHandle(node) => self.interaction.begin_resize(&self.store, node, at),
            Hit::ConnectHandle(node) => self.interaction.begin_connect(&self.store, node, at),
            Hit::Node(node) => self.interaction.begin_drag(&self.store, node, at),
            Hit::Edge(edge) => {
                if modifiers.shift {
                    self.store.selection.toggle_edge(edge);
                } else {
                    self.store.selection.select_edge(edge);
                }
                Ok(redraw())
            }
            Hit::Background if modifiers.shift => self.interaction.begin_marquee(at),
            Hit::Background => self.interaction.begin_pan(&self.viewport, client),
        };
        match begun {
            Ok(more) => effects.extend(more),
            Err(e) => log::debug!("pointer down ignored: {e}"),
        }
        effects
    }

    fn pointer_move(&mut self, client: Point) -> Effects {
        let canvas = self.viewport.to_canvas(client);
        let mut ctx = InteractionContext {
            store: &mut self.store,
            viewport: &mut self.viewport,
            config: &self.config,
        };
        self.interaction.pointer_move(&mut ctx, canvas, client)
    }

    fn pointer_up(&mut self, client: Point, modifiers: Modifiers) -> Effects {
        let canvas = self.viewport.to_canvas(client);
        let mut ctx = InteractionContext {
            store: &mut self.store,
            viewport: &mut self.viewport,
            config: &self.config,
        };
        let (outcome, effects) = self
            .interaction
            .pointer_up(&mut ctx, canvas, client, modifiers);
        log::debug!("pointer up: {outcome:?}");
        self.refresh_content();
        effects
    }

    /// Open the text editor on the node or edge under the pointer.
    fn double_click(&mut self, client: Point) -> Effects {
        if self.interaction.is_busy() {
            return Effects::new();
        }
        let at = self.viewport.to_canvas(client);
        let target = match hit_test(self.store.diagram(), &self.store.selection, at) {
            Hit::Node(id) | Hit::ResizeHandle(id) | Hit::ConnectHandle(id) => EditTarget::Node(id),
            Hit::Edge(id) | Hit::EdgeEndpoint(id, _) => EditTarget::EdgeLabel(id),
            Hit::Background => return Effects::new(),
        };
        self.begin_text_edit(target)
    }

    fn wheel(&mut self, delta_y: f64, modifiers: Modifiers) -> Effects {
        if !modifiers.command() {
            return Effects::new();
        }
        let changed = self.viewport.wheel_zoom(delta_y, &self.config);
        if changed {
            self.refresh_content();
        }
        redraw_if(changed)
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) -> Effects {
        let Some(action) =
            ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta)
        else {
            return Effects::new();
        };
        if self.text.is_active() && !action.applies_to_text_editor() {
            return Effects::new();
        }
        if self.interaction.is_busy() {
            log::trace!("key {} suppressed during {}", action.name(), self.interaction.mode());
            return Effects::new();
        }
        self.apply_shortcut(action)
    }

    pub fn apply_shortcut(&mut self, action: ShortcutAction) -> Effects {
        let changed = match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ResetView => {
                self.viewport.reset_view(self.store.diagram(), &self.config);
                true
            }
            ShortcutAction::Confirm => self.commit_text_edit(),
            ShortcutAction::Cancel => {
                if self.text.is_active() {
                    self.cancel_text_edit()
                } else if self.store.selection.is_empty() {
                    false
                } else {
                    self.store.selection.clear();
                    true
                }
            }
        };
        redraw_if(changed)
    }

    // ─── Text editing ────────────────────────────────────────────────────

    pub fn begin_text_edit(&mut self, target: EditTarget) -> Effects {
        self.commit_text_edit();
        if !self.text.begin(target, self.store.diagram()) {
            return Effects::new();
        }
        smallvec![Effect::FocusTextEditor, Effect::Redraw]
    }

    /// Mirror the host text input.
    pub fn set_edit_text(&mut self, text: &str) {
        self.text.set_draft(text);
    }

    /// Close the text editor and write its draft. `true` if the diagram
    /// changed.
    pub fn commit_text_edit(&mut self) -> bool {
        let Some(edit) = self.text.finish() else {
            return false;
        };
        match edit.target {
            EditTarget::Node(id) => self.store.update_node_text(id, &edit.draft),
            EditTarget::EdgeLabel(id) => self.store.update_edge_label(id, &edit.draft),
        }
    }

    pub fn cancel_text_edit(&mut self) -> bool {
        self.text.cancel()
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Palette drop of `kind` at a client position.
    pub fn drop_node(&mut self, kind: NodeType, client: Point) -> NodeId {
        let at = self.viewport.to_canvas(client);
        let id = self.store.add_node(kind, Position::new(at.x, at.y));
        self.refresh_content();
        id
    }

    pub fn delete_selected(&mut self) -> bool {
        let changed = self.store.delete_selected();
        if changed {
            self.text.retain_existing(self.store.diagram());
            self.refresh_content();
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        if self.interaction.is_busy() {
            return false;
        }
        let changed = self.store.undo();
        if changed {
            self.text.retain_existing(self.store.diagram());
            self.refresh_content();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        if self.interaction.is_busy() {
            return false;
        }
        let changed = self.store.redo();
        if changed {
            self.text.retain_existing(self.store.diagram());
            self.refresh_content();
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.store.clear();
        if changed {
            self.text.cancel();
            self.refresh_content();
        }
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_in(&self.config);
        self.refresh_content();
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_out(&self.config);
        self.refresh_content();
        changed
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let changed = self.viewport.set_zoom(zoom, &self.config);
        self.refresh_content();
        changed
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_view(self.store.diagram(), &self.config);
    }

    pub fn minimap(&self) -> Minimap {
        self.viewport.minimap(&self.config)
    }

    pub fn minimap_click(&mut self, p: Point) {
        self.viewport.minimap_click(p, &self.config);
    }

    pub fn minimap_drag(&mut self, delta: kurbo::Vec2) {
        self.viewport.minimap_drag(delta, &self.config);
    }

    // ─── Files & export ──────────────────────────────────────────────────

    /// Strictly validate and load a saved diagram. On error nothing changes.
    pub fn load_json(&mut self, json: &str) -> Result<(), ExchangeError> {
        self.store.load_json(json)?;
        self.text.cancel();
        self.refresh_content();
        Ok(())
    }

    pub fn save_json(&self) -> Result<String, ExchangeError> {
        to_json(self.store.diagram())
    }

    /// Current drawing state, overlay included.
    pub fn render_view(&self) -> RenderView {
        let diagram = self.store.diagram();
        let mut overlay = self.interaction.overlay(diagram);
        match self.text.target() {
            Some(EditTarget::Node(id)) => overlay.editing_node = Some(id),
            Some(EditTarget::EdgeLabel(id)) => overlay.editing_edge = Some(id),
            None => {}
        }
        RenderView::build(
            diagram,
            &self.store.selection,
            &overlay,
            self.viewport.content_rect(),
        )
    }

    pub fn export(
        &self,
        exporter: &dyn Exporter,
        format: ExportFormat,
    ) -> Result<Vec<u8>, ExportError> {
        export_view(exporter, &self.render_view(), format)
    }

    pub fn lint(&self) -> Vec<LintDiagnostic> {
        lint_diagram(self.store.diagram())
    }

    // ─── Assistant results ───────────────────────────────────────────────

    /// Apply a generated or edited diagram from [`assist::generate_or_edit`].
    pub fn apply_assist_diagram(&mut self, diagram: Diagram) {
        assist::apply_diagram(&mut self.store, diagram);
        self.text.cancel();
        self.refresh_content();
    }

    /// Apply a result of [`assist::auto_layout`].
    pub fn apply_assist_layout(&mut self, layout: Diagram) {
        assist::apply_layout(&mut self.store, layout);
        self.text.retain_existing(self.store.diagram());
        self.refresh_content();
    }

    pub fn apply_assist_suggestions(&mut self, suggestions: Vec<String>) {
        assist::apply_suggestions(&mut self.store, suggestions);
    }
}
