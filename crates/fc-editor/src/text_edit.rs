//! In-place text editing of node text and edge labels.
//!
//! At most one editor is open. The host mirrors keystrokes into the draft;
//! Enter (without shift) or blur commits, Escape reverts.

use fc_core::{Diagram, EdgeId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Node(NodeId),
    EdgeLabel(EdgeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub target: EditTarget,
    /// Value when editing began; Escape restores it.
    pub original: String,
    pub draft: String,
}

#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    active: Option<TextEdit>,
}

impl TextEditor {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&TextEdit> {
        self.active.as_ref()
    }

    pub fn target(&self) -> Option<EditTarget> {
        self.active.as_ref().map(|e| e.target)
    }

    /// Open an editor on `target` seeded from `diagram`. Returns `false`
    /// if the target does not exist or another editor is still open; the
    /// caller commits that one through [`TextEditor::finish`] first.
    pub fn begin(&mut self, target: EditTarget, diagram: &Diagram) -> bool {
        if self.active.is_some() {
            return false;
        }
        let text = match target {
            EditTarget::Node(id) => diagram.node(id).map(|n| n.text.clone()),
            EditTarget::EdgeLabel(id) => diagram
                .edge(id)
                .map(|e| e.label.clone().unwrap_or_default()),
        };
        let Some(text) = text else {
            return false;
        };
        self.active = Some(TextEdit {
            target,
            original: text.clone(),
            draft: text,
        });
        true
    }

    /// Mirror the host input's value. Ignored with no editor open.
    pub fn set_draft(&mut self, text: &str) {
        if let Some(edit) = &mut self.active {
            edit.draft = text.to_string();
        }
    }

    /// Close the editor, handing back the edit to commit.
    pub fn finish(&mut self) -> Option<TextEdit> {
        self.active.take()
    }

    /// Close the editor and discard the draft.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Drop the editor if its target disappeared (undo, delete, load).
    pub fn retain_existing(&mut self, diagram: &Diagram) {
        let gone = match self.target() {
            Some(EditTarget::Node(id)) => !diagram.contains_node(id),
            Some(EditTarget::EdgeLabel(id)) => diagram.edge(id).is_none(),
            None => false,
        };
        if gone {
            self.active = None;
        }
    }
}
