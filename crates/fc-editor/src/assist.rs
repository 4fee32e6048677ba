//! AI assistant seam.
//!
//! The assistant itself (model, transport, prompts) lives outside the core
//! behind [`DiagramAssistant`]. The drivers here check preconditions, call
//! it with a snapshot of the diagram, and turn the raw reply into a
//! validated result. Applying that result is a separate, synchronous store
//! operation, so nothing holds the store across an await point. The last
//! completion to be applied wins.

use crate::store::DiagramStore;
use fc_core::exchange::parse_suggestions;
use fc_core::{
    Diagram, ExchangeError, ExtractError, NodeId, Position, extract_json, sanitize_reply,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("auto-layout needs at least two nodes")]
    TooFewNodes,

    #[error("nothing to analyze: the diagram is empty")]
    EmptyDiagram,

    #[error("assistant returned no result")]
    NoResult,

    #[error("assistant reply has no JSON object: {0}")]
    Extract(#[from] ExtractError),

    #[error("assistant reply is not a usable diagram: {0}")]
    Invalid(#[from] ExchangeError),

    #[error("layout reply changed the set of nodes")]
    LayoutMismatch,

    #[error("assistant request failed: {0}")]
    Service(String),
}

/// An external assistant. Every method returns the raw reply text, or
/// `None` when the service produced nothing usable.
#[async_trait::async_trait]
pub trait DiagramAssistant: Send + Sync {
    /// Build a new diagram from a description.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AssistError>;

    /// Apply an instruction to an existing diagram.
    async fn edit(&self, prompt: &str, diagram: &Diagram) -> Result<Option<String>, AssistError>;

    /// Reposition nodes; ids, text, and edges must come back unchanged.
    async fn layout(&self, diagram: &Diagram) -> Result<Option<String>, AssistError>;

    /// Review the diagram; the reply holds `{"suggestions": [...]}`.
    async fn analyze(&self, diagram: &Diagram) -> Result<Option<String>, AssistError>;
}

fn read_reply(reply: Option<String>) -> Result<serde_json::Value, AssistError> {
    let text = reply.ok_or(AssistError::NoResult)?;
    extract_json(&text).map_err(|e| {
        log::warn!("assist: {e}");
        AssistError::from(e)
    })
}

/// Turn generate/edit/layout reply text into a leniently validated diagram.
/// Also used by hosts that make the request themselves.
pub fn diagram_from_reply(reply: Option<String>) -> Result<Diagram, AssistError> {
    let value = read_reply(reply)?;
    sanitize_reply(&value).map_err(|e| {
        log::warn!("assist: rejected diagram reply: {e}");
        AssistError::from(e)
    })
}

/// Turn analysis reply text into suggestions.
pub fn suggestions_from_reply(reply: Option<String>) -> Result<Vec<String>, AssistError> {
    let value = read_reply(reply)?;
    Ok(parse_suggestions(&value)?)
}

/// A layout must hold exactly the nodes of `current`. Returns `current`
/// with the layout's positions; nothing else is read from the reply.
pub fn check_layout(current: &Diagram, layout: &Diagram) -> Result<Diagram, AssistError> {
    let expected: HashSet<_> = current.nodes.iter().map(|n| n.id).collect();
    let got: HashSet<_> = layout.nodes.iter().map(|n| n.id).collect();
    if layout.nodes.len() != current.nodes.len() || expected != got {
        log::warn!(
            "assist: layout returned {} nodes for {}",
            layout.nodes.len(),
            current.nodes.len()
        );
        return Err(AssistError::LayoutMismatch);
    }
    let positions: HashMap<NodeId, Position> =
        layout.nodes.iter().map(|n| (n.id, n.position)).collect();
    let mut laid_out = current.clone();
    for n in &mut laid_out.nodes {
        if let Some(p) = positions.get(&n.id) {
            n.position = p.clamped();
        }
    }
    Ok(laid_out)
}

/// Generate when `current` is empty, edit otherwise.
pub async fn generate_or_edit(
    assistant: &dyn DiagramAssistant,
    current: &Diagram,
    prompt: &str,
) -> Result<Diagram, AssistError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AssistError::EmptyPrompt);
    }
    let reply = if current.nodes.is_empty() {
        log::debug!("assist: generate");
        assistant.generate(prompt).await
    } else {
        log::debug!("assist: edit ({} nodes)", current.nodes.len());
        assistant.edit(prompt, current).await
    }
    .inspect_err(|e| log::warn!("assist: {e}"))?;
    diagram_from_reply(reply)
}

/// Ask for new positions. The reply must hold exactly the nodes of
/// `current`; the result is `current` repositioned.
pub async fn auto_layout(
    assistant: &dyn DiagramAssistant,
    current: &Diagram,
) -> Result<Diagram, AssistError> {
    if current.nodes.len() < 2 {
        return Err(AssistError::TooFewNodes);
    }
    log::debug!("assist: layout ({} nodes)", current.nodes.len());
    let reply = assistant
        .layout(current)
        .await
        .inspect_err(|e| log::warn!("assist: {e}"))?;
    let layout = diagram_from_reply(reply)?;
    check_layout(current, &layout)
}

/// Ask for review suggestions. Non-string entries are dropped.
pub async fn analyze(
    assistant: &dyn DiagramAssistant,
    current: &Diagram,
) -> Result<Vec<String>, AssistError> {
    if current.nodes.is_empty() {
        return Err(AssistError::EmptyDiagram);
    }
    let reply = assistant
        .analyze(current)
        .await
        .inspect_err(|e| log::warn!("assist: {e}"))?;
    suggestions_from_reply(reply)
}

// ─── Applying results ────────────────────────────────────────────────────

/// Replace the diagram with a generated or edited one (one undo step).
pub fn apply_diagram(store: &mut DiagramStore, diagram: Diagram) {
    store.load(diagram);
}

/// Install a result of [`auto_layout`]. Edits made while the request was in
/// flight are overwritten.
pub fn apply_layout(store: &mut DiagramStore, layout: Diagram) {
    store.replace_positions(layout);
}

pub fn apply_suggestions(store: &mut DiagramStore, suggestions: Vec<String>) {
    store.set_suggestions(suggestions);
}
