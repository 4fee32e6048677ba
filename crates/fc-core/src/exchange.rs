//! Diagram exchange format: `{ "nodes": Node[], "edges": Edge[] }`.
//!
//! Two validation passes read untrusted JSON into a [`Diagram`]:
//!
//! - [`parse_diagram`] is strict and used for file loads. Any malformed
//!   entry rejects the whole payload so the live diagram stays untouched.
//! - [`sanitize_reply`] is lenient and used for assistant replies. Entries
//!   missing a required field are dropped, malformed optional fields are
//!   ignored, and missing edge ids are generated. Only a wrong top-level
//!   shape is an error.
//!
//! Both check every field by hand instead of deserializing straight into
//! the model, so the error says which entry was wrong and why.

use crate::id::NodeId;
use crate::model::{ArrowType, Diagram, Edge, Node, NodeType, Position, Size};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Why an external diagram payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("diagram must be a JSON object")]
    NotAnObject,

    #[error("`{0}` must be an array")]
    NotAnArray(&'static str),

    #[error("node #{index}: {reason}")]
    InvalidNode { index: usize, reason: String },

    #[error("edge #{index}: {reason}")]
    InvalidEdge { index: usize, reason: String },

    #[error("duplicate id `{0}`")]
    DuplicateId(String),

    #[error("`suggestions` must be an array")]
    MissingSuggestions,
}

// ─── Field access ────────────────────────────────────────────────────────

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn finite(v: &Value) -> Option<f64> {
    v.as_f64().filter(|n| n.is_finite())
}

fn position_field(obj: &Map<String, Value>) -> Option<Position> {
    let p = obj.get("position")?.as_object()?;
    Some(Position::new(finite(p.get("x")?)?, finite(p.get("y")?)?))
}

/// `Ok(None)` when absent, `Err` when present but malformed.
fn size_field(obj: &Map<String, Value>) -> Result<Option<Size>, &'static str> {
    let Some(raw) = obj.get("size").filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let s = raw.as_object().ok_or("`size` must be an object")?;
    let width = s.get("width").and_then(finite);
    let height = s.get("height").and_then(finite);
    match (width, height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok(Some(Size::new(w, h))),
        _ => Err("`size` needs positive numeric width and height"),
    }
}

fn arrays(value: &Value) -> Result<(&Vec<Value>, &Vec<Value>), ExchangeError> {
    let obj = value.as_object().ok_or(ExchangeError::NotAnObject)?;
    let nodes = obj
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or(ExchangeError::NotAnArray("nodes"))?;
    let edges = obj
        .get("edges")
        .and_then(Value::as_array)
        .ok_or(ExchangeError::NotAnArray("edges"))?;
    Ok((nodes, edges))
}

/// Validate one node entry. In lenient mode a malformed optional field is
/// ignored instead of failing the entry.
fn read_node(value: &Value, lenient: bool) -> Result<Node, String> {
    let obj = value.as_object().ok_or("not an object")?;
    let id = str_field(obj, "id").ok_or("missing string `id`")?;
    let text = str_field(obj, "text").ok_or("missing string `text`")?;
    let type_name = str_field(obj, "type").ok_or("missing string `type`")?;
    let kind = NodeType::from_str_opt(type_name)
        .ok_or_else(|| format!("unknown node type `{type_name}`"))?;
    let position = position_field(obj).ok_or("`position` needs numeric x and y")?;

    let mut node = Node::new(NodeId::intern(id), kind, text, position);
    node.size = match size_field(obj) {
        Ok(size) => size,
        Err(_) if lenient => None,
        Err(reason) => return Err(reason.into()),
    };
    node.color = match obj.get("color") {
        None | Some(Value::Null) => None,
        Some(Value::String(c)) if c.is_empty() => None,
        Some(Value::String(c)) => Some(c.clone()),
        Some(_) if lenient => None,
        Some(_) => return Err("`color` must be a string".into()),
    };
    Ok(node)
}

/// Validate one edge entry; `id` is `None` when absent.
fn read_edge(value: &Value, lenient: bool) -> Result<(Option<NodeId>, Edge), String> {
    let obj = value.as_object().ok_or("not an object")?;
    let from = str_field(obj, "from").ok_or("missing string `from`")?;
    let to = str_field(obj, "to").ok_or("missing string `to`")?;
    let id = match obj.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if !s.is_empty() => Some(NodeId::intern(s)),
        Some(_) if lenient => None,
        Some(_) => return Err("`id` must be a non-empty string".into()),
    };
    let label = match obj.get("label") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) if lenient => None,
        Some(_) => return Err("`label` must be a string".into()),
    };
    let arrow_type = match obj.get("arrowType") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match ArrowType::from_str_opt(s) {
            Some(arrow) => Some(arrow),
            None if lenient => None,
            None => return Err(format!("unknown arrowType `{s}`")),
        },
        Some(_) if lenient => None,
        Some(_) => return Err("`arrowType` must be a string".into()),
    };

    let placeholder = id.unwrap_or_else(|| NodeId::intern(""));
    let mut edge = Edge::new(placeholder, NodeId::intern(from), NodeId::intern(to));
    edge.label = label;
    edge.arrow_type = arrow_type;
    Ok((id, edge))
}

// ─── Strict (file load) ──────────────────────────────────────────────────

/// Parse and validate a diagram file.
pub fn parse_diagram(json: &str) -> Result<Diagram, ExchangeError> {
    let value: Value = serde_json::from_str(json)?;
    diagram_from_value(&value)
}

/// Strictly validate an already-parsed payload.
pub fn diagram_from_value(value: &Value) -> Result<Diagram, ExchangeError> {
    let (raw_nodes, raw_edges) = arrays(value)?;
    let mut diagram = Diagram::new();
    let mut ids = HashSet::new();

    for (index, raw) in raw_nodes.iter().enumerate() {
        let node = read_node(raw, false)
            .map_err(|reason| ExchangeError::InvalidNode { index, reason })?;
        if !ids.insert(node.id) {
            return Err(ExchangeError::DuplicateId(node.id.to_string()));
        }
        diagram.nodes.push(node);
    }

    let mut generated = Vec::new();
    for (index, raw) in raw_edges.iter().enumerate() {
        let invalid = |reason: String| ExchangeError::InvalidEdge { index, reason };
        let (id, edge) = read_edge(raw, false).map_err(invalid)?;
        if edge.from == edge.to {
            return Err(invalid(format!("self-loop on `{}`", edge.from)));
        }
        for end in [edge.from, edge.to] {
            if !diagram.contains_node(end) {
                return Err(invalid(format!("unknown node `{end}`")));
            }
        }
        if diagram.has_pair(edge.from, edge.to, None) {
            return Err(invalid(format!(
                "duplicate connection `{}` -> `{}`",
                edge.from, edge.to
            )));
        }
        match id {
            Some(id) if !ids.insert(id) => {
                return Err(ExchangeError::DuplicateId(id.to_string()));
            }
            Some(_) => {}
            None => generated.push(diagram.edges.len()),
        }
        diagram.edges.push(edge);
    }

    // Ids are drawn after every explicit id is known, so they cannot clash.
    for i in generated {
        diagram.edges[i].id = diagram.fresh_edge_id();
    }

    log::debug!(
        "loaded diagram: {} nodes, {} edges",
        diagram.nodes.len(),
        diagram.edges.len()
    );
    Ok(diagram)
}

/// Serialize for saving.
pub fn to_json(diagram: &Diagram) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string_pretty(diagram)?)
}

// ─── Lenient (assistant replies) ─────────────────────────────────────────

/// Validate an assistant reply, dropping entries that fail their checks.
pub fn sanitize_reply(value: &Value) -> Result<Diagram, ExchangeError> {
    let (raw_nodes, raw_edges) = arrays(value)?;
    let mut diagram = Diagram::new();

    for (index, raw) in raw_nodes.iter().enumerate() {
        match read_node(raw, true) {
            Ok(node) => {
                if !diagram.insert_node(node) {
                    log::warn!("reply node #{index}: duplicate id dropped");
                }
            }
            Err(reason) => log::warn!("reply node #{index} dropped: {reason}"),
        }
    }

    let mut pending = Vec::new();
    for (index, raw) in raw_edges.iter().enumerate() {
        match read_edge(raw, true) {
            Ok((id, edge)) if diagram.can_connect(edge.from, edge.to) => {
                pending.push((id, edge.clone()));
                // Reserve the pair so later duplicates are dropped.
                diagram.edges.push(edge);
            }
            Ok(_) => log::warn!("reply edge #{index} dropped: invalid endpoints"),
            Err(reason) => log::warn!("reply edge #{index} dropped: {reason}"),
        }
    }

    diagram.edges.clear();
    let mut seen = HashSet::new();
    for (id, mut edge) in pending {
        edge.id = match id {
            Some(id) if !diagram.contains_node(id) && seen.insert(id) => id,
            _ => diagram.fresh_edge_id(),
        };
        seen.insert(edge.id);
        diagram.edges.push(edge);
    }
    Ok(diagram)
}

/// Read `{ "suggestions": [...] }`, keeping only string entries.
pub fn parse_suggestions(value: &Value) -> Result<Vec<String>, ExchangeError> {
    let list = value
        .get("suggestions")
        .and_then(Value::as_array)
        .ok_or(ExchangeError::MissingSuggestions)?;
    Ok(list
        .iter()
        .filter_map(|s| s.as_str().map(str::to_owned))
        .collect())
}
