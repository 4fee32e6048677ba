//! Lint diagnostics for flowcharts.
//!
//! Reports structural issues without modifying the diagram. This is the
//! offline counterpart of assistant analysis: cheap, deterministic, and
//! available without a network round trip.

use crate::id::NodeId;
use crate::model::{Diagram, NodeType};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use std::collections::HashMap;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Likely a mistake in the flow.
    Warning,
    /// Style suggestion.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintDiagnostic {
    /// The node this refers to; `None` for diagram-wide findings.
    pub node_id: Option<NodeId>,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "isolated-node").
    pub rule: &'static str,
}

// ─── Graph view ──────────────────────────────────────────────────────────

struct FlowGraph<'a> {
    diagram: &'a Diagram,
    graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl<'a> FlowGraph<'a> {
    fn build(diagram: &'a Diagram) -> Self {
        let mut graph = DiGraph::with_capacity(diagram.nodes.len(), diagram.edges.len());
        let mut index = HashMap::with_capacity(diagram.nodes.len());
        for node in &diagram.nodes {
            index.insert(node.id, graph.add_node(node.id));
        }
        for edge in &diagram.edges {
            if let (Some(&a), Some(&b)) = (index.get(&edge.from), index.get(&edge.to)) {
                graph.add_edge(a, b, ());
            }
        }
        Self {
            diagram,
            graph,
            index,
        }
    }

    fn degree(&self, id: NodeId, dir: Direction) -> usize {
        self.index
            .get(&id)
            .map_or(0, |&ix| self.graph.neighbors_directed(ix, dir).count())
    }
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules and return diagnostics in rule order.
#[must_use]
pub fn lint_diagram(diagram: &Diagram) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    if diagram.nodes.is_empty() {
        return diags;
    }
    let flow = FlowGraph::build(diagram);
    lint_missing_terminal(&flow, &mut diags);
    lint_isolated(&flow, &mut diags);
    lint_decision_branches(&flow, &mut diags);
    lint_dead_ends(&flow, &mut diags);
    lint_unreachable(&flow, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_missing_terminal(flow: &FlowGraph<'_>, diags: &mut Vec<LintDiagnostic>) {
    if !flow.diagram.nodes.iter().any(|n| n.kind == NodeType::StartEnd) {
        diags.push(LintDiagnostic {
            node_id: None,
            message: "Flowchart has no start/end node.".into(),
            severity: LintSeverity::Warning,
            rule: "missing-terminal",
        });
    }
}

fn is_isolated(flow: &FlowGraph<'_>, id: NodeId) -> bool {
    flow.degree(id, Direction::Incoming) == 0 && flow.degree(id, Direction::Outgoing) == 0
}

fn lint_isolated(flow: &FlowGraph<'_>, diags: &mut Vec<LintDiagnostic>) {
    if flow.diagram.nodes.len() < 2 {
        return;
    }
    for node in &flow.diagram.nodes {
        if is_isolated(flow, node.id) {
            diags.push(LintDiagnostic {
                node_id: Some(node.id),
                message: format!("`{}` is not connected to anything.", node.text),
                severity: LintSeverity::Warning,
                rule: "isolated-node",
            });
        }
    }
}

fn lint_decision_branches(flow: &FlowGraph<'_>, diags: &mut Vec<LintDiagnostic>) {
    for node in flow.diagram.nodes.iter().filter(|n| n.kind == NodeType::Decision) {
        let out = flow.degree(node.id, Direction::Outgoing);
        if out < 2 {
            diags.push(LintDiagnostic {
                node_id: Some(node.id),
                message: format!(
                    "Decision `{}` has {out} outgoing branch(es); expected 2.",
                    node.text
                ),
                severity: LintSeverity::Warning,
                rule: "decision-branches",
            });
        }
    }
}

fn lint_dead_ends(flow: &FlowGraph<'_>, diags: &mut Vec<LintDiagnostic>) {
    for node in &flow.diagram.nodes {
        if node.kind == NodeType::StartEnd || is_isolated(flow, node.id) {
            continue;
        }
        if flow.degree(node.id, Direction::Outgoing) == 0 {
            diags.push(LintDiagnostic {
                node_id: Some(node.id),
                message: format!("`{}` leads nowhere; connect it to an end node.", node.text),
                severity: LintSeverity::Info,
                rule: "dead-end",
            });
        }
    }
}

/// Nodes no path from any entry reaches. Entries are start/end nodes
/// without incoming edges; with no entry the rule stays silent.
fn lint_unreachable(flow: &FlowGraph<'_>, diags: &mut Vec<LintDiagnostic>) {
    let entries: Vec<NodeIndex> = flow
        .diagram
        .nodes
        .iter()
        .filter(|n| n.kind == NodeType::StartEnd && flow.degree(n.id, Direction::Incoming) == 0)
        .filter_map(|n| flow.index.get(&n.id).copied())
        .collect();
    let Some(&first) = entries.first() else {
        return;
    };

    let mut seen = vec![false; flow.graph.node_count()];
    let mut dfs = Dfs::new(&flow.graph, first);
    for &entry in &entries {
        dfs.move_to(entry);
        while let Some(ix) = dfs.next(&flow.graph) {
            seen[ix.index()] = true;
        }
    }

    for node in &flow.diagram.nodes {
        let Some(&ix) = flow.index.get(&node.id) else {
            continue;
        };
        if !seen[ix.index()] && !is_isolated(flow, node.id) {
            diags.push(LintDiagnostic {
                node_id: Some(node.id),
                message: format!("`{}` cannot be reached from the start.", node.text),
                severity: LintSeverity::Info,
                rule: "unreachable",
            });
        }
    }
}
