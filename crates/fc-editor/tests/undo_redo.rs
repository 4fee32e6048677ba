//! Integration tests: linear undo/redo history (fc-editor).
//!
//! Drives `DiagramStore` the way the editor does and checks that every
//! committing operation can be undone and redone across crate boundaries.

use fc_core::model::*;
use fc_core::NodeId;
use fc_editor::DiagramStore;
use pretty_assertions::assert_eq;

fn store() -> DiagramStore {
    DiagramStore::new(None)
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn add_add_connect_then_undo_and_redo_three_times() {
    let mut s = store();
    let n1 = s.add_node(NodeType::Process, Position::new(100.0, 100.0));
    let n2 = s.add_node(NodeType::Process, Position::new(100.0, 100.0));
    let edge = s.connect_nodes(n1, n2).expect("edge created");
    assert_eq!(s.diagram().edge(edge).unwrap().arrow(), ArrowType::default());
    let full = s.diagram().clone();

    for _ in 0..3 {
        assert!(s.undo());
    }
    assert!(s.diagram().nodes.is_empty());
    assert!(s.diagram().edges.is_empty());
    assert!(!s.undo());

    for _ in 0..3 {
        assert!(s.redo());
    }
    assert_eq!(s.diagram(), &full);
    assert!(!s.redo());
}

#[test]
fn n_commits_then_n_undos_restores_original() {
    let mut s = store();
    let original = s.diagram().clone();
    let n = 5;
    for i in 0..n {
        s.add_node(NodeType::Decision, Position::new(i as f64 * 200.0, 0.0));
    }
    for _ in 0..n {
        assert!(s.undo());
    }
    assert_eq!(s.diagram(), &original);
    assert_eq!(s.history().future_len(), n);
    assert_eq!(s.history().past_len(), 0);
}

#[test]
fn commit_after_undo_discards_redo() {
    let mut s = store();
    s.add_node(NodeType::Process, Position::new(0.0, 0.0));
    s.add_node(NodeType::Process, Position::new(0.0, 200.0));
    s.undo();
    assert!(s.can_redo());
    s.add_node(NodeType::Io, Position::new(300.0, 0.0));
    assert!(!s.can_redo());
}

#[test]
fn undo_clears_selection() {
    let mut s = store();
    let a = s.add_node(NodeType::Process, Position::new(0.0, 0.0));
    let b = s.add_node(NodeType::Process, Position::new(0.0, 200.0));
    s.selection.select_node(a);
    s.selection.toggle_node(b);
    s.undo();
    assert!(s.selection.is_empty());
}

// ─── Deletion ───────────────────────────────────────────────────────────

#[test]
fn delete_cascades_and_undoes_in_one_step() {
    let mut s = store();
    let a = s.add_node(NodeType::StartEnd, Position::new(0.0, 0.0));
    let b = s.add_node(NodeType::Process, Position::new(0.0, 200.0));
    let c = s.add_node(NodeType::StartEnd, Position::new(0.0, 400.0));
    s.connect_nodes(a, b);
    s.connect_nodes(b, c);
    let before = s.diagram().clone();
    let past = s.history().past_len();

    s.selection.select_node(b);
    assert!(s.delete_selected());
    assert_eq!(s.diagram().nodes.len(), 2);
    assert!(s.diagram().edges.is_empty());
    assert_eq!(s.history().past_len(), past + 1);

    s.undo();
    assert_eq!(s.diagram(), &before);
}

#[test]
fn empty_selection_delete_leaves_no_history() {
    let mut s = store();
    s.add_node(NodeType::Process, Position::new(0.0, 0.0));
    let past = s.history().past_len();
    assert!(!s.delete_selected());
    assert_eq!(s.history().past_len(), past);
}

// ─── Edges ──────────────────────────────────────────────────────────────

#[test]
fn self_loop_and_duplicate_are_no_ops_but_reverse_coexists() {
    let mut s = store();
    let a = s.add_node(NodeType::Process, Position::new(0.0, 0.0));
    let b = s.add_node(NodeType::Process, Position::new(0.0, 200.0));
    let past = s.history().past_len();

    assert_eq!(s.connect_nodes(a, a), None);
    assert!(s.connect_nodes(a, b).is_some());
    assert_eq!(s.connect_nodes(a, b), None);
    assert_eq!(s.history().past_len(), past + 1);
    assert!(s.connect_nodes(b, a).is_some());
    assert_eq!(s.diagram().edges.len(), 2);
}

#[test]
fn edge_edits_round_trip_through_history() {
    let mut s = store();
    let a = s.add_node(NodeType::Process, Position::new(0.0, 0.0));
    let b = s.add_node(NodeType::Process, Position::new(0.0, 200.0));
    let e = s.connect_nodes(a, b).unwrap();

    assert!(s.update_edge_label(e, "yes"));
    assert!(s.update_edge_arrow_type(e, ArrowType::Bidirectional));
    assert!(s.flip_edge_direction(e));
    let edge = s.diagram().edge(e).unwrap();
    assert_eq!((edge.from, edge.to), (b, a));

    s.undo();
    s.undo();
    s.undo();
    let edge = s.diagram().edge(e).unwrap();
    assert_eq!((edge.from, edge.to), (a, b));
    assert_eq!(edge.label, None);
    assert_eq!(edge.arrow(), ArrowType::default());
}

// ─── Loading ────────────────────────────────────────────────────────────

#[test]
fn rejected_load_keeps_diagram_history_and_selection() {
    let mut s = store();
    let a = s.add_node(NodeType::Process, Position::new(10.0, 10.0));
    s.selection.select_node(a);
    let before = s.diagram().clone();
    let past = s.history().past_len();

    let err = s.load_json(r#"{"nodes": {"id": "x"}, "edges": []}"#);
    assert!(err.is_err());
    assert_eq!(s.diagram(), &before);
    assert_eq!(s.history().past_len(), past);
    assert!(s.selection.contains_node(a));

    assert!(s.undo());
    assert!(s.diagram().nodes.is_empty());
}

#[test]
fn load_is_one_undo_step() {
    let mut s = store();
    s.add_node(NodeType::Process, Position::new(0.0, 0.0));
    let before = s.diagram().clone();
    s.load_json(
        r#"{"nodes":[{"id":"n1","type":"process","text":"Load","position":{"x":5,"y":5}}],"edges":[]}"#,
    )
    .unwrap();
    assert!(s.diagram().contains_node(NodeId::intern("n1")));
    s.undo();
    assert_eq!(s.diagram(), &before);
}
