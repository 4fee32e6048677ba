//! Integration tests: assistant drivers against a scripted mock.
//!
//! The mock replays canned reply text and records which request was made,
//! so each test checks routing, reply cleanup, and what reaches the store.

use fc_core::{Diagram, Node, NodeId, NodeType, Position};
use fc_editor::assist::{self, AssistError, DiagramAssistant};
use fc_editor::{Editor, EditorConfig};
use kurbo::Point;
use pretty_assertions::assert_eq;
use std::sync::Mutex;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
struct ScriptedAssistant {
    reply: Option<String>,
    fail: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedAssistant {
    fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Self::default()
        }
    }

    fn answer(&self, call: &'static str) -> Result<Option<String>, AssistError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(AssistError::Service("503 from upstream".into()));
        }
        Ok(self.reply.clone())
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DiagramAssistant for ScriptedAssistant {
    async fn generate(&self, _prompt: &str) -> Result<Option<String>, AssistError> {
        self.answer("generate")
    }

    async fn edit(&self, _prompt: &str, _diagram: &Diagram) -> Result<Option<String>, AssistError> {
        self.answer("edit")
    }

    async fn layout(&self, _diagram: &Diagram) -> Result<Option<String>, AssistError> {
        self.answer("layout")
    }

    async fn analyze(&self, _diagram: &Diagram) -> Result<Option<String>, AssistError> {
        self.answer("analyze")
    }
}

const LOGIN_FLOW: &str = r#"Sure! Here is the flowchart:
```json
{
  "nodes": [
    {"id": "as_start", "type": "start-end", "text": "Start", "position": {"x": 100, "y": 50}},
    {"id": "as_check", "type": "decision", "text": "Logged in?", "position": {"x": 100, "y": 180}},
  ],
  "edges": [
    {"from": "as_start", "to": "as_check"},
    {"from": "as_check", "to": "as_check"},
    {"from": "as_start", "to": "as_missing"}
  ]
}
```
Let me know if you want changes."#;

fn two_nodes() -> Editor {
    let mut ed = Editor::new(EditorConfig::default());
    ed.drop_node(NodeType::Process, Point::new(0.0, 0.0));
    ed.drop_node(NodeType::Process, Point::new(0.0, 200.0));
    ed
}

// ─── Generate / edit ────────────────────────────────────────────────────

#[tokio::test]
async fn empty_diagram_generates_and_cleans_reply() {
    init_logger();
    let mock = ScriptedAssistant::replying(LOGIN_FLOW);
    let mut ed = Editor::new(EditorConfig::default());

    let diagram = assist::generate_or_edit(&mock, ed.diagram(), "login flow")
        .await
        .unwrap();
    assert_eq!(mock.calls(), vec!["generate"]);
    assert_eq!(diagram.nodes.len(), 2);
    // Self-loop and dangling edge are dropped; the survivor gets an id.
    assert_eq!(diagram.edges.len(), 1);

    ed.apply_assist_diagram(diagram);
    assert_eq!(ed.diagram().nodes.len(), 2);
    assert!(ed.undo());
    assert!(ed.diagram().nodes.is_empty());
}

#[tokio::test]
async fn non_empty_diagram_edits() {
    init_logger();
    let mock = ScriptedAssistant::replying(LOGIN_FLOW);
    let ed = two_nodes();
    assist::generate_or_edit(&mock, ed.diagram(), "add a login check")
        .await
        .unwrap();
    assert_eq!(mock.calls(), vec!["edit"]);
}

#[tokio::test]
async fn blank_prompt_is_rejected_without_a_call() {
    let mock = ScriptedAssistant::replying(LOGIN_FLOW);
    let err = assist::generate_or_edit(&mock, &Diagram::new(), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::EmptyPrompt));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn missing_result_and_service_failure_leave_diagram_alone() {
    init_logger();
    let ed = two_nodes();
    let before = ed.diagram().clone();

    let empty = ScriptedAssistant::default();
    let err = assist::generate_or_edit(&empty, ed.diagram(), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::NoResult));

    let failing = ScriptedAssistant {
        fail: true,
        ..ScriptedAssistant::default()
    };
    let err = assist::generate_or_edit(&failing, ed.diagram(), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::Service(_)));
    assert_eq!(ed.diagram(), &before);
}

#[tokio::test]
async fn reply_without_arrays_is_invalid() {
    init_logger();
    let mock = ScriptedAssistant::replying(r#"{"nodes": {"a": 1}, "edges": []}"#);
    let err = assist::generate_or_edit(&mock, &Diagram::new(), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::Invalid(_)));

    let prose = ScriptedAssistant::replying("I could not draw that, sorry.");
    let err = assist::generate_or_edit(&prose, &Diagram::new(), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::Extract(_)));
}

// ─── Layout ─────────────────────────────────────────────────────────────

fn layout_reply(ed: &Editor, y: f64) -> String {
    let mut moved = ed.diagram().clone();
    for (i, n) in moved.nodes.iter_mut().enumerate() {
        n.position = Position::new(300.0 * i as f64, y);
        n.text = "renamed by the model".into();
    }
    fc_core::exchange::to_json(&moved).unwrap()
}

#[tokio::test]
async fn layout_takes_positions_only() {
    init_logger();
    let mut ed = two_nodes();
    let mock = ScriptedAssistant::replying(&layout_reply(&ed, 40.0));

    let layout = assist::auto_layout(&mock, ed.diagram()).await.unwrap();
    ed.apply_assist_layout(layout);

    let positions: Vec<_> = ed.diagram().nodes.iter().map(|n| n.position).collect();
    assert_eq!(
        positions,
        vec![Position::new(0.0, 40.0), Position::new(300.0, 40.0)]
    );
    assert!(ed.diagram().nodes.iter().all(|n| n.text != "renamed by the model"));
    assert!(ed.undo());
    assert_eq!(ed.diagram().nodes[1].position, Position::new(0.0, 200.0));
}

#[tokio::test]
async fn layout_needs_two_nodes() {
    let mut ed = Editor::new(EditorConfig::default());
    ed.drop_node(NodeType::Process, Point::new(0.0, 0.0));
    let mock = ScriptedAssistant::replying("{}");
    let err = assist::auto_layout(&mock, ed.diagram()).await.unwrap_err();
    assert!(matches!(err, AssistError::TooFewNodes));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn layout_with_different_nodes_is_rejected() {
    init_logger();
    let ed = two_nodes();
    let mut other = ed.diagram().clone();
    other.nodes.pop();
    other.insert_node(Node::new(
        NodeId::intern("as_intruder"),
        NodeType::Process,
        "?",
        Position::default(),
    ));
    let mock = ScriptedAssistant::replying(&fc_core::exchange::to_json(&other).unwrap());
    let err = assist::auto_layout(&mock, ed.diagram()).await.unwrap_err();
    assert!(matches!(err, AssistError::LayoutMismatch));
}

#[tokio::test]
async fn layout_completion_overwrites_concurrent_delete() {
    init_logger();
    let mut ed = two_nodes();
    let mock = ScriptedAssistant::replying(&layout_reply(&ed, 10.0));
    let snapshot = ed.diagram().clone();
    let layout = assist::auto_layout(&mock, &snapshot).await.unwrap();

    let first = ed.diagram().nodes[0].id;
    ed.store_mut().selection.select_node(first);
    ed.delete_selected();
    assert_eq!(ed.diagram().nodes.len(), 1);

    // Last writer wins: the layout was built from the snapshot.
    ed.apply_assist_layout(layout);
    assert_eq!(ed.diagram().nodes.len(), 2);
    assert_eq!(ed.diagram().nodes[0].id, first);
    assert_eq!(ed.diagram().nodes[0].position, Position::new(0.0, 10.0));
    assert!(ed.undo());
    assert_eq!(ed.diagram().nodes.len(), 1);
}

// ─── Analyze ────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_stores_suggestions_until_next_structural_change() {
    init_logger();
    let mut ed = two_nodes();
    let mock = ScriptedAssistant::replying(
        r#"```json
{"suggestions": ["Add an end node", 42, "Label the decision branches",]}
```"#,
    );
    let suggestions = assist::analyze(&mock, ed.diagram()).await.unwrap();
    assert_eq!(
        suggestions,
        vec!["Add an end node".to_string(), "Label the decision branches".to_string()]
    );
    ed.apply_assist_suggestions(suggestions);
    assert_eq!(ed.store().suggestions().map(<[String]>::len), Some(2));

    ed.drop_node(NodeType::StartEnd, Point::new(400.0, 0.0));
    assert_eq!(ed.store().suggestions(), None);
}

#[tokio::test]
async fn analyze_rejects_empty_diagram() {
    let mock = ScriptedAssistant::replying(r#"{"suggestions": []}"#);
    let err = assist::analyze(&mock, &Diagram::new()).await.unwrap_err();
    assert!(matches!(err, AssistError::EmptyDiagram));
}
