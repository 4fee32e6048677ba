pub mod exchange;
pub mod extract;
pub mod geometry;
pub mod id;
pub mod lint;
pub mod model;
pub mod snap;

pub use exchange::{ExchangeError, parse_diagram, sanitize_reply};
pub use extract::{ExtractError, extract_json};
pub use geometry::{bounds, dimensions, to_canvas_coords};
pub use id::{EdgeId, NodeId};
pub use lint::{LintDiagnostic, LintSeverity, lint_diagram};
pub use model::*;
pub use snap::{Guide, SNAP_THRESHOLD, SnapResult, compute_snap};

// Re-export kurbo so downstream crates share one geometry vocabulary.
pub use kurbo;
