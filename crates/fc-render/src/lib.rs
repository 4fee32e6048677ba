pub mod export;
pub mod hit;
pub mod route;
pub mod view;

pub use export::{ExportError, ExportFormat, Exporter, export_view};
pub use hit::{Hit, hit_test, hit_test_rect, node_at};
pub use route::{EdgeRoute, route_edge};
pub use view::{Overlay, RenderView};
