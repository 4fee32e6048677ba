use fc_core::NodeType;
use fc_render::view::{EdgeView, NodeView};
use fc_render::{ExportError, ExportFormat, Exporter, RenderView};
use kurbo::Rect;

const NODE_FILL: &str = "#ffffff";
const NODE_STROKE: &str = "#374151";
const EDGE_STROKE: &str = "#6b7280";
/// Horizontal slant of the I/O parallelogram.
const IO_SKEW: f64 = 15.0;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Writes a view as a standalone SVG document. Raster and PDF encoding
/// stay with the browser host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgExporter;

impl Exporter for SvgExporter {
    fn export(&self, view: &RenderView, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Svg => Ok(render_svg(view).into_bytes()),
            other => Err(ExportError::Unsupported(other)),
        }
    }
}

pub fn render_svg(view: &RenderView) -> String {
    let area = view.content;
    let (width, height) = (area.width(), area.height());

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    ));
    svg.push_str("<style>\n");
    svg.push_str("  text { font-family: Inter, system-ui, sans-serif; font-size: 14px; }\n");
    svg.push_str("</style>\n");
    svg.push_str(&format!(
        "<rect width=\"{width}\" height=\"{height}\" fill=\"{NODE_FILL}\" />\n"
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({}, {})\">\n",
        -area.x0, -area.y0
    ));

    // Edges first so node shapes cover the segment ends.
    for edge in &view.edges {
        render_edge_svg(&mut svg, edge);
    }
    for node in &view.nodes {
        render_node_svg(&mut svg, node);
    }

    svg.push_str("</g>\n</svg>");
    svg
}

fn render_edge_svg(out: &mut String, edge: &EdgeView) {
    let (a, b) = (edge.route.start, edge.route.end);
    out.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{EDGE_STROKE}\" stroke-width=\"2\" />\n",
        a.x, a.y, b.x, b.y
    ));
    for head in &edge.arrowheads {
        out.push_str(&format!(
            "  <polygon points=\"{},{} {},{} {},{}\" fill=\"{EDGE_STROKE}\" />\n",
            head.tip.x, head.tip.y, head.left.x, head.left.y, head.right.x, head.right.y
        ));
    }
    if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
        let mid = edge.route.midpoint();
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"#111827\" stroke=\"#ffffff\" stroke-width=\"3\" paint-order=\"stroke\">{}</text>\n",
            mid.x,
            mid.y,
            escape(label)
        ));
    }
}

fn render_node_svg(out: &mut String, node: &NodeView) {
    let r: Rect = node.rect;
    let fill = node.color.as_deref().map(escape).unwrap_or_else(|| NODE_FILL.to_string());
    let paint = format!("fill=\"{fill}\" stroke=\"{NODE_STROKE}\" stroke-width=\"2\"");

    match node.kind {
        NodeType::StartEnd | NodeType::Process => {
            let radius = if node.kind == NodeType::StartEnd {
                r.height() / 2.0
            } else {
                4.0
            };
            out.push_str(&format!(
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" ry=\"{radius}\" {paint} />\n",
                r.x0,
                r.y0,
                r.width(),
                r.height()
            ));
        }
        NodeType::Decision => {
            let c = r.center();
            out.push_str(&format!(
                "  <polygon points=\"{},{} {},{} {},{} {},{}\" {paint} />\n",
                c.x, r.y0, r.x1, c.y, c.x, r.y1, r.x0, c.y
            ));
        }
        NodeType::Io => {
            out.push_str(&format!(
                "  <polygon points=\"{},{} {},{} {},{} {},{}\" {paint} />\n",
                r.x0 + IO_SKEW,
                r.y0,
                r.x1,
                r.y0,
                r.x1 - IO_SKEW,
                r.y1,
                r.x0,
                r.y1
            ));
        }
    }

    let c = r.center();
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"#111827\">{}</text>\n",
        c.x,
        c.y,
        escape(&node.text)
    ));
}
