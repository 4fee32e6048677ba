//! Export collaborator seam.
//!
//! Encoding a view into PNG, SVG, or PDF bytes belongs to the host (a
//! browser canvas, a native rasterizer). The core hands an [`Exporter`] a
//! decoration-free [`RenderView`] and names the output file.

use crate::view::RenderView;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0} export is not supported by this exporter")]
    Unsupported(ExportFormat),

    #[error("nothing to export: the diagram is empty")]
    Empty,

    #[error("encoding failed: {0}")]
    Encode(String),
}

/// Turns a captured view into file bytes.
pub trait Exporter {
    fn export(&self, view: &RenderView, format: ExportFormat) -> Result<Vec<u8>, ExportError>;
}

/// Strip decorations from a copy of `view` and hand it to `exporter`.
/// The live view is left as it was.
pub fn export_view(
    exporter: &dyn Exporter,
    view: &RenderView,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    if view.nodes.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut capture = view.clone();
    capture.prepare_for_capture();
    log::debug!(
        "exporting {} nodes, {} edges as {format}",
        capture.nodes.len(),
        capture.edges.len()
    );
    exporter.export(&capture, format)
}

/// `flowchart-<date>.<ext>`, with `date` as `YYYY-MM-DD`.
pub fn export_file_name(date: &str, format: ExportFormat) -> String {
    format!("flowchart-{date}.{}", format.extension())
}
