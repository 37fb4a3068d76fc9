#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod render;
pub mod sanitize;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ExportConfig, load_config};
pub use dispatch::{OutputFormat, render_to_bytes, resolve_output, write_output};
pub use error::{RenderError, Result};
pub use export::{ExportFormat, GraphExportConfig, GraphExportResult, export_graph};
pub use filter::{FilterOptions, filter_graph};
pub use layout::{LayoutOptions, LayoutPreset, LayoutResult, compute_layout};
pub use metrics::{GraphMetrics, MetricsProvider};
pub use model::{Edge, EdgeKind, IssueGraph, IssueRecord, Node, Status};
pub use render::{Canvas, SnapshotFormat, draw_snapshot, render_snapshot};
