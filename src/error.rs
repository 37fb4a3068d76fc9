//! Error types for graph export and snapshot rendering.

use std::io;
use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An explicit format was requested that no serializer or backend handles.
    #[error("unsupported format {0:?} (want json, dot, mermaid, svg or png)")]
    UnsupportedFormat(String),

    /// A file-producing operation was called without a destination.
    #[error("output path is required")]
    MissingOutputPath,

    /// Snapshot rendering needs metrics for leveling and the summary block.
    #[error("graph metrics are required for snapshot export")]
    MissingMetrics,

    /// Nothing left to draw after filtering.
    #[error("no issues to render")]
    EmptyGraph,

    /// The raster backend failed to allocate or encode its image.
    #[error("encode error: {0}")]
    Encode(String),

    /// IO error while writing the rendered output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
