//! Format dispatch: pick an output format, produce its bytes, write the file.

use crate::config::ExportConfig;
use crate::error::{RenderError, Result};
use crate::export::{ExportFormat, export_graph};
use crate::filter::filter_graph;
use crate::layout::compute_layout;
use crate::metrics::MetricsProvider;
use crate::model::IssueGraph;
use crate::render::{SnapshotFormat, render_snapshot};
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Dot,
    Mermaid,
    Svg,
    Png,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Dot => "dot",
            Self::Mermaid => "mermaid",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Format implied by a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "dot" | "gv" => Some(Self::Dot),
            "mmd" | "mermaid" => Some(Self::Mermaid),
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn is_snapshot(self) -> bool {
        matches!(self, Self::Svg | Self::Png)
    }

    fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Json => Some(ExportFormat::Json),
            Self::Dot => Some(ExportFormat::Dot),
            Self::Mermaid => Some(ExportFormat::Mermaid),
            Self::Svg | Self::Png => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(raw: &str) -> Result<Self> {
        let name = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        match name.as_str() {
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(RenderError::UnsupportedFormat(raw.to_string())),
        }
    }
}

/// Decide the final path and format.
///
/// An explicit format wins and leaves the path alone. Otherwise the
/// extension decides; no extension means SVG with `.svg` appended, and an
/// unrecognised extension means SVG with the path unchanged.
pub fn resolve_output(
    path: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<(PathBuf, OutputFormat)> {
    let path = path
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(RenderError::MissingOutputPath)?;

    if let Some(format) = format {
        return Ok((path.to_path_buf(), format));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        None => {
            let mut with_ext = OsString::from(path.as_os_str());
            with_ext.push(".svg");
            Ok((PathBuf::from(with_ext), OutputFormat::Svg))
        }
        Some(ext) => Ok((
            path.to_path_buf(),
            OutputFormat::from_extension(ext).unwrap_or(OutputFormat::Svg),
        )),
    }
}

/// Produce the complete output for `format` in memory.
///
/// Snapshot formats fail with [`RenderError::MissingMetrics`] before any
/// other work when `metrics` is `None`, and with [`RenderError::EmptyGraph`]
/// when the filters leave nothing to draw.
pub fn render_to_bytes(
    graph: &IssueGraph,
    metrics: Option<&dyn MetricsProvider>,
    format: OutputFormat,
    config: &ExportConfig,
) -> Result<Vec<u8>> {
    if let Some(export_format) = format.export_format() {
        let result = export_graph(graph, metrics, &config.graph_export_config(export_format));
        return Ok(result.document()?.into_bytes());
    }

    let metrics = metrics.ok_or(RenderError::MissingMetrics)?;
    let filtered = filter_graph(graph, &config.filter_options());
    let layout = compute_layout(&filtered, metrics, &config.layout_options())?;
    let snapshot = match format {
        OutputFormat::Png => SnapshotFormat::Png,
        _ => SnapshotFormat::Svg,
    };
    render_snapshot(&layout, snapshot)
}

/// Render and write to `path`, returning the path actually written.
///
/// The output is fully produced before any file is touched, then written to
/// a sibling `.tmp` file and renamed over `path`. A failed render or write
/// leaves neither a truncated target nor a stray temp file.
pub fn write_output(
    graph: &IssueGraph,
    metrics: Option<&dyn MetricsProvider>,
    path: Option<&Path>,
    config: &ExportConfig,
) -> Result<PathBuf> {
    let explicit = config
        .format
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .map(str::parse::<OutputFormat>)
        .transpose()?;
    let (path, format) = resolve_output(path, explicit)?;

    let bytes = render_to_bytes(graph, metrics, format, config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_atomic(&path, &bytes)?;

    tracing::info!(
        path = %path.display(),
        format = format.as_str(),
        bytes = bytes.len(),
        "wrote graph output"
    );
    Ok(path)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    let written = write_temp(&temp_path, bytes)
        .and_then(|()| fs::rename(&temp_path, path).map_err(RenderError::from));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_temp(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(temp_path)?);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

/// `graph.svg` -> `graph.svg.tmp`, next to the target.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
