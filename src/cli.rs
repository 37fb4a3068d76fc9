use crate::config::{ExportConfig, load_config};
use crate::dispatch::{OutputFormat, render_to_bytes, write_output};
use crate::export::{ExportFormat, export_graph};
use crate::layout::LayoutPreset;
use crate::metrics::{GraphMetrics, MetricsProvider};
use crate::model::{IssueGraph, IssueRecord};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "depgraph",
    version,
    about = "Render issue dependency graphs as JSON, DOT, Mermaid, SVG or PNG"
)]
pub struct Args {
    /// Issues JSON file (array of issues with embedded dependencies) or '-' for stdin
    #[arg(short = 'i', long = "issues")]
    pub issues: Option<PathBuf>,

    /// Precomputed graph metrics (JSON). Required for svg/png.
    #[arg(short = 'm', long = "metrics")]
    pub metrics: Option<PathBuf>,

    /// Output file. json/dot/mermaid go to stdout when omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(short = 'e', long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Config JSON/JSON5 file; flags override its values
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Keep only issues with this label
    #[arg(long)]
    pub label: Option<String>,

    /// Keep only issues reachable from this issue
    #[arg(long)]
    pub root: Option<String>,

    /// Max depth from --root (0 = unlimited)
    #[arg(long)]
    pub depth: Option<usize>,

    /// Snapshot spacing preset
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Snapshot title
    #[arg(long)]
    pub title: Option<String>,

    /// Hash of the input data, echoed in exports and snapshots
    #[arg(long = "data-hash")]
    pub data_hash: Option<String>,

    /// Mermaid: add a "No Dependencies" node when there are no edges
    #[arg(long = "no-deps-placeholder")]
    pub no_deps_placeholder: bool,

    /// Also emit non-blocking (related) edges
    #[arg(long = "include-related")]
    pub include_related: bool,

    /// Print the JSON export envelope instead of the bare document (stdout only)
    #[arg(long)]
    pub envelope: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    Json,
    Dot,
    Mermaid,
    Svg,
    Png,
}

impl FormatArg {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Dot => "dot",
            Self::Mermaid => "mermaid",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PresetArg {
    Compact,
    Roomy,
}

impl From<PresetArg> for LayoutPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Compact => LayoutPreset::Compact,
            PresetArg::Roomy => LayoutPreset::Roomy,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);

    let graph = read_issues(args.issues.as_deref())?;
    let metrics = args
        .metrics
        .as_deref()
        .map(read_metrics)
        .transpose()?;
    let metrics = metrics.as_ref().map(|m| m as &dyn MetricsProvider);

    tracing::debug!(
        issues = graph.nodes.len(),
        dependencies = graph.edges.len(),
        has_metrics = metrics.is_some(),
        "loaded input"
    );

    if let Some(output) = args.output.as_deref() {
        write_output(&graph, metrics, Some(output), &config)?;
        return Ok(());
    }

    let format = match config.format.as_deref() {
        Some(name) => name.parse::<OutputFormat>()?,
        None => OutputFormat::Json,
    };
    if format.is_snapshot() {
        return Err(anyhow::anyhow!("Output path required for {format} output"));
    }

    let bytes = if args.envelope {
        let export_format = match format {
            OutputFormat::Dot => ExportFormat::Dot,
            OutputFormat::Mermaid => ExportFormat::Mermaid,
            _ => ExportFormat::Json,
        };
        export_graph(&graph, metrics, &config.graph_export_config(export_format))
            .to_json()?
            .into_bytes()
    } else {
        render_to_bytes(&graph, metrics, format, &config)?
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}

fn apply_overrides(mut config: ExportConfig, args: &Args) -> ExportConfig {
    if let Some(format) = args.format {
        config.format = Some(format.as_str().to_string());
    }
    if args.label.is_some() {
        config.label = args.label.clone();
    }
    if args.root.is_some() {
        config.root = args.root.clone();
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(preset) = args.preset {
        config.preset = preset.into();
    }
    if args.title.is_some() {
        config.title = args.title.clone();
    }
    if args.data_hash.is_some() {
        config.data_hash = args.data_hash.clone();
    }
    config.no_dependencies_placeholder |= args.no_deps_placeholder;
    config.include_related |= args.include_related;
    config
}

fn read_issues(path: Option<&Path>) -> Result<IssueGraph> {
    let input = read_input(path)?;
    let records: Vec<IssueRecord> =
        serde_json::from_str(&input).context("failed to parse issues JSON")?;
    Ok(IssueGraph::from_records(records))
}

fn read_metrics(path: &Path) -> Result<GraphMetrics> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read metrics {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse metrics {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read issues {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
