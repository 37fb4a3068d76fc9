use crate::export::{ExportFormat, GraphExportConfig};
use crate::filter::FilterOptions;
use crate::layout::{LayoutOptions, LayoutPreset};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Everything the dispatcher needs besides the graph and metrics.
///
/// Loaded from a JSON (or JSON5) file with camelCase keys; command-line
/// flags override individual fields afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// `json`, `dot`, `mermaid`, `svg` or `png`. Inferred from the output
    /// path when absent.
    pub format: Option<String>,
    pub label: Option<String>,
    pub root: Option<String>,
    /// Traversal depth from `root`; 0 is unlimited.
    pub depth: usize,
    pub preset: LayoutPreset,
    pub title: Option<String>,
    pub data_hash: Option<String>,
    pub no_dependencies_placeholder: bool,
    pub include_related: bool,
}

impl ExportConfig {
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            label: self.label.clone(),
            root: self.root.clone(),
            max_depth: self.depth,
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            preset: self.preset,
            title: self.title.clone(),
            data_hash: self.data_hash.clone(),
        }
    }

    pub fn graph_export_config(&self, format: ExportFormat) -> GraphExportConfig {
        GraphExportConfig {
            format,
            filter: self.filter_options(),
            data_hash: self.data_hash.clone(),
            include_related: self.include_related,
            no_dependencies_placeholder: self.no_dependencies_placeholder,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<ExportConfig> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = match serde_json::from_str::<ExportConfig>(&contents) {
        Ok(config) => config,
        Err(_) => json5::from_str::<ExportConfig>(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?,
    };
    tracing::debug!(path = %path.display(), ?config, "loaded export config");
    Ok(config)
}
