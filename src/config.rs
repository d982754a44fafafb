//! Dashboard configuration.
//!
//! Loaded from a JSON file; every field has a default so an empty object
//! (or no file at all) is a valid configuration.

use crate::selection::SelectionPolicy;
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Option toggle offered for colouring scatter plots by a column
    #[serde(default)]
    pub color_toggle: Option<ColorToggle>,
    #[serde(default)]
    pub selection_policy: SelectionPolicy,
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    #[serde(default = "default_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_bins")]
    pub heatmap_bins: usize,
    #[serde(default)]
    pub render: RenderOptions,
}

/// Load-time shaping of the input table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetConfig {
    /// Rows without a value in this column are dropped at load
    #[serde(default)]
    pub anchor_column: Option<String>,
    #[serde(default)]
    pub binary_encoding: Option<BinaryEncoding>,
    /// KNN fill of missing float cells, applied after the anchor drop
    #[serde(default)]
    pub impute: Option<ImputeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImputeConfig {
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,
}

/// 0/1 encoding of a two-valued categorical column
#[derive(Debug, Clone, Deserialize)]
pub struct BinaryEncoding {
    pub column: String,
    pub positive: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl BinaryEncoding {
    pub fn column_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} (binary)", self.column))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ColorToggle {
    pub label: String,
    pub column: String,
}

fn default_highlight_color() -> String { "red".to_string() }
fn default_bins() -> usize { 20 }
fn default_neighbors() -> usize { 11 }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            color_toggle: None,
            selection_policy: SelectionPolicy::default(),
            highlight_color: default_highlight_color(),
            histogram_bins: default_bins(),
            heatmap_bins: default_bins(),
            render: RenderOptions::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config '{}'", path.display()))?;
        let reader = BufReader::new(file);
        let config: DashboardConfig = serde_json::from_reader(reader)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.highlight_color, "red");
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.selection_policy, SelectionPolicy::RowIdentity);
        assert_eq!(config.render.width, 800);
        assert!(config.dataset.anchor_column.is_none());
        assert!(config.dataset.impute.is_none());
    }

    #[test]
    fn test_impute_default_neighbors() {
        let config: DashboardConfig = serde_json::from_str(r#"{"dataset": {"impute": {}}}"#).unwrap();
        assert_eq!(config.dataset.impute.unwrap().neighbors, 11);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "dataset": {
                "anchor_column": "Red blood Cells",
                "binary_encoding": {"column": "SARS-Cov-2 exam result", "positive": "positive"}
            },
            "color_toggle": {"label": "SARS-Cov-2 test result", "column": "SARS-Cov-2 exam result"},
            "selection_policy": "coordinate_match",
            "highlight_color": "orange",
            "render": {"width": 400, "height": 300, "type": "svg"}
        }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.dataset.anchor_column.as_deref(), Some("Red blood Cells"));
        let enc = config.dataset.binary_encoding.unwrap();
        assert_eq!(enc.column_name(), "SARS-Cov-2 exam result (binary)");
        assert_eq!(config.selection_policy, SelectionPolicy::CoordinateMatch);
        assert_eq!(config.render.height, 300);
        assert!(matches!(config.render.format, OutputFormat::Svg));
    }
}
