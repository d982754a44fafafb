//! Dashboard session.
//!
//! A [`Session`] owns one loaded table and its per-row selection flags and
//! turns each incoming [`ViewRequest`] into a primary chart plus an optional
//! cluster-distribution chart. It also answers the queries that drive the
//! dashboard's dynamic controls (axis choices, filter slider, cluster
//! variable choices).

use crate::chart::{ChartFamily, ChartSpec, Trace};
use crate::cluster::{self, CLUSTER_COLUMN};
use crate::config::{DashboardConfig, DatasetConfig};
use crate::data::{DType, PlotData, Table};
use crate::filter::{self, FilterSpec};
use crate::impute::knn_impute;
use crate::options::{ChartOption, OptionsBag};
use crate::orientation::resolve_axes;
use crate::parser::ViewRequest;
use crate::resolve::{generate_chart, ChartRequest, ChartStyle};
use crate::selection::{toggle_selection, SelectionContext, SelectionState};
use anyhow::{Context, Result};
use serde::Serialize;

/// Charts produced by one update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub primary: ChartSpec,
    /// Distribution of the clustered variable, present while clustering is on
    pub auxiliary: Option<ChartSpec>,
}

/// A checkable option offered for the current axis selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionToggle {
    pub label: String,
    pub option: ChartOption,
}

/// Choices offered by the axis dropdowns and the option checklist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisChoices {
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub toggles: Vec<OptionToggle>,
}

/// Range slider configuration for the filter column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub marks: Vec<(f64, String)>,
    /// Initial handle positions
    pub value: (f64, f64),
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 20.0,
            step: 0.1,
            marks: vec![(0.0, String::new()), (20.0, String::new())],
            value: (0.0, 20.0),
        }
    }
}

// Inputs whose change invalidates a pending click
#[derive(Debug, Clone, PartialEq)]
struct InteractionKey {
    flip_count: u32,
    options: Vec<ChartOption>,
    filter: Option<FilterSpec>,
}

impl InteractionKey {
    fn of(request: &ViewRequest) -> Self {
        Self {
            flip_count: request.flip_count,
            options: request.options.clone(),
            filter: request.filter.clone(),
        }
    }
}

pub struct Session {
    table: Table,
    config: DashboardConfig,
    selection: SelectionState,
    /// Loaded rows of the last render, by drawn point index
    last_rows: Vec<usize>,
    last_key: Option<InteractionKey>,
}

impl Session {
    pub fn new(table: Table, config: DashboardConfig) -> Self {
        let n = table.n_rows();
        Self {
            table,
            config,
            selection: SelectionState::new(n),
            last_rows: (0..n).collect(),
            last_key: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run one dashboard update
    pub fn update(&mut self, request: &ViewRequest) -> Dashboard {
        // 1. Fold option toggles
        let mut options = OptionsBag::from_toggles(&request.options);

        // 2. Flip button
        let (x, y) = resolve_axes(
            request.flip_count,
            &mut options,
            request.family,
            &request.x,
            &request.y,
        );

        // 3. Point clicks, against the unflipped selections
        let key = InteractionKey::of(request);
        let stale = self.last_key.as_ref().is_some_and(|prev| *prev != key);
        if stale && !request.clicks.is_empty() {
            log::debug!("Discarding {} click(s) after a control change", request.clicks.points.len());
        } else {
            let ctx = SelectionContext {
                table: &self.table,
                rendered_rows: &self.last_rows,
                family: request.family,
                x: &request.x,
                y: &request.y,
                policy: self.config.selection_policy,
            };
            toggle_selection(&mut self.selection, &request.clicks, &ctx);
        }

        // 4. Filter
        let filtered = filter::filter(&self.table, request.filter.as_ref());
        let mut plotted = filtered.table;

        // 5. Clustering overlay
        let mut auxiliary = None;
        if let Some(explore) = options.explore.clone() {
            if request.family == ChartFamily::Scatter && explore.clusters >= 2 {
                match self.apply_clustering(plotted.clone(), &explore.variable, explore.clusters) {
                    Ok((augmented, chart)) => {
                        plotted = augmented;
                        options.color = Some(CLUSTER_COLUMN.to_string());
                        auxiliary = Some(chart);
                    }
                    Err(e) => log::warn!("Clustering skipped: {:#}", e),
                }
            }
        }

        // 6. Highlighted positions in the plotted table
        let selected = self.selection.highlighted(&filtered.rows);

        // 7. Primary chart
        let chart_request = ChartRequest {
            x,
            y,
            z: request.z.clone(),
            family: request.family,
            reshape: request.reshape,
            selected,
            options,
            style: self.style(),
        };
        let mut primary = generate_chart(&plotted, &chart_request);

        // 8. Fixed marker colour
        if let Some(color) = &request.marker_color {
            primary.override_marker_color(color);
        }

        // 9. Remember the source row of every drawn point
        self.last_rows = drawn_rows(&primary, &filtered.rows);
        self.last_key = Some(key);

        Dashboard { primary, auxiliary }
    }

    fn apply_clustering(&self, table: Table, variable: &str, k: usize) -> Result<(Table, ChartSpec)> {
        let labels = cluster::cluster(&table, variable, k)?;
        let augmented = table.with_column(cluster::label_column(&labels))?;
        let request = ChartRequest {
            style: self.style(),
            ..ChartRequest::new(ChartFamily::Box, vec![variable.to_string()], Vec::new())
        };
        let chart = generate_chart(&augmented, &request);
        Ok((augmented, chart))
    }

    fn style(&self) -> ChartStyle {
        ChartStyle {
            histogram_bins: self.config.histogram_bins,
            heatmap_bins: self.config.heatmap_bins,
            highlight_color: self.config.highlight_color.clone(),
        }
    }

    // =========================================================================
    // Dynamic controls
    // =========================================================================

    /// Axis dropdown choices and option toggles for the current family and
    /// selection
    pub fn axis_choices(&self, family: ChartFamily, x: &[String], y: &[String]) -> AxisChoices {
        let floats = self.table.columns_of_type(DType::Float);
        let color_toggle = self.config.color_toggle.as_ref().map(|t| OptionToggle {
            label: t.label.clone(),
            option: ChartOption::Color(t.column.clone()),
        });

        match family {
            ChartFamily::Histogram => AxisChoices {
                x: floats,
                y: Vec::new(),
                toggles: Vec::new(),
            },
            ChartFamily::Scatter => {
                let mut toggles: Vec<OptionToggle> = color_toggle.into_iter().collect();
                if x.len() == 1 && y.len() == 1 {
                    toggles.push(OptionToggle {
                        label: "Trendline".to_string(),
                        option: ChartOption::Trendline,
                    });
                }
                AxisChoices {
                    x: floats.clone(),
                    y: floats,
                    toggles,
                }
            }
            _ => AxisChoices {
                x: floats.clone(),
                y: floats,
                toggles: color_toggle.into_iter().collect(),
            },
        }
    }

    /// Slider bounds, marks and step for a filter column
    pub fn filter_slider(&self, column: Option<&str>) -> SliderConfig {
        let Some(column) = column.and_then(|name| self.table.column(name)) else {
            return SliderConfig::default();
        };

        match column.dtype() {
            DType::Float => {
                let (Some(min), Some(max)) = (column.min(), column.max()) else {
                    return SliderConfig::default();
                };
                let mid = (min + max) / 2.0;
                SliderConfig {
                    min,
                    max,
                    step: 0.1,
                    marks: [min, mid, max]
                        .iter()
                        .map(|&v| (v, format!("{:.1}", v)))
                        .collect(),
                    value: (min, max),
                }
            }
            DType::Int => {
                let (Some(min), Some(max)) = (column.min(), column.max()) else {
                    return SliderConfig::default();
                };
                SliderConfig {
                    min,
                    max,
                    step: 1.0,
                    marks: vec![(min, format!("{}", min as i64)), (max, format!("{}", max as i64))],
                    value: (min, max),
                }
            }
            DType::Text => {
                let distinct = column.distinct_sorted();
                if distinct.is_empty() {
                    return SliderConfig::default();
                }
                let max = (distinct.len() - 1) as f64;
                SliderConfig {
                    min: 0.0,
                    max,
                    step: 1.0,
                    marks: distinct
                        .into_iter()
                        .enumerate()
                        .map(|(i, label)| (i as f64, label))
                        .collect(),
                    value: (0.0, max),
                }
            }
        }
    }

    /// Variables offered for clustering: the current X then Y selections
    pub fn cluster_choices(&self, x: &[String], y: &[String]) -> Vec<String> {
        x.iter().chain(y.iter()).cloned().collect()
    }

    /// Whether the cluster-distribution chart is shown
    pub fn auxiliary_visible(&self, variable: Option<&str>, clusters: Option<usize>) -> bool {
        variable.is_some() && clusters.is_some_and(|k| k > 1)
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        self.selection.selected_rows()
    }

    pub fn reset_selection(&mut self) {
        self.selection.clear();
    }
}

/// Loaded rows by drawn point index. Scatter traces skip rows with a missing
/// coordinate, so a click on point `i` means `trace.rows[i]`, not table row `i`.
fn drawn_rows(primary: &ChartSpec, plotted_rows: &[usize]) -> Vec<usize> {
    match primary.traces.first() {
        Some(Trace::Scatter(trace)) => trace
            .rows
            .iter()
            .filter_map(|&pos| plotted_rows.get(pos).copied())
            .collect(),
        _ => plotted_rows.to_vec(),
    }
}

/// Build the session table from raw input, applying the dataset shaping
/// from configuration
pub fn load_table(data: &PlotData, dataset: &DatasetConfig) -> Result<Table> {
    let mut table = Table::from_plot_data(data);
    let loaded = table.n_rows();

    if let Some(anchor) = &dataset.anchor_column {
        table = table
            .drop_rows_missing(anchor)
            .with_context(|| format!("Failed to apply anchor column '{}'", anchor))?;
    }

    if let Some(impute) = &dataset.impute {
        table = knn_impute(&table, impute.neighbors).context("Failed to impute missing values")?;
    }

    if let Some(enc) = &dataset.binary_encoding {
        table = table
            .add_binary_encoding(&enc.column, &enc.positive, &enc.column_name())
            .with_context(|| format!("Failed to encode column '{}'", enc.column))?;
    }

    log::info!(
        "Loaded {} rows ({} after shaping), {} columns",
        loaded,
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}
