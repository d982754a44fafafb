//! Chart-spec resolution.
//!
//! Turns the axis selections, chart family and folded options into a
//! [`ChartSpec`]. Resolution never fails: anything that cannot be drawn
//! (unknown or non-numeric columns, empty selections) contributes nothing,
//! and a chart with nothing left to draw comes back as the empty chart.

use crate::chart::{
    BarMode, BoxTrace, ChartFamily, ChartSpec, Dimension, HeatmapTrace, HistogramTrace, Layout,
    LegendEntry, LegendPlacement, LineTrace, ParallelCoordinatesTrace, Reshape, ScatterMatrixTrace,
    ScatterTrace, StripTrace, TernaryTrace, Trace,
};
use crate::cluster::CLUSTER_COLUMN;
use crate::data::Table;
use crate::options::{OptionsBag, Orientation};
use crate::palette::{ColorPalette, DEFAULT_COLOR};
use crate::transform;
use std::collections::HashSet;

const OVERLAY_OPACITY: f64 = 0.8;
const TRENDLINE_COLOR: &str = "#444444";

/// Styling knobs that come from configuration rather than the request
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub histogram_bins: usize,
    pub heatmap_bins: usize,
    pub highlight_color: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            heatmap_bins: 20,
            highlight_color: "red".to_string(),
        }
    }
}

/// Everything the resolver needs besides the table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartRequest {
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub z: Vec<String>,
    pub family: ChartFamily,
    pub reshape: Reshape,
    /// Row positions (in `table`) to draw with the highlight colour
    pub selected: Vec<usize>,
    pub options: OptionsBag,
    pub style: ChartStyle,
}

impl ChartRequest {
    pub fn new(family: ChartFamily, x: Vec<String>, y: Vec<String>) -> Self {
        Self {
            family,
            x,
            y,
            ..Default::default()
        }
    }
}

/// Resolve a request against a table
pub fn generate_chart(table: &Table, request: &ChartRequest) -> ChartSpec {
    if request.x.is_empty() && request.y.is_empty() {
        log::debug!("No axes selected, returning empty chart");
        return ChartSpec::empty();
    }

    let spec = match request.family {
        ChartFamily::Histogram => histogram(table, request),
        ChartFamily::Scatter => scatter(table, request),
        ChartFamily::Box => box_chart(table, request),
        ChartFamily::Heatmap => heatmap(table, request),
        ChartFamily::ParallelCoordinates => parallel_coordinates(table, request),
        ChartFamily::Strip => strip(table, request),
        ChartFamily::Ternary => ternary(table, request),
    };

    if spec.is_empty() {
        log::debug!("Nothing to draw for {} request", request.family.name());
    }
    spec
}

// =============================================================================
// Histogram
// =============================================================================

fn histogram(table: &Table, request: &ChartRequest) -> ChartSpec {
    let orientation = request.options.orientation;
    let series: Vec<(String, Vec<f64>)> = match request.x.as_slice() {
        [] => return ChartSpec::empty(),
        [only] => {
            log::debug!("Histogram: single column '{}'", only);
            table
                .numeric(only)
                .map(|v| vec![(only.clone(), v.into_iter().flatten().collect())])
                .unwrap_or_default()
        }
        many => {
            log::debug!("Histogram: {} overlaid columns", many.len());
            let long = table.melt(many);
            many.iter()
                .filter(|var| table.numeric(var).is_some())
                .map(|var| (var.clone(), long.values_of(var).into_iter().flatten().collect()))
                .collect()
        }
    };

    let all: Vec<f64> = series.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let edges = transform::bin_edges(&all, request.style.histogram_bins);
    let overlay = series.len() > 1;
    let palette = ColorPalette::category10();

    let traces: Vec<Trace> = series
        .into_iter()
        .enumerate()
        .map(|(i, (name, values))| {
            Trace::Histogram(HistogramTrace {
                bins: transform::histogram_bins(&values, &edges),
                name,
                values,
                opacity: if overlay { OVERLAY_OPACITY } else { 1.0 },
                orientation,
                color: palette.color(i).to_string(),
            })
        })
        .collect();

    let (value_title, count_title) = match request.x.as_slice() {
        [only] => (Some(only.clone()), Some("count".to_string())),
        _ => (Some("value".to_string()), Some("count".to_string())),
    };
    let (x_title, y_title) = match orientation {
        Orientation::Vertical => (value_title, count_title),
        Orientation::Horizontal => (count_title, value_title),
    };

    let layout = Layout {
        x_title,
        y_title,
        bar_mode: overlay.then_some(BarMode::Overlay),
        orientation,
        ..Default::default()
    };
    ChartSpec::new(ChartFamily::Histogram, layout, traces)
}

// =============================================================================
// Scatter
// =============================================================================

fn scatter(table: &Table, request: &ChartRequest) -> ChartSpec {
    if request.reshape == Reshape::Melted {
        log::debug!("Scatter: melted pairing mode");
        return scatter_pairs(table, request);
    }
    match (request.x.as_slice(), request.y.as_slice()) {
        ([x], [y]) => {
            log::debug!("Scatter: single pair {} x {}", x, y);
            scatter_single(table, request, x, y)
        }
        (x, y) if x.len() > 1 || y.len() > 1 => {
            log::debug!("Scatter: matrix of {} dimensions", x.len() + y.len());
            scatter_matrix(table, request)
        }
        _ => {
            log::debug!("Scatter: pairing mode");
            scatter_pairs(table, request)
        }
    }
}

/// Per-row colour by the `color` option, or the default colour
fn row_colors(table: &Table, options: &OptionsBag, rows: &[usize]) -> (Vec<String>, Vec<LegendEntry>) {
    match options.color.as_deref().and_then(|c| table.column(c)) {
        Some(column) => {
            let labels: Vec<Option<String>> = rows.iter().map(|&r| column.data.label(r)).collect();
            transform::group_colors(&labels)
        }
        None => {
            if let Some(name) = &options.color {
                log::warn!("Colour column '{}' not found", name);
            }
            (vec![DEFAULT_COLOR.to_string(); rows.len()], Vec::new())
        }
    }
}

fn scatter_single(table: &Table, request: &ChartRequest, x: &str, y: &str) -> ChartSpec {
    let (Some(xs), Some(ys)) = (table.numeric(x), table.numeric(y)) else {
        return ChartSpec::empty();
    };
    let (px, py, rows) = transform::paired_points(&xs, &ys);
    let (mut colors, legend) = row_colors(table, &request.options, &rows);

    let wanted: HashSet<usize> = request.selected.iter().copied().collect();
    let selected: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| wanted.contains(r).then_some(i))
        .collect();
    for &i in &selected {
        colors[i] = request.style.highlight_color.clone();
    }

    let trendline = if request.options.trendline {
        transform::ols_line(&px, &py)
    } else {
        None
    };

    let mut traces = vec![Trace::Scatter(ScatterTrace {
        name: transform::pair_name(x, y),
        x: px,
        y: py,
        rows,
        colors,
        legend,
        selected,
    })];
    if let Some(points) = trendline {
        traces.push(Trace::Line(LineTrace {
            name: "OLS trendline".to_string(),
            points,
            color: TRENDLINE_COLOR.to_string(),
        }));
    }

    let layout = Layout {
        x_title: Some(x.to_string()),
        y_title: Some(y.to_string()),
        ..Default::default()
    };
    ChartSpec::new(ChartFamily::Scatter, layout, traces)
}

/// Numeric dimensions for the named columns, skipping anything non-numeric
fn dimensions(table: &Table, names: impl Iterator<Item = String>) -> Vec<Dimension> {
    names
        .filter_map(|label| {
            table
                .numeric(&label)
                .map(|values| Dimension { label, values })
        })
        .collect()
}

fn scatter_matrix(table: &Table, request: &ChartRequest) -> ChartSpec {
    let dims = dimensions(table, request.x.iter().chain(request.y.iter()).cloned());
    if dims.is_empty() {
        return ChartSpec::empty();
    }
    let rows: Vec<usize> = (0..table.n_rows()).collect();
    let (colors, legend) = row_colors(table, &request.options, &rows);

    let trace = Trace::ScatterMatrix(ScatterMatrixTrace {
        dimensions: dims,
        show_diagonal: false,
        colors,
        legend,
    });
    ChartSpec::new(ChartFamily::Scatter, Layout::default(), vec![trace])
}

fn scatter_pairs(table: &Table, request: &ChartRequest) -> ChartSpec {
    let palette = ColorPalette::category10();
    let mut traces = Vec::new();

    for (i, (x, y)) in transform::pair_series(&request.x, &request.y).into_iter().enumerate() {
        let (Some(xs), Some(ys)) = (table.numeric(&x), table.numeric(&y)) else {
            log::debug!("Skipping non-numeric pair {} / {}", x, y);
            continue;
        };
        let (px, py, rows) = transform::paired_points(&xs, &ys);
        let color = palette.color(i).to_string();
        traces.push(Trace::Scatter(ScatterTrace {
            name: transform::pair_name(&x, &y),
            colors: vec![color; px.len()],
            x: px,
            y: py,
            rows,
            legend: Vec::new(),
            selected: Vec::new(),
        }));
    }

    let layout = Layout {
        legend: LegendPlacement::Top,
        ..Default::default()
    };
    ChartSpec::new(ChartFamily::Scatter, layout, traces)
}

// =============================================================================
// Other families
// =============================================================================

fn box_chart(table: &Table, request: &ChartRequest) -> ChartSpec {
    let Some(variable) = request.x.first().or_else(|| request.y.first()) else {
        return ChartSpec::empty();
    };
    let (Some(groups), Some(values)) = (table.column(CLUSTER_COLUMN), table.numeric(variable)) else {
        return ChartSpec::empty();
    };

    let mut labels = groups.distinct_sorted();
    labels.sort_by(|a, b| transform::label_order(a, b));

    let palette = ColorPalette::category10();
    let traces: Vec<Trace> = labels
        .into_iter()
        .enumerate()
        .filter_map(|(i, label)| {
            let members: Vec<f64> = (0..table.n_rows())
                .filter(|&r| groups.data.label(r).as_deref() == Some(label.as_str()))
                .filter_map(|r| values[r])
                .collect();
            transform::box_stats(&members).map(|stats| {
                Trace::Box(BoxTrace {
                    name: label,
                    stats,
                    color: palette.color(i).to_string(),
                })
            })
        })
        .collect();

    let layout = Layout {
        x_title: Some(CLUSTER_COLUMN.to_string()),
        y_title: Some(variable.clone()),
        ..Default::default()
    };
    ChartSpec::new(ChartFamily::Box, layout, traces)
}

fn heatmap(table: &Table, request: &ChartRequest) -> ChartSpec {
    let (Some(x), Some(y)) = (request.x.first(), request.y.first()) else {
        return ChartSpec::empty();
    };
    let (Some(xs), Some(ys)) = (table.numeric(x), table.numeric(y)) else {
        return ChartSpec::empty();
    };
    let (px, py, _) = transform::paired_points(&xs, &ys);
    if px.is_empty() {
        return ChartSpec::empty();
    }
    let density = transform::density_2d(&px, &py, request.style.heatmap_bins);

    let trace = Trace::Heatmap(HeatmapTrace {
        x_label: x.clone(),
        y_label: y.clone(),
        x_edges: density.x_edges,
        y_edges: density.y_edges,
        counts: density.counts,
    });
    let layout = Layout {
        x_title: Some(x.clone()),
        y_title: Some(y.clone()),
        ..Default::default()
    };
    ChartSpec::new(ChartFamily::Heatmap, layout, vec![trace])
}

fn parallel_coordinates(table: &Table, request: &ChartRequest) -> ChartSpec {
    let dims = dimensions(table, request.x.iter().chain(request.y.iter()).cloned());
    if dims.is_empty() {
        return ChartSpec::empty();
    }
    let rows: Vec<usize> = (0..table.n_rows()).collect();
    let (colors, _) = row_colors(table, &request.options, &rows);

    let trace = Trace::ParallelCoordinates(ParallelCoordinatesTrace {
        dimensions: dims,
        colors,
    });
    ChartSpec::new(ChartFamily::ParallelCoordinates, Layout::default(), vec![trace])
}

fn strip(table: &Table, request: &ChartRequest) -> ChartSpec {
    let (Some(x), Some(y)) = (request.x.first(), request.y.first()) else {
        return ChartSpec::empty();
    };
    let (Some(categories), Some(values)) = (table.column(x), table.numeric(y)) else {
        return ChartSpec::empty();
    };

    let palette = ColorPalette::category10();
    let traces: Vec<Trace> = categories
        .distinct_sorted()
        .into_iter()
        .enumerate()
        .filter_map(|(position, label)| {
            let members: Vec<f64> = (0..table.n_rows())
                .filter(|&r| categories.data.label(r).as_deref() == Some(label.as_str()))
                .filter_map(|r| values[r])
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(Trace::Strip(StripTrace {
                name: label,
                position,
                offsets: transform::strip_offsets(members.len()),
                values: members,
                color: palette.color(position).to_string(),
            }))
        })
        .collect();

    let layout = Layout {
        x_title: Some(x.clone()),
        y_title: Some(y.clone()),
        ..Default::default()
    };
    ChartSpec::new(ChartFamily::Strip, layout, traces)
}

fn ternary(table: &Table, request: &ChartRequest) -> ChartSpec {
    let (Some(a), Some(b), Some(c)) = (request.x.first(), request.y.first(), request.z.first()) else {
        return ChartSpec::empty();
    };
    let (Some(av), Some(bv), Some(cv)) = (table.numeric(a), table.numeric(b), table.numeric(c)) else {
        return ChartSpec::empty();
    };

    let mut trace = TernaryTrace {
        a_label: a.clone(),
        b_label: b.clone(),
        c_label: c.clone(),
        a: Vec::new(),
        b: Vec::new(),
        c: Vec::new(),
        color: DEFAULT_COLOR.to_string(),
    };
    for r in 0..table.n_rows() {
        let (Some(ra), Some(rb), Some(rc)) = (av[r], bv[r], cv[r]) else {
            continue;
        };
        if let Some((fa, fb, fc)) = transform::ternary_normalize(ra, rb, rc) {
            trace.a.push(fa);
            trace.b.push(fb);
            trace.c.push(fc);
        }
    }
    if trace.a.is_empty() {
        return ChartSpec::empty();
    }
    ChartSpec::new(ChartFamily::Ternary, Layout::default(), vec![Trace::Ternary(trace)])
}
