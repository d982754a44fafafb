use crate::options::Orientation;
use serde::Serialize;

// =============================================================================
// Request vocabulary
// =============================================================================

/// Closed set of chart families the resolver knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartFamily {
    Histogram,
    #[default]
    Scatter,
    Box,
    Heatmap,
    ParallelCoordinates,
    Strip,
    Ternary,
}

impl ChartFamily {
    pub const ALL: [ChartFamily; 7] = [
        ChartFamily::Histogram,
        ChartFamily::Scatter,
        ChartFamily::Box,
        ChartFamily::Heatmap,
        ChartFamily::ParallelCoordinates,
        ChartFamily::Strip,
        ChartFamily::Ternary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartFamily::Histogram => "histogram",
            ChartFamily::Scatter => "scatter",
            ChartFamily::Box => "box",
            ChartFamily::Heatmap => "heatmap",
            ChartFamily::ParallelCoordinates => "par_coords",
            ChartFamily::Strip => "strip",
            ChartFamily::Ternary => "ternary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "parallel_coordinates" => Some(ChartFamily::ParallelCoordinates),
            _ => Self::ALL.iter().copied().find(|f| f.name() == name),
        }
    }
}

/// How multi-series scatter input is laid out before plotting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reshape {
    /// Pick single-pair, matrix or melted mode from the selection shape
    #[default]
    Auto,
    /// Force the melted pairing mode
    Melted,
}

// =============================================================================
// Chart specification (resolver output)
// =============================================================================

/// Renderer-agnostic description of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub family: Option<ChartFamily>,
    pub layout: Layout,
    pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub title: Option<String>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub bar_mode: Option<BarMode>,
    pub legend: LegendPlacement,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPlacement {
    #[default]
    Right,
    /// Horizontal legend above the plot area
    Top,
}

/// One legend entry of a colour-grouped trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Histogram(HistogramTrace),
    Scatter(ScatterTrace),
    Line(LineTrace),
    ScatterMatrix(ScatterMatrixTrace),
    Box(BoxTrace),
    Heatmap(HeatmapTrace),
    ParallelCoordinates(ParallelCoordinatesTrace),
    Strip(StripTrace),
    Ternary(TernaryTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramTrace {
    pub name: String,
    pub values: Vec<f64>,
    pub bins: Vec<Bin>,
    pub opacity: f64,
    pub orientation: Orientation,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Row position (in the plotted table) of each point
    pub rows: Vec<usize>,
    /// Per-point marker colour
    pub colors: Vec<String>,
    pub legend: Vec<LegendEntry>,
    /// Point indices drawn with the highlight colour
    pub selected: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub color: String,
}

/// A named, row-aligned numeric axis (scatter matrix, parallel coordinates)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterMatrixTrace {
    pub dimensions: Vec<Dimension>,
    pub show_diagonal: bool,
    pub colors: Vec<String>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxTrace {
    pub name: String,
    pub stats: BoxStats,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapTrace {
    pub x_label: String,
    pub y_label: String,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// `counts[row][col]`: row indexes y bins, col indexes x bins
    pub counts: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelCoordinatesTrace {
    pub dimensions: Vec<Dimension>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripTrace {
    pub name: String,
    pub position: usize,
    pub values: Vec<f64>,
    /// Horizontal jitter in category units, within (-0.5, 0.5)
    pub offsets: Vec<f64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TernaryTrace {
    pub a_label: String,
    pub b_label: String,
    pub c_label: String,
    /// Fractions per row, each triple summing to 1
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
    pub color: String,
}

impl Trace {
    /// Legend name, for traces that have one
    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Histogram(t) => Some(t.name.as_str()),
            Trace::Scatter(t) => Some(t.name.as_str()),
            Trace::Line(t) => Some(t.name.as_str()),
            Trace::Box(t) => Some(t.name.as_str()),
            Trace::Strip(t) => Some(t.name.as_str()),
            Trace::ScatterMatrix(_)
            | Trace::Heatmap(_)
            | Trace::ParallelCoordinates(_)
            | Trace::Ternary(_) => None,
        }
    }
}

impl ChartSpec {
    /// The "nothing to show" placeholder
    pub fn empty() -> Self {
        Self {
            family: None,
            layout: Layout::default(),
            traces: Vec::new(),
        }
    }

    pub fn new(family: ChartFamily, layout: Layout, traces: Vec<Trace>) -> Self {
        if traces.is_empty() {
            return Self::empty();
        }
        Self {
            family: Some(family),
            layout,
            traces,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn trace_names(&self) -> Vec<&str> {
        self.traces.iter().filter_map(Trace::name).collect()
    }

    /// Paint every marker with one colour, overriding grouping and highlights
    pub fn override_marker_color(&mut self, color: &str) {
        for trace in &mut self.traces {
            match trace {
                Trace::Histogram(t) => t.color = color.to_string(),
                Trace::Scatter(t) => {
                    t.colors.iter_mut().for_each(|c| *c = color.to_string());
                    t.legend.clear();
                }
                Trace::ScatterMatrix(t) => {
                    t.colors.iter_mut().for_each(|c| *c = color.to_string());
                    t.legend.clear();
                }
                Trace::ParallelCoordinates(t) => {
                    t.colors.iter_mut().for_each(|c| *c = color.to_string())
                }
                Trace::Box(t) => t.color = color.to_string(),
                Trace::Strip(t) => t.color = color.to_string(),
                Trace::Ternary(t) => t.color = color.to_string(),
                Trace::Line(_) | Trace::Heatmap(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scatter() -> Trace {
        Trace::Scatter(ScatterTrace {
            name: "a-b".into(),
            x: vec![1.0, 2.0],
            y: vec![3.0, 4.0],
            rows: vec![0, 1],
            colors: vec!["#1f77b4".into(), "red".into()],
            legend: vec![],
            selected: vec![1],
        })
    }

    #[test]
    fn test_family_names_round_trip() {
        for family in ChartFamily::ALL {
            assert_eq!(ChartFamily::from_name(family.name()), Some(family));
        }
        assert_eq!(
            ChartFamily::from_name("parallel_coordinates"),
            Some(ChartFamily::ParallelCoordinates)
        );
        assert_eq!(ChartFamily::from_name("pie"), None);
    }

    #[test]
    fn test_new_without_traces_is_empty() {
        let spec = ChartSpec::new(ChartFamily::Scatter, Layout::default(), vec![]);
        assert!(spec.is_empty());
        assert_eq!(spec.family, None);
    }

    #[test]
    fn test_override_marker_color() {
        let mut spec = ChartSpec::new(ChartFamily::Scatter, Layout::default(), vec![scatter()]);
        spec.override_marker_color("green");
        if let Trace::Scatter(t) = &spec.traces[0] {
            assert!(t.colors.iter().all(|c| c == "green"));
        } else {
            panic!("Expected scatter trace");
        }
    }

    #[test]
    fn test_serialize_tagged() {
        let spec = ChartSpec::new(ChartFamily::Scatter, Layout::default(), vec![scatter()]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["family"], "scatter");
        assert_eq!(json["traces"][0]["type"], "scatter");
        assert_eq!(json["traces"][0]["name"], "a-b");
    }
}
