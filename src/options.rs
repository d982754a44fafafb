// Chart option toggles and the folded options bag

use serde::Serialize;

/// A single checked option toggle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartOption {
    /// Group/colour points by a column
    Color(String),
    /// Overlay an ordinary-least-squares fit
    Trendline,
    /// Cluster `variable` into `clusters` groups and show the cluster view
    Explore { variable: String, clusters: usize },
}

/// Bar/axis orientation for histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreParams {
    pub variable: String,
    pub clusters: usize,
}

/// Options assembled from the checked toggles. Each toggle writes its own
/// key; a later toggle for the same key replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsBag {
    pub color: Option<String>,
    pub trendline: bool,
    pub explore: Option<ExploreParams>,
    pub orientation: Orientation,
}

impl OptionsBag {
    pub fn from_toggles(toggles: &[ChartOption]) -> Self {
        toggles.iter().fold(Self::default(), |mut bag, toggle| {
            bag.apply(toggle);
            bag
        })
    }

    pub fn apply(&mut self, toggle: &ChartOption) {
        match toggle {
            ChartOption::Color(column) => self.color = Some(column.clone()),
            ChartOption::Trendline => self.trendline = true,
            ChartOption::Explore { variable, clusters } => {
                self.explore = Some(ExploreParams {
                    variable: variable.clone(),
                    clusters: *clusters,
                })
            }
        }
    }
}
