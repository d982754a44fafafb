// Abstract Syntax Tree for the dashboard view DSL

use crate::chart::{ChartFamily, Reshape};
use crate::filter::FilterSpec;
use crate::options::ChartOption;
use crate::selection::SelectionEvent;

/// One dashboard state: everything a single update needs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewRequest {
    pub x: Vec<String>,
    pub y: Vec<String>,
    /// Third axis, ternary only
    pub z: Vec<String>,
    pub family: ChartFamily,
    pub reshape: Reshape,
    /// Checked option toggles, in order
    pub options: Vec<ChartOption>,
    pub filter: Option<FilterSpec>,
    /// Flip-button click count
    pub flip_count: u32,
    /// Points clicked on the previous render
    pub clicks: SelectionEvent,
    /// Fixed marker colour overriding everything else
    pub marker_color: Option<String>,
}

/// Requests replayed in order against one session
pub type ViewScript = Vec<ViewRequest>;

/// Which axis list a component fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}
