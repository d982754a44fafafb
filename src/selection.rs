// Point selection tracking for scatter plots

use crate::chart::ChartFamily;
use crate::data::Table;
use serde::Deserialize;

/// How a clicked point is mapped back onto table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The point's index identifies exactly one row of the last render
    #[default]
    RowIdentity,
    /// Every row whose first X/Y values equal the point's coordinates.
    /// Duplicate coordinates toggle all of their rows.
    CoordinateMatch,
}

/// One clicked or lassoed point. `point_index` is the row position in the
/// table that was last plotted; coordinates are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickPoint {
    pub point_index: usize,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl ClickPoint {
    pub fn at(point_index: usize) -> Self {
        Self {
            point_index,
            x: None,
            y: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionEvent {
    pub points: Vec<ClickPoint>,
}

impl SelectionEvent {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-row selected flags, indexed by loaded-table row
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    flags: Vec<bool>,
}

impl SelectionState {
    pub fn new(n_rows: usize) -> Self {
        Self {
            flags: vec![false; n_rows],
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.flags.get(row).copied().unwrap_or(false)
    }

    pub fn flip(&mut self, row: usize) {
        if let Some(flag) = self.flags.get_mut(row) {
            *flag = !*flag;
        }
    }

    pub fn clear(&mut self) {
        self.flags.iter_mut().for_each(|f| *f = false);
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }

    /// Positions within a filtered view whose source row is selected
    pub fn highlighted(&self, rows: &[usize]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter_map(|(pos, &row)| self.is_selected(row).then_some(pos))
            .collect()
    }
}

/// Everything the tracker needs to map an event onto rows
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    /// The loaded (unfiltered) table the flags refer to
    pub table: &'a Table,
    /// Source rows of the last plotted view, by plotted position
    pub rendered_rows: &'a [usize],
    pub family: ChartFamily,
    pub x: &'a [String],
    pub y: &'a [String],
    pub policy: SelectionPolicy,
}

/// Flip the selected flag of every row the event refers to. Returns the
/// number of flips performed.
pub fn toggle_selection(state: &mut SelectionState, event: &SelectionEvent, ctx: &SelectionContext<'_>) -> usize {
    if ctx.family != ChartFamily::Scatter || event.is_empty() {
        return 0;
    }
    let (Some(x_col), Some(y_col)) = (ctx.x.first(), ctx.y.first()) else {
        return 0;
    };

    let mut flips = 0;
    match ctx.policy {
        SelectionPolicy::RowIdentity => {
            for point in &event.points {
                match ctx.rendered_rows.get(point.point_index) {
                    Some(&row) => {
                        state.flip(row);
                        flips += 1;
                    }
                    None => log::warn!("Click on unknown point {}", point.point_index),
                }
            }
        }
        SelectionPolicy::CoordinateMatch => {
            let (Some(xs), Some(ys)) = (ctx.table.numeric(x_col), ctx.table.numeric(y_col)) else {
                return 0;
            };
            for point in &event.points {
                let source = ctx.rendered_rows.get(point.point_index).copied();
                let px = point.x.or_else(|| source.and_then(|r| xs.get(r).copied().flatten()));
                let py = point.y.or_else(|| source.and_then(|r| ys.get(r).copied().flatten()));
                let (Some(px), Some(py)) = (px, py) else {
                    log::warn!("Click on point {} has no coordinates", point.point_index);
                    continue;
                };
                for row in 0..ctx.table.n_rows() {
                    if xs[row] == Some(px) && ys[row] == Some(py) {
                        state.flip(row);
                        flips += 1;
                    }
                }
            }
        }
    }
    log::debug!("Selection event flipped {} row flags", flips);
    flips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, ColumnData};

    fn make_table() -> Table {
        Table::new(vec![
            Column::new("a", ColumnData::Float(vec![Some(1.0), Some(2.0), Some(1.0), Some(3.0)])),
            Column::new("b", ColumnData::Float(vec![Some(5.0), Some(6.0), Some(5.0), Some(7.0)])),
        ])
        .unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_identity_toggle() {
        let table = make_table();
        let (x, y) = (cols(&["a"]), cols(&["b"]));
        // last render showed rows 1 and 3 only
        let rendered = vec![1, 3];
        let ctx = SelectionContext {
            table: &table,
            rendered_rows: &rendered,
            family: ChartFamily::Scatter,
            x: &x,
            y: &y,
            policy: SelectionPolicy::RowIdentity,
        };
        let mut state = SelectionState::new(4);
        let event = SelectionEvent { points: vec![ClickPoint::at(1)] };
        assert_eq!(toggle_selection(&mut state, &event, &ctx), 1);
        assert_eq!(state.selected_rows(), vec![3]);
        assert_eq!(state.highlighted(&rendered), vec![1]);
    }

    #[test]
    fn test_coordinate_match_flips_duplicates() {
        let table = make_table();
        let (x, y) = (cols(&["a"]), cols(&["b"]));
        let rendered: Vec<usize> = (0..4).collect();
        let ctx = SelectionContext {
            table: &table,
            rendered_rows: &rendered,
            family: ChartFamily::Scatter,
            x: &x,
            y: &y,
            policy: SelectionPolicy::CoordinateMatch,
        };
        let mut state = SelectionState::new(4);
        let event = SelectionEvent {
            points: vec![ClickPoint { point_index: 0, x: Some(1.0), y: Some(5.0) }],
        };
        toggle_selection(&mut state, &event, &ctx);
        assert_eq!(state.selected_rows(), vec![0, 2]);
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let table = make_table();
        let (x, y) = (cols(&["a"]), cols(&["b"]));
        let rendered: Vec<usize> = (0..4).collect();
        for policy in [SelectionPolicy::RowIdentity, SelectionPolicy::CoordinateMatch] {
            let ctx = SelectionContext {
                table: &table,
                rendered_rows: &rendered,
                family: ChartFamily::Scatter,
                x: &x,
                y: &y,
                policy,
            };
            let mut state = SelectionState::new(4);
            state.flip(3);
            let before = state.clone();
            let event = SelectionEvent { points: vec![ClickPoint::at(0), ClickPoint::at(3)] };
            toggle_selection(&mut state, &event, &ctx);
            assert_ne!(state, before);
            toggle_selection(&mut state, &event, &ctx);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_non_scatter_is_noop() {
        let table = make_table();
        let (x, y) = (cols(&["a"]), cols(&["b"]));
        let rendered: Vec<usize> = (0..4).collect();
        let ctx = SelectionContext {
            table: &table,
            rendered_rows: &rendered,
            family: ChartFamily::Histogram,
            x: &x,
            y: &y,
            policy: SelectionPolicy::RowIdentity,
        };
        let mut state = SelectionState::new(4);
        let event = SelectionEvent { points: vec![ClickPoint::at(0)] };
        assert_eq!(toggle_selection(&mut state, &event, &ctx), 0);
        assert!(state.selected_rows().is_empty());
    }

    #[test]
    fn test_missing_axis_is_noop() {
        let table = make_table();
        let (x, y) = (cols(&["a"]), cols(&[]));
        let rendered: Vec<usize> = (0..4).collect();
        let ctx = SelectionContext {
            table: &table,
            rendered_rows: &rendered,
            family: ChartFamily::Scatter,
            x: &x,
            y: &y,
            policy: SelectionPolicy::RowIdentity,
        };
        let mut state = SelectionState::new(4);
        let event = SelectionEvent { points: vec![ClickPoint::at(0)] };
        assert_eq!(toggle_selection(&mut state, &event, &ctx), 0);
    }
}
