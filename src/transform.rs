use crate::chart::{Bin, BoxStats, LegendEntry};
use crate::palette::{ColorPalette, MISSING_COLOR};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Pair up X and Y selections positionally. The shorter list is padded with
/// its first element; nothing is paired when either side is empty.
pub fn pair_series(x: &[String], y: &[String]) -> Vec<(String, String)> {
    let (Some(x0), Some(y0)) = (x.first(), y.first()) else {
        return Vec::new();
    };
    let n = x.len().max(y.len());
    (0..n)
        .map(|i| {
            let xi = x.get(i).unwrap_or(x0);
            let yi = y.get(i).unwrap_or(y0);
            (xi.clone(), yi.clone())
        })
        .collect()
}

/// Legend name of a paired trace
pub fn pair_name(x: &str, y: &str) -> String {
    format!("{}-{}", x, y)
}

/// Row-aligned points where both coordinates are present.
/// Returns `(x, y, rows)`.
pub fn paired_points(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Vec<f64>, Vec<f64>, Vec<usize>) {
    let mut out_x = Vec::new();
    let mut out_y = Vec::new();
    let mut rows = Vec::new();
    for (row, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
        if let (Some(x), Some(y)) = (x, y) {
            out_x.push(*x);
            out_y.push(*y);
            rows.push(row);
        }
    }
    (out_x, out_y, rows)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// `bins + 1` equally spaced edges covering `values`. A constant sample gets
/// a single unit-wide bin centred on the value.
pub fn bin_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    let range = max - min;
    if range == 0.0 || bins == 0 {
        return vec![min - 0.5, max + 0.5];
    }
    let width = range / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + i as f64 * width })
        .collect()
}

/// Count `values` into the bins described by `edges`. The last bin is closed
/// on the right; values outside the edges are ignored.
pub fn histogram_bins(values: &[f64], edges: &[f64]) -> Vec<Bin> {
    if edges.len() < 2 {
        return Vec::new();
    }
    let mut counts = vec![0usize; edges.len() - 1];
    for &v in values {
        if let Some(idx) = bin_index(v, edges) {
            counts[idx] += 1;
        }
    }
    edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| Bin {
            start: w[0],
            end: w[1],
            count,
        })
        .collect()
}

fn bin_index(v: f64, edges: &[f64]) -> Option<usize> {
    let last = edges.len().checked_sub(1)?;
    if last == 0 || v < edges[0] || v > edges[last] {
        return None;
    }
    // first edge strictly greater than v, minus one
    let idx = edges.partition_point(|&e| e <= v).saturating_sub(1);
    Some(idx.min(last - 1))
}

/// Result of 2-D binning: `counts[y_bin][x_bin]`
#[derive(Debug, Clone, PartialEq)]
pub struct Density2d {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub counts: Vec<Vec<usize>>,
}

pub fn density_2d(xs: &[f64], ys: &[f64], bins: usize) -> Density2d {
    let x_edges = bin_edges(xs, bins);
    let y_edges = bin_edges(ys, bins);
    let nx = x_edges.len().saturating_sub(1);
    let ny = y_edges.len().saturating_sub(1);
    let mut counts = vec![vec![0usize; nx]; ny];
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        if let (Some(cx), Some(cy)) = (bin_index(x, &x_edges), bin_index(y, &y_edges)) {
            counts[cy][cx] += 1;
        }
    }
    Density2d {
        x_edges,
        y_edges,
        counts,
    }
}

/// Tukey box statistics: quartiles, whiskers at the furthest points within
/// 1.5 IQR, and everything beyond as outliers
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let ys = sorted(values);

    let q1 = percentile(&ys, 0.25);
    let median = percentile(&ys, 0.50);
    let q3 = percentile(&ys, 0.75);
    let iqr = q3 - q1;

    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let lower_whisker = ys.iter().copied().find(|&v| v >= lower_fence).unwrap_or(q1);
    let upper_whisker = ys.iter().rev().copied().find(|&v| v <= upper_fence).unwrap_or(q3);
    let outliers: Vec<f64> = ys
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
        count: ys.len(),
    })
}

/// Linear-interpolated percentile of already sorted data
fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted_data[0];
    }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}

/// Ordinary least squares fit, returned as the line's end points over the
/// x range. `None` with fewer than two points or a vertical spread of x.
pub fn ols_line(xs: &[f64], ys: &[f64]) -> Option<Vec<(f64, f64)>> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xx: f64 = xs.iter().map(|&x| x * x).sum();
    let sum_xy: f64 = xs.iter().zip(ys.iter()).map(|(&x, &y)| x * y).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let min_x = xs.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max_x = xs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    Some(vec![
        (min_x, slope * min_x + intercept),
        (max_x, slope * max_x + intercept),
    ])
}

/// Deterministic horizontal jitter for `n` strip points, in (-0.4, 0.4)
pub fn strip_offsets(n: usize) -> Vec<f64> {
    const GOLDEN: f64 = 0.618_033_988_749_895;
    (0..n)
        .map(|i| (((i as f64 + 1.0) * GOLDEN).fract() - 0.5) * 0.8)
        .collect()
}

/// Scale a non-negative triple to fractions summing to 1
pub fn ternary_normalize(a: f64, b: f64, c: f64) -> Option<(f64, f64, f64)> {
    if a < 0.0 || b < 0.0 || c < 0.0 {
        return None;
    }
    let total = a + b + c;
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    Some((a / total, b / total, c / total))
}

/// Group label ordering: numeric labels by value, ahead of text labels,
/// which compare lexicographically. Keeps "10" after "9".
pub fn label_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Per-point colours for a grouping column plus the matching legend.
/// Groups are ordered by [`label_order`]; missing labels are grey and unlisted.
pub fn group_colors(labels: &[Option<String>]) -> (Vec<String>, Vec<LegendEntry>) {
    let mut groups: Vec<String> = labels
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    groups.sort_by(|a, b| label_order(a, b));
    let map = ColorPalette::category10().assign_colors(&groups);

    let colors = labels
        .iter()
        .map(|l| match l {
            Some(l) => map[l].clone(),
            None => MISSING_COLOR.to_string(),
        })
        .collect();
    let legend = groups
        .into_iter()
        .map(|label| LegendEntry {
            color: map[&label].clone(),
            label,
        })
        .collect();
    (colors, legend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pair_series_pads_with_first() {
        let pairs = pair_series(&names(&["A", "B", "C"]), &names(&["D"]));
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "D".to_string()),
                ("B".to_string(), "D".to_string()),
                ("C".to_string(), "D".to_string()),
            ]
        );

        let pairs = pair_series(&names(&["A"]), &names(&["D", "E"]));
        assert_eq!(pairs[1], ("A".to_string(), "E".to_string()));
    }

    #[test]
    fn test_pair_series_empty_side() {
        assert!(pair_series(&names(&["A"]), &[]).is_empty());
        assert!(pair_series(&[], &[]).is_empty());
    }

    #[test]
    fn test_paired_points_drop_missing() {
        let (x, y, rows) = paired_points(
            &[Some(1.0), None, Some(3.0), Some(4.0)],
            &[Some(10.0), Some(20.0), None, Some(40.0)],
        );
        assert_eq!(x, vec![1.0, 4.0]);
        assert_eq!(y, vec![10.0, 40.0]);
        assert_eq!(rows, vec![0, 3]);
    }

    #[test]
    fn test_histogram_bins() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let edges = bin_edges(&values, 2);
        assert_eq!(edges, vec![0.0, 2.0, 4.0]);
        let bins = histogram_bins(&values, &edges);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        // right edge is inclusive for the last bin
        assert_eq!(bins[1].count, 3);
    }

    #[test]
    fn test_bin_edges_constant() {
        let edges = bin_edges(&[5.0, 5.0], 10);
        assert_eq!(edges, vec![4.5, 5.5]);
        assert_eq!(histogram_bins(&[5.0, 5.0], &edges)[0].count, 2);
        assert!(bin_edges(&[], 10).is_empty());
    }

    #[test]
    fn test_density_2d() {
        let d = density_2d(&[0.0, 0.0, 1.0], &[0.0, 0.0, 1.0], 2);
        assert_eq!(d.counts.len(), 2);
        assert_eq!(d.counts[0][0], 2);
        assert_eq!(d.counts[1][1], 1);
        assert_eq!(d.counts.iter().flatten().sum::<usize>(), 3);
    }

    #[test]
    fn test_box_stats() {
        let stats = box_stats(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.count, 5);
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn test_ols_line() {
        let line = ols_line(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert_eq!(line.len(), 2);
        assert!((line[0].1 - 1.0).abs() < 1e-9);
        assert!((line[1].1 - 5.0).abs() < 1e-9);
        assert!(ols_line(&[1.0], &[1.0]).is_none());
        assert!(ols_line(&[2.0, 2.0], &[1.0, 3.0]).is_none());
    }

    #[test]
    fn test_strip_offsets_deterministic() {
        let a = strip_offsets(50);
        assert_eq!(a, strip_offsets(50));
        assert!(a.iter().all(|o| o.abs() < 0.5));
    }

    #[test]
    fn test_ternary_normalize() {
        let (a, b, c) = ternary_normalize(1.0, 1.0, 2.0).unwrap();
        assert_eq!((a, b, c), (0.25, 0.25, 0.5));
        assert!(ternary_normalize(0.0, 0.0, 0.0).is_none());
        assert!(ternary_normalize(-1.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_group_colors() {
        let labels = vec![Some("b".to_string()), Some("a".to_string()), None, Some("b".to_string())];
        let (colors, legend) = group_colors(&labels);
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[0], colors[3]);
        assert_ne!(colors[0], colors[1]);
        assert_eq!(colors[2], MISSING_COLOR);
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].label, "a");
    }

    #[test]
    fn test_group_colors_numeric_labels() {
        let labels: Vec<Option<String>> = [10, 2, 0, 1, 9, 11]
            .iter()
            .map(|i| Some(i.to_string()))
            .collect();
        let (_, legend) = group_colors(&labels);
        let order: Vec<&str> = legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(order, vec!["0", "1", "2", "9", "10", "11"]);
    }

    #[test]
    fn test_label_order_mixed() {
        let mut labels = vec!["b", "10", "a", "9"];
        labels.sort_by(|a, b| label_order(a, b));
        assert_eq!(labels, vec!["9", "10", "a", "b"]);
    }
}
