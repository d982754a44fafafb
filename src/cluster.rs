// 1-D k-means clustering of a single table column

use crate::data::{Column, ColumnData, Table};
use anyhow::{anyhow, bail, Context, Result};
use linfa::prelude::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;

/// Name of the derived label column
pub const CLUSTER_COLUMN: &str = "Cluster";

/// Cluster the non-missing values of `variable` into `k` groups.
///
/// Labels are renumbered so that cluster 0 has the smallest centroid, which
/// keeps them stable across runs. Rows with a missing value get `None`.
pub fn cluster(table: &Table, variable: &str, k: usize) -> Result<Vec<Option<usize>>> {
    if k < 2 {
        bail!("Clustering needs at least 2 clusters, got {}", k);
    }
    let values = table
        .numeric(variable)
        .ok_or_else(|| anyhow!("Column '{}' is missing or not numeric", variable))?;

    let present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (row, v)))
        .collect();

    let mut distinct: Vec<f64> = present.iter().map(|(_, v)| *v).collect();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    if distinct.len() < k {
        bail!(
            "Column '{}' has {} distinct values, fewer than {} clusters",
            variable,
            distinct.len(),
            k
        );
    }

    let records = Array2::from_shape_vec(
        (present.len(), 1),
        present.iter().map(|(_, v)| *v).collect(),
    )
    .context("Failed to shape clustering input")?;
    let ds = DatasetBase::from(records);

    let model = KMeans::params(k)
        .fit(&ds)
        .map_err(|e| anyhow!("KMeans fit failed: {:?}", e))?;

    // old label -> rank of its centroid
    let centroids = model.centroids();
    let mut order: Vec<usize> = (0..centroids.nrows()).collect();
    order.sort_by(|&a, &b| centroids[[a, 0]].total_cmp(&centroids[[b, 0]]));
    let mut rank = vec![0usize; order.len()];
    for (new, &old) in order.iter().enumerate() {
        rank[old] = new;
    }

    let pred = model.predict(ds);
    let mut labels = vec![None; table.n_rows()];
    for ((row, _), label) in present.iter().zip(pred.targets.iter()) {
        labels[*row] = Some(rank[*label]);
    }

    log::debug!(
        "Clustered {} values of '{}' into {} groups",
        present.len(),
        variable,
        k
    );
    Ok(labels)
}

/// Labels as a text column, suitable for colour grouping
pub fn label_column(labels: &[Option<usize>]) -> Column {
    Column::new(
        CLUSTER_COLUMN,
        ColumnData::Text(labels.iter().map(|l| l.map(|l| l.to_string())).collect()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table() -> Table {
        Table::new(vec![
            Column::new(
                "v",
                ColumnData::Float(vec![
                    Some(10.0),
                    Some(1.0),
                    None,
                    Some(1.2),
                    Some(10.1),
                    Some(1.1),
                    Some(10.2),
                ]),
            ),
            Column::new("g", ColumnData::Text(vec![Some("a".into()); 7])),
        ])
        .unwrap()
    }

    #[test]
    fn test_two_clusters_ordered_by_centroid() {
        let table = make_table();
        let labels = cluster(&table, "v", 2).unwrap();
        assert_eq!(
            labels,
            vec![Some(1), Some(0), None, Some(0), Some(1), Some(0), Some(1)]
        );
    }

    #[test]
    fn test_rejects_small_k() {
        assert!(cluster(&make_table(), "v", 1).is_err());
    }

    #[test]
    fn test_rejects_text_and_unknown() {
        assert!(cluster(&make_table(), "g", 2).is_err());
        assert!(cluster(&make_table(), "nope", 2).is_err());
    }

    #[test]
    fn test_rejects_too_few_values() {
        assert!(cluster(&make_table(), "v", 7).is_err());
    }

    #[test]
    fn test_label_column() {
        let col = label_column(&[Some(0), None, Some(1)]);
        assert_eq!(col.name, CLUSTER_COLUMN);
        assert_eq!(
            col.data,
            ColumnData::Text(vec![Some("0".into()), None, Some("1".into())])
        );
    }
}
