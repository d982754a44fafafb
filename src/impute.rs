// K-nearest-neighbour imputation of missing float cells

use crate::data::{Column, ColumnData, DType, Table};
use anyhow::{anyhow, bail, Result};
use linfa_nn::distance::L2Dist;
use linfa_nn::{CommonNearestNeighbour, NearestNeighbour};
use ndarray::{Array2, Axis};

/// Fill missing cells of every float column with the mean of that column
/// over the `neighbors` nearest rows that have a value.
///
/// Distances are euclidean over the other float columns, with their missing
/// cells standing in as the column mean. Int and text columns are left as
/// they are. A column with no other float column to measure against is
/// filled with its mean.
pub fn knn_impute(table: &Table, neighbors: usize) -> Result<Table> {
    if neighbors == 0 {
        bail!("Imputation needs at least one neighbour");
    }
    let names = table.columns_of_type(DType::Float);
    if names.is_empty() {
        return Ok(table.clone());
    }

    let columns: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| {
            table
                .numeric(name)
                .ok_or_else(|| anyhow!("Column '{}' is not numeric", name))
        })
        .collect::<Result<_>>()?;
    let means: Vec<f64> = columns.iter().map(|c| mean(c.iter().flatten().copied())).collect();
    let features = Array2::from_shape_fn((table.n_rows(), names.len()), |(r, j)| {
        columns[j][r].unwrap_or(means[j])
    });

    let mut filled = 0usize;
    let mut result = table.clone();
    for (j, (name, values)) in names.iter().zip(columns.iter()).enumerate() {
        let (donors, targets): (Vec<usize>, Vec<usize>) =
            (0..values.len()).partition(|&r| values[r].is_some());
        if targets.is_empty() || donors.is_empty() {
            continue;
        }

        let others: Vec<usize> = (0..names.len()).filter(|&c| c != j).collect();
        let mut imputed = values.clone();
        if others.is_empty() {
            for &r in &targets {
                imputed[r] = Some(means[j]);
            }
        } else {
            let space = features.select(Axis(1), &others);
            let donor_points = space.select(Axis(0), &donors);
            let index = CommonNearestNeighbour::KdTree
                .from_batch(&donor_points, L2Dist)
                .map_err(|e| anyhow!("Failed to index '{}': {:?}", name, e))?;
            let k = neighbors.min(donors.len());
            for &r in &targets {
                let nearest = index
                    .k_nearest(space.row(r), k)
                    .map_err(|e| anyhow!("Neighbour search failed for '{}': {:?}", name, e))?;
                imputed[r] = Some(mean(nearest.iter().filter_map(|(_, i)| values[donors[*i]])));
            }
        }

        filled += targets.len();
        result = result.with_column(Column::new(name.clone(), ColumnData::Float(imputed)))?;
    }

    log::info!("Imputed {} missing float cells ({} neighbours)", filled, neighbors);
    Ok(result)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
