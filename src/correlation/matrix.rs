use std::collections::HashSet;

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::io::table::NumericTable;
use crate::math::pearson::pearson_pairwise;
use crate::schema::v1::CorrelationMatrixPayload;

#[derive(Debug, Clone)]
pub struct NamedColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Every column except `exclude`, coerced to numbers, in header order.
pub fn numeric_columns(table: &NumericTable, exclude: &HashSet<String>) -> Vec<NamedColumn> {
    table
        .headers()
        .iter()
        .filter(|h| !h.is_empty() && !exclude.contains(h.as_str()))
        .filter_map(|h| {
            table.numeric_column(h).map(|values| NamedColumn {
                name: h.clone(),
                values,
            })
        })
        .collect()
}

pub fn build_from_table(table: &NumericTable, exclude: &HashSet<String>) -> CorrelationMatrixPayload {
    build_correlation_matrix(&numeric_columns(table, exclude))
}

pub fn build_correlation_matrix(columns: &[NamedColumn]) -> CorrelationMatrixPayload {
    let n = columns.len();
    let labels: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let mut matrix = vec![vec![0.0f64; n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    #[cfg(feature = "mt")]
    let values: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| pearson_pairwise(&columns[i].values, &columns[j].values))
        .collect();
    #[cfg(not(feature = "mt"))]
    let values: Vec<f64> = pairs
        .iter()
        .map(|&(i, j)| pearson_pairwise(&columns[i].values, &columns[j].values))
        .collect();

    for (&(i, j), &r) in pairs.iter().zip(values.iter()) {
        matrix[i][j] = r;
        matrix[j][i] = r;
    }

    canonicalize(CorrelationMatrixPayload {
        labels,
        matrix,
        min: 0.0,
        max: 1.0,
    })
}

/// Sorts labels lexicographically, permutes rows and columns to match, and
/// recomputes the off-diagonal extrema.
pub fn canonicalize(payload: CorrelationMatrixPayload) -> CorrelationMatrixPayload {
    let n = payload.labels.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| payload.labels[a].cmp(&payload.labels[b]));

    let labels: Vec<String> = order.iter().map(|&i| payload.labels[i].clone()).collect();
    let matrix: Vec<Vec<f64>> = order
        .iter()
        .map(|&i| order.iter().map(|&j| payload.matrix[i][j]).collect())
        .collect();
    let (min, max) = off_diagonal_extrema(&matrix);

    CorrelationMatrixPayload {
        labels,
        matrix,
        min,
        max,
    }
}

/// (min, max) over off-diagonal cells; (0, 1) with fewer than two labels.
pub fn off_diagonal_extrema(matrix: &[Vec<f64>]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (i, row) in matrix.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if i != j {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if min.is_finite() && max.is_finite() {
        (min, max)
    } else {
        (0.0, 1.0)
    }
}
