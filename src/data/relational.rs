use serde::Serialize;

use super::model::{Column, Dataset};
use super::stats::{self, Histogram};

/// Shown instead of the heatmap when the numeric subset is empty.
pub const NO_NUMERIC_MESSAGE: &str = "No numeric columns available for correlation heatmap.";

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric matrix of pairwise Pearson coefficients over the numeric subset.
/// `None` marks a coefficient that is undefined (zero variance, or fewer
/// than two complete pairs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CorrelationView {
    /// The dataset has no numeric columns; nothing was computed.
    NoNumericColumns { message: String },
    Heatmap(CorrelationMatrix),
}

pub fn correlation_view(dataset: &Dataset) -> CorrelationView {
    let numeric: Vec<&Column> = dataset.numeric_columns().collect();
    if numeric.is_empty() {
        log::debug!("correlation skipped: no numeric columns");
        return CorrelationView::NoNumericColumns {
            message: NO_NUMERIC_MESSAGE.to_string(),
        };
    }
    CorrelationView::Heatmap(correlation_matrix(&numeric))
}

/// Pairwise-complete Pearson matrix of the given numeric columns.
pub fn correlation_matrix(columns: &[&Column]) -> CorrelationMatrix {
    let cells: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| c.numeric_cells().unwrap_or_default())
        .collect();
    let n = cells.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        values[i][i] = stats::pearson(&cells[i], &cells[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = stats::pearson(&cells[i], &cells[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Pairplot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PairCell {
    /// Diagonal: distribution of the column itself.
    Histogram(Histogram),
    /// Off-diagonal: `[x, y]` points for rows where both cells are present.
    Scatter(Vec<[f64; 2]>),
    /// Diagonal of a column with no values.
    Empty,
}

/// `cells[row][col]` plots the row column on y against the col column on x.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairGrid {
    pub columns: Vec<String>,
    pub cells: Vec<Vec<PairCell>>,
}

/// Build the scatter grid over every pair of numeric columns.
/// `None` when the numeric subset is empty. Cost is quadratic in the
/// number of numeric columns.
pub fn pair_grid(dataset: &Dataset, bins: usize) -> Option<PairGrid> {
    let numeric: Vec<&Column> = dataset.numeric_columns().collect();
    if numeric.is_empty() {
        return None;
    }
    let cells: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|c| c.numeric_cells().unwrap_or_default())
        .collect();

    let grid = (0..cells.len())
        .map(|row| {
            (0..cells.len())
                .map(|col| {
                    if row == col {
                        let values: Vec<f64> = cells[col].iter().flatten().copied().collect();
                        stats::histogram(&values, bins)
                            .map_or(PairCell::Empty, PairCell::Histogram)
                    } else {
                        let points = cells[col]
                            .iter()
                            .zip(&cells[row])
                            .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
                            .collect();
                        PairCell::Scatter(points)
                    }
                })
                .collect()
        })
        .collect();

    Some(PairGrid {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        cells: grid,
    })
}

// ---------------------------------------------------------------------------
// Z-score outliers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierSummary {
    pub threshold: f64,
    /// Cells with |z| above the threshold, summed over all numeric columns.
    pub total: usize,
}

impl OutlierSummary {
    pub fn message(&self) -> String {
        format!(
            "Total outliers detected (|z| > {}): {}",
            self.threshold, self.total
        )
    }
}

/// Count cells whose z-score magnitude exceeds `threshold`, across the whole
/// numeric subset. z uses each column's mean and population std over its
/// non-null values; zero-variance columns contribute nothing.
pub fn count_outliers(dataset: &Dataset, threshold: f64) -> OutlierSummary {
    let total = dataset
        .numeric_columns()
        .map(|c| column_outliers(&c.numeric_values(), threshold))
        .sum();
    OutlierSummary { threshold, total }
}

fn column_outliers(values: &[f64], threshold: f64) -> usize {
    let (Some(mean), Some(variance)) = (
        u_numflow::stats::mean(values),
        u_numflow::stats::variance(values),
    ) else {
        return 0;
    };
    // Population std, from the sample variance.
    let n = values.len() as f64;
    let std = (variance * (n - 1.0) / n).sqrt();
    if std < 1e-15 {
        return 0;
    }
    values
        .iter()
        .filter(|&&v| ((v - mean) / std).abs() > threshold)
        .count()
}
