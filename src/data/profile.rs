use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::model::{Column, ColumnKind, Dataset, Value};
use u_numflow::stats;

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnType {
    pub name: String,
    pub kind: ColumnKind,
}

/// First rows of the table rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub source: String,
    pub rows: usize,
    pub columns: usize,
    pub dtypes: Vec<ColumnType>,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    pub column: String,
    pub null_count: usize,
    /// Percentage of rows that are null, rounded to 2 decimals.
    pub null_pct: f64,
}

/// count / mean / std / min / quartiles / max of a numeric column.
/// Every statistic but `count` is `None` when undefined for the sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// count / unique / top / freq of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Summary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub overview: Overview,
    pub missing: Vec<MissingEntry>,
    pub duplicate_rows: usize,
    pub describe: Vec<ColumnSummary>,
}

// ---------------------------------------------------------------------------
// Profiling
// ---------------------------------------------------------------------------

/// Profile the whole dataset. Pure function of `dataset`.
pub fn profile_dataset(dataset: &Dataset, preview_rows: usize) -> DatasetProfile {
    let (rows, columns) = dataset.shape();

    let dtypes = dataset
        .columns
        .iter()
        .map(|c| ColumnType {
            name: c.name.clone(),
            kind: c.kind(),
        })
        .collect();

    let overview = Overview {
        source: dataset.source.clone(),
        rows,
        columns,
        dtypes,
        preview: preview(dataset, preview_rows),
    };

    let missing = dataset
        .columns
        .iter()
        .map(|c| {
            let null_count = c.null_count();
            MissingEntry {
                column: c.name.clone(),
                null_count,
                null_pct: null_percentage(null_count, rows),
            }
        })
        .collect();

    let describe = dataset.columns.iter().map(summarize_column).collect();

    DatasetProfile {
        overview,
        missing,
        duplicate_rows: count_duplicate_rows(dataset),
        describe,
    }
}

pub fn preview(dataset: &Dataset, n: usize) -> Preview {
    Preview {
        headers: dataset.column_names(),
        rows: (0..dataset.row_count().min(n))
            .map(|row| dataset.row(row).iter().map(Value::to_string).collect())
            .collect(),
    }
}

/// `100 × nulls / rows`, rounded to 2 decimals; 0 for an empty table.
pub fn null_percentage(null_count: usize, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    round2(100.0 * null_count as f64 / rows as f64)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A row is a duplicate when an earlier row holds identical values in every
/// column (nulls included). First occurrences are not counted.
pub fn count_duplicate_rows(dataset: &Dataset) -> usize {
    let n = dataset.row_count();
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(n);
    (0..n).filter(|&row| !seen.insert(dataset.row(row))).count()
}

pub fn summarize_column(column: &Column) -> ColumnSummary {
    let summary = if column.kind().is_numeric() {
        Summary::Numeric(summarize_numeric(&column.numeric_values()))
    } else {
        Summary::Categorical(summarize_categorical(column))
    };
    ColumnSummary {
        column: column.name.clone(),
        summary,
    }
}

pub fn summarize_numeric(values: &[f64]) -> NumericSummary {
    NumericSummary {
        count: values.len(),
        mean: stats::mean(values),
        std: stats::std_dev(values),
        min: stats::min(values),
        q1: stats::quantile(values, 0.25),
        median: stats::median(values),
        q3: stats::quantile(values, 0.75),
        max: stats::max(values),
    }
}

pub fn summarize_categorical(column: &Column) -> CategoricalSummary {
    let counts = value_counts(column);
    let (top, freq) = counts
        .first()
        .map(|(v, n)| (Some(v.to_string()), Some(*n)))
        .unwrap_or((None, None));
    CategoricalSummary {
        count: column.len() - column.null_count(),
        unique: counts.len(),
        top,
        freq,
    }
}

/// Non-null values with their frequencies, most frequent first.
/// Ties keep the order of first appearance.
pub fn value_counts(column: &Column) -> Vec<(Value, usize)> {
    let mut counts: HashMap<Value, (usize, usize)> = HashMap::new();
    for row in 0..column.len() {
        let value = column.value(row);
        if value.is_null() {
            continue;
        }
        counts.entry(value).or_insert((0, row)).0 += 1;
    }
    let mut entries: Vec<(Value, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries.into_iter().map(|(v, count, _)| (v, count)).collect()
}

// ---------------------------------------------------------------------------
// describe() table layout
// ---------------------------------------------------------------------------

const NUMERIC_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const CATEGORICAL_STATS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Lay summaries out as `describe(include="all")` does: one row per
/// statistic, one cell per column, `NaN` where a statistic does not apply.
/// Only statistic rows relevant to at least one column are emitted.
pub fn describe_rows(summaries: &[ColumnSummary]) -> Vec<(&'static str, Vec<String>)> {
    let any_categorical = summaries
        .iter()
        .any(|s| matches!(s.summary, Summary::Categorical(_)));
    let any_numeric = summaries
        .iter()
        .any(|s| matches!(s.summary, Summary::Numeric(_)));

    let mut labels: Vec<&'static str> = vec!["count"];
    if any_categorical {
        labels.extend(&CATEGORICAL_STATS[1..]);
    }
    if any_numeric {
        labels.extend(&NUMERIC_STATS[1..]);
    }

    labels
        .into_iter()
        .map(|label| {
            let cells = summaries
                .iter()
                .map(|s| describe_cell(&s.summary, label).unwrap_or_else(|| "NaN".to_string()))
                .collect();
            (label, cells)
        })
        .collect()
}

fn describe_cell(summary: &Summary, label: &str) -> Option<String> {
    let float = |v: Option<f64>| v.map(|x| format!("{x:.4}"));
    match summary {
        Summary::Numeric(n) => match label {
            "count" => Some(n.count.to_string()),
            "mean" => float(n.mean),
            "std" => float(n.std),
            "min" => float(n.min),
            "25%" => float(n.q1),
            "50%" => float(n.median),
            "75%" => float(n.q3),
            "max" => float(n.max),
            _ => None,
        },
        Summary::Categorical(c) => match label {
            "count" => Some(c.count.to_string()),
            "unique" => Some(c.unique.to_string()),
            "top" => c.top.clone(),
            "freq" => c.freq.map(|f| f.to_string()),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    fn parse(text: &str) -> Dataset {
        parse_csv("test.csv", text.as_bytes(), b',').expect("valid csv")
    }

    #[test]
    fn shape_matches_rows_and_columns() {
        let ds = parse("a,b,c\n1,x,2.5\n2,y,3.5\n3,z,\n");
        let profile = profile_dataset(&ds, 5);
        assert_eq!(profile.overview.rows, 3);
        assert_eq!(profile.overview.columns, 3);
        assert_eq!(profile.overview.dtypes[2].kind, ColumnKind::Float);
    }

    #[test]
    fn missing_values_with_duplicate_header() {
        let ds = parse("age,city,age\n30,Lyon,1\n40,Oslo,\n50,Rome,3\n");
        let profile = profile_dataset(&ds, 5);

        let age = &profile.missing[2];
        assert_eq!(age.column, "age.1");
        assert_eq!(age.null_count, 1);
        assert!((age.null_pct - 33.33).abs() < 1e-9);

        let city = &profile.missing[1];
        assert_eq!(city.null_count, 0);
        assert_eq!(city.null_pct, 0.0);
    }

    #[test]
    fn null_percentage_rounds_to_two_decimals() {
        assert_eq!(null_percentage(1, 3), 33.33);
        assert_eq!(null_percentage(2, 3), 66.67);
        assert_eq!(null_percentage(0, 0), 0.0);
        assert_eq!(null_percentage(7, 7), 100.0);
    }

    #[test]
    fn duplicates_count_repeats_only() {
        let ds = parse("a,b\n1,x\n1,x\n2,\n2,\n1,x\n3,y\n");
        assert_eq!(count_duplicate_rows(&ds), 3);
        assert_eq!(count_duplicate_rows(&parse("a\n")), 0);
        assert_eq!(count_duplicate_rows(&parse("a\n0.5\n-0.0\n0.0\n")), 1);
    }

    #[test]
    fn numeric_summary_matches_describe() {
        let s = summarize_numeric(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(2.5));
        assert!((s.std.unwrap() - 1.290_994_448_7).abs() < 1e-9);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.q1, Some(1.75));
        assert_eq!(s.median, Some(2.5));
        assert_eq!(s.q3, Some(3.25));
        assert_eq!(s.max, Some(4.0));

        let single = summarize_numeric(&[7.0]);
        assert_eq!(single.std, None);
        assert_eq!(summarize_numeric(&[]).mean, None);
    }

    #[test]
    fn value_counts_descending_with_first_seen_ties() {
        let ds = parse("c\nb\na\na\nc\nb\n\n");
        let col = ds.column("c").expect("column c");
        let counts: Vec<(String, usize)> = value_counts(col)
            .into_iter()
            .map(|(v, n)| (v.to_string(), n))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[test]
    fn categorical_summary_reports_top() {
        let ds = parse("c\na\na\nb\n");
        let s = summarize_categorical(ds.column("c").expect("column c"));
        assert_eq!(s.count, 3);
        assert_eq!(s.unique, 2);
        assert_eq!(s.top.as_deref(), Some("a"));
        assert_eq!(s.freq, Some(2));
    }

    #[test]
    fn describe_rows_mix_numeric_and_categorical() {
        let ds = parse("n,c\n1,a\n3,a\n");
        let profile = profile_dataset(&ds, 5);
        let rows = describe_rows(&profile.describe);
        let labels: Vec<&str> = rows.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        let top = &rows[2].1;
        assert_eq!(top, &vec!["NaN".to_string(), "a".to_string()]);
        let mean = &rows[4].1;
        assert_eq!(mean, &vec!["2.0000".to_string(), "NaN".to_string()]);
    }

    #[test]
    fn preview_is_capped() {
        let ds = parse("a\n1\n2\n3\n4\n5\n6\n7\n");
        let p = preview(&ds, 5);
        assert_eq!(p.rows.len(), 5);
        assert_eq!(p.rows[0], vec!["1".to_string()]);
    }
}
