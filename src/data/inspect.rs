use serde::Serialize;

use super::model::{Column, ColumnKind};
use super::profile::{self, NumericSummary};
use super::stats::{self, Histogram};
use crate::config::AnalysisConfig;

// ---------------------------------------------------------------------------
// Inspection results
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers (1.5 × IQR).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values beyond the whiskers.
    pub fliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericInspection {
    pub column: String,
    pub title: String,
    pub summary: NumericSummary,
    pub histogram: Option<Histogram>,
    /// KDE curve scaled to histogram counts, as `[x, count]` points.
    pub kde: Vec<[f64; 2]>,
    pub boxplot: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalInspection {
    pub column: String,
    pub title: String,
    /// Most frequent first.
    pub frequencies: Vec<Frequency>,
    pub label_rotation_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inspection {
    Numeric(NumericInspection),
    Categorical(CategoricalInspection),
}

// ---------------------------------------------------------------------------
// Inspector
// ---------------------------------------------------------------------------

/// Analyse one column, branching on its kind.
pub fn inspect_column(column: &Column, config: &AnalysisConfig) -> Inspection {
    match column.kind() {
        ColumnKind::Integer | ColumnKind::Float => {
            Inspection::Numeric(inspect_numeric(column, config))
        }
        ColumnKind::Boolean | ColumnKind::Text => {
            Inspection::Categorical(inspect_categorical(column, config))
        }
    }
}

fn inspect_numeric(column: &Column, config: &AnalysisConfig) -> NumericInspection {
    let values = column.numeric_values();
    let histogram = stats::histogram(&values, config.histogram_bins);

    // Scale the density so its area matches the histogram's total count.
    let kde = match (&histogram, stats::gaussian_kde(&values, config.kde_points)) {
        (Some(hist), Some(curve)) => {
            let scale = values.len() as f64 * hist.bin_width();
            curve.into_iter().map(|(x, d)| [x, d * scale]).collect()
        }
        _ => Vec::new(),
    };

    NumericInspection {
        column: column.name.clone(),
        title: format!("Distribution of {}", column.name),
        summary: profile::summarize_numeric(&values),
        histogram,
        kde,
        boxplot: box_stats(&values),
    }
}

fn inspect_categorical(column: &Column, config: &AnalysisConfig) -> CategoricalInspection {
    let frequencies = profile::value_counts(column)
        .into_iter()
        .map(|(value, count)| Frequency {
            value: value.to_string(),
            count,
        })
        .collect();

    CategoricalInspection {
        column: column.name.clone(),
        title: format!("Count plot of {}", column.name),
        frequencies,
        label_rotation_deg: config.label_rotation_deg,
    }
}

/// Box-and-whisker statistics. Whiskers reach the most extreme values
/// still within 1.5 × IQR of the quartiles.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let q1 = u_numflow::stats::quantile(values, 0.25)?;
    let median = u_numflow::stats::median(values)?;
    let q3 = u_numflow::stats::quantile(values, 0.75)?;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = || sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let fliers = sorted
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        fliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;
    use crate::data::model::Dataset;

    fn parse(text: &str) -> Dataset {
        parse_csv("test.csv", text.as_bytes(), b',').expect("valid csv")
    }

    #[test]
    fn categorical_frequencies_descend() {
        let ds = parse("c\na\na\nb\n");
        let col = ds.column("c").expect("column c");
        match inspect_column(col, &AnalysisConfig::default()) {
            Inspection::Categorical(cat) => {
                assert_eq!(cat.title, "Count plot of c");
                assert_eq!(
                    cat.frequencies,
                    vec![
                        Frequency {
                            value: "a".into(),
                            count: 2
                        },
                        Frequency {
                            value: "b".into(),
                            count: 1
                        },
                    ]
                );
                assert_eq!(cat.label_rotation_deg, 45.0);
            }
            Inspection::Numeric(_) => panic!("expected categorical"),
        }
    }

    #[test]
    fn boolean_columns_are_categorical() {
        let ds = parse("b\ntrue\nfalse\ntrue\n");
        let col = ds.column("b").expect("column b");
        assert!(matches!(
            inspect_column(col, &AnalysisConfig::default()),
            Inspection::Categorical(_)
        ));
    }

    #[test]
    fn numeric_inspection_has_twenty_bins_and_kde() {
        let text: String = std::iter::once("v\n".to_string())
            .chain((0..50).map(|i| format!("{}\n", (i * 7) % 23)))
            .collect();
        let ds = parse(&text);
        let col = ds.column("v").expect("column v");
        match inspect_column(col, &AnalysisConfig::default()) {
            Inspection::Numeric(num) => {
                assert_eq!(num.title, "Distribution of v");
                let hist = num.histogram.expect("histogram");
                assert_eq!(hist.counts.len(), 20);
                assert_eq!(hist.counts.iter().sum::<usize>(), 50);
                assert_eq!(num.kde.len(), 200);
                assert_eq!(num.summary.count, 50);
                assert!(num.boxplot.is_some());
            }
            Inspection::Categorical(_) => panic!("expected numeric"),
        }
    }

    #[test]
    fn single_value_column_renders_without_kde() {
        let ds = parse("v\n4\n");
        let col = ds.column("v").expect("column v");
        match inspect_column(col, &AnalysisConfig::default()) {
            Inspection::Numeric(num) => {
                assert!(num.kde.is_empty());
                assert_eq!(num.histogram.map(|h| h.counts.iter().sum::<usize>()), Some(1));
                let b = num.boxplot.expect("box");
                assert_eq!((b.lower_whisker, b.upper_whisker), (4.0, 4.0));
            }
            Inspection::Categorical(_) => panic!("expected numeric"),
        }
    }

    #[test]
    fn box_stats_separates_fliers() {
        let b = box_stats(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).expect("box");
        assert_eq!(b.q1, 2.25);
        assert_eq!(b.q3, 4.75);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 5.0);
        assert_eq!(b.fliers, vec![100.0]);
        assert!(box_stats(&[]).is_none());
    }
}
