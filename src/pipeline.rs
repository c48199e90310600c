use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::data::inspect::{self, Inspection};
use crate::data::model::Dataset;
use crate::data::profile::{self, DatasetProfile};
use crate::data::relational::{self, CorrelationView, OutlierSummary, PairGrid};

/// Shown in place of the report until a file is loaded.
pub const UPLOAD_PROMPT: &str = "Please upload a CSV file to begin analysis.";

// ---------------------------------------------------------------------------
// Session context
// ---------------------------------------------------------------------------

/// What the user has chosen on the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    /// Column targeted by the column inspector.
    pub column: Option<String>,
    pub show_pairplot: bool,
    pub show_outliers: bool,
}

impl Selections {
    /// Default selections for a freshly loaded dataset: first column, toggles off.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            column: dataset.columns.first().map(|c| c.name.clone()),
            ..Self::default()
        }
    }
}

/// Everything the pipeline reads: the loaded table and the user's selections.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub dataset: Option<Dataset>,
    pub selections: Selections,
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub profile: DatasetProfile,
    pub correlation: CorrelationView,
    pub pairplot: Option<PairGrid>,
    pub inspection: Option<Inspection>,
    pub outliers: Option<OutlierSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Page {
    AwaitingUpload { prompt: String },
    Report(Report),
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run every stage for the current session and return the page to render.
///
/// Pure: the same session and config always produce the same page.
pub fn build_page(session: &Session, config: &AnalysisConfig) -> Result<Page, AnalysisError> {
    match &session.dataset {
        None => Ok(Page::AwaitingUpload {
            prompt: UPLOAD_PROMPT.to_string(),
        }),
        Some(dataset) => Ok(Page::Report(analyze(dataset, &session.selections, config)?)),
    }
}

pub fn analyze(
    dataset: &Dataset,
    selections: &Selections,
    config: &AnalysisConfig,
) -> Result<Report, AnalysisError> {
    let started = Instant::now();

    let inspection = match &selections.column {
        Some(name) => {
            let column = dataset
                .column(name)
                .ok_or_else(|| AnalysisError::ColumnNotFound(name.clone()))?;
            Some(inspect::inspect_column(column, config))
        }
        None => None,
    };

    let profile = profile::profile_dataset(dataset, config.preview_rows);
    let correlation = relational::correlation_view(dataset);
    let pairplot = selections
        .show_pairplot
        .then(|| relational::pair_grid(dataset, config.histogram_bins))
        .flatten();
    let outliers = selections
        .show_outliers
        .then(|| relational::count_outliers(dataset, config.zscore_threshold));

    log::debug!(
        "analysed {} ({} rows × {} columns) in {:?}",
        dataset.source,
        dataset.row_count(),
        dataset.column_count(),
        started.elapsed()
    );

    Ok(Report {
        profile,
        correlation,
        pairplot,
        inspection,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    fn session(text: &str) -> Session {
        let dataset = parse_csv("test.csv", text.as_bytes(), b',').expect("valid csv");
        Session {
            selections: Selections::for_dataset(&dataset),
            dataset: Some(dataset),
        }
    }

    fn report(page: Page) -> Report {
        match page {
            Page::Report(r) => r,
            Page::AwaitingUpload { .. } => panic!("expected a report"),
        }
    }

    #[test]
    fn no_dataset_shows_prompt() {
        let page = build_page(&Session::default(), &AnalysisConfig::default()).expect("page");
        assert_eq!(
            page,
            Page::AwaitingUpload {
                prompt: UPLOAD_PROMPT.to_string()
            }
        );
    }

    #[test]
    fn default_selection_is_first_column() {
        let s = session("age,city\n30,Lyon\n41,Oslo\n");
        assert_eq!(s.selections.column.as_deref(), Some("age"));
        let r = report(build_page(&s, &AnalysisConfig::default()).expect("page"));
        assert!(matches!(r.inspection, Some(Inspection::Numeric(_))));
        assert!(r.pairplot.is_none());
        assert!(r.outliers.is_none());
    }

    #[test]
    fn toggles_enable_optional_sections() {
        let mut s = session("a,b\n1,2\n2,4\n3,7\n");
        s.selections.show_pairplot = true;
        s.selections.show_outliers = true;
        let r = report(build_page(&s, &AnalysisConfig::default()).expect("page"));
        assert_eq!(r.pairplot.map(|g| g.columns.len()), Some(2));
        assert_eq!(r.outliers.map(|o| o.total), Some(0));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let mut s = session("a\n1\n");
        s.selections.column = Some("missing".into());
        assert_eq!(
            build_page(&s, &AnalysisConfig::default()),
            Err(AnalysisError::ColumnNotFound("missing".into()))
        );
    }

    #[test]
    fn text_only_dataset_reports_without_heatmap() {
        let s = session("city\nLyon\nLyon\nOslo\n");
        let r = report(build_page(&s, &AnalysisConfig::default()).expect("page"));
        assert!(matches!(
            r.correlation,
            CorrelationView::NoNumericColumns { .. }
        ));
        assert_eq!(r.profile.duplicate_rows, 1);
        assert!(matches!(r.inspection, Some(Inspection::Categorical(_))));
    }

    #[test]
    fn report_serializes_to_json() {
        let s = session("a,b\n1,x\n2,y\n");
        let r = report(build_page(&s, &AnalysisConfig::default()).expect("page"));
        let json = serde_json::to_value(&r).expect("serializable");
        assert_eq!(json["profile"]["overview"]["rows"], 2);
    }
}
