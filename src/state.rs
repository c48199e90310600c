use std::path::Path;

use crate::config::AnalysisConfig;
use crate::data::loader;
use crate::data::model::Dataset;
use crate::pipeline::{self, Page, Report, Selections, Session, UPLOAD_PROMPT};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset and the user's selections.
    pub session: Session,

    pub config: AnalysisConfig,

    /// Page built from `session` (rebuilt after every change).
    pub page: Page,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            config: AnalysisConfig::default(),
            page: Page::AwaitingUpload {
                prompt: UPLOAD_PROMPT.to_string(),
            },
            status_message: None,
        }
    }
}

impl AppState {
    /// Replace the dataset, reset selections, and rebuild the page.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.session.selections = Selections::for_dataset(&dataset);
        self.session.dataset = Some(dataset);
        self.status_message = None;
        self.rerun();
    }

    /// Re-execute the whole pipeline for the current session.
    pub fn rerun(&mut self) {
        match pipeline::build_page(&self.session, &self.config) {
            Ok(page) => self.page = page,
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.page {
            Page::Report(report) => Some(report),
            Page::AwaitingUpload { .. } => None,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.session
            .dataset
            .as_ref()
            .map(Dataset::column_names)
            .unwrap_or_default()
    }

    /// Point the column inspector at `column`.
    pub fn select_column(&mut self, column: String) {
        if self.session.selections.column.as_deref() != Some(column.as_str()) {
            self.session.selections.column = Some(column);
            self.rerun();
        }
    }

    pub fn set_show_pairplot(&mut self, show: bool) {
        if self.session.selections.show_pairplot != show {
            self.session.selections.show_pairplot = show;
            self.rerun();
        }
    }

    pub fn set_show_outliers(&mut self, show: bool) {
        if self.session.selections.show_outliers != show {
            self.session.selections.show_outliers = show;
            self.rerun();
        }
    }

    /// Load a file from disk. On failure the previous dataset is kept and
    /// the error is shown in the status line.
    pub fn load_path(&mut self, path: &Path) {
        self.apply_load(loader::load_file(path));
    }

    /// Load an in-memory buffer (e.g. a dropped file without a path).
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        self.apply_load(loader::load_bytes(name, bytes));
    }

    fn apply_load(&mut self, result: anyhow::Result<Dataset>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} with {} rows and columns {:?}",
                    dataset.source,
                    dataset.row_count(),
                    dataset.column_names()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inspect::Inspection;

    fn loaded(text: &str) -> AppState {
        let mut state = AppState::default();
        state.load_bytes("test.csv", text.as_bytes());
        state
    }

    #[test]
    fn starts_awaiting_upload() {
        let state = AppState::default();
        assert!(state.report().is_none());
        assert!(state.column_names().is_empty());
    }

    #[test]
    fn loading_builds_report() {
        let state = loaded("n,c\n1,a\n2,b\n");
        let report = state.report().expect("report");
        assert_eq!(report.profile.overview.rows, 2);
        assert_eq!(state.column_names(), vec!["n", "c"]);
    }

    #[test]
    fn selection_change_reruns_inspector() {
        let mut state = loaded("n,c\n1,a\n2,b\n");
        state.select_column("c".to_string());
        let report = state.report().expect("report");
        assert!(matches!(report.inspection, Some(Inspection::Categorical(_))));

        state.set_show_outliers(true);
        assert!(state.report().and_then(|r| r.outliers.as_ref()).is_some());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded("n\n1\n");
        state.load_bytes("broken.csv", b"a,b\n1,2,3\n");
        assert!(state.status_message.is_some());
        assert_eq!(state.column_names(), vec!["n"]);
        assert!(state.report().is_some());
    }
}
