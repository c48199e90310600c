use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::pipeline::Report;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_report = state.report().is_some();
            if ui
                .add_enabled(has_report, egui::Button::new("Export report…"))
                .clicked()
            {
                export_report_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.session.dataset {
            ui.label(format!(
                "{}: {} rows × {} columns",
                ds.source,
                ds.row_count(),
                ds.column_count()
            ));
        } else {
            ui.label("Drop a file here or use File → Open…");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open data file")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_report_dialog(state: &mut AppState) {
    let Some(report) = state.report() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export report")
        .set_file_name("report.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match export_report(report, &path) {
            Ok(()) => {
                log::info!("Exported report to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export report: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Write `report` as pretty-printed JSON.
pub fn export_report(report: &Report, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report).context("writing report JSON")?;
    Ok(())
}
