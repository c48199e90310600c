use eframe::egui::{self, Color32, RichText, ScrollArea, Ui, vec2};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::config::AnalysisConfig;
use crate::data::inspect::Inspection;
use crate::data::profile::{self, NumericSummary};
use crate::data::relational::CorrelationView;
use crate::pipeline::{Page, Report};
use crate::state::AppState;
use crate::ui::plot;

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 30);
const INFO_COLOR: Color32 = Color32::from_rgb(90, 150, 230);

/// Selection changes made while drawing; applied after the frame's report
/// borrow ends.
struct Changes {
    column: Option<String>,
    show_pairplot: bool,
    show_outliers: bool,
}

// ---------------------------------------------------------------------------
// Central panel – the report page
// ---------------------------------------------------------------------------

/// Render the whole page for the current state, top to bottom.
pub fn report_page(ui: &mut Ui, state: &mut AppState) {
    let columns = state.column_names();
    let selections = state.session.selections.clone();
    let mut changes = Changes {
        column: selections.column.clone(),
        show_pairplot: selections.show_pairplot,
        show_outliers: selections.show_outliers,
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Exploratory Data Analysis");
            ui.add_space(6.0);

            match &state.page {
                Page::AwaitingUpload { prompt } => {
                    banner(ui, WARNING_COLOR, "⚠", prompt);
                }
                Page::Report(report) => {
                    report_sections(ui, report, &state.config, &columns, &mut changes);
                }
            }
        });

    if let Some(column) = changes.column {
        if selections.column.as_deref() != Some(column.as_str()) {
            state.select_column(column);
        }
    }
    state.set_show_pairplot(changes.show_pairplot);
    state.set_show_outliers(changes.show_outliers);
}

fn report_sections(
    ui: &mut Ui,
    report: &Report,
    config: &AnalysisConfig,
    columns: &[String],
    changes: &mut Changes,
) {
    let profile = &report.profile;
    let overview = &profile.overview;

    section(ui, "🔍 Dataset Preview");
    ui.label(format!(
        "Shape of dataset: ({}, {})",
        overview.rows, overview.columns
    ));
    let dtype_rows: Vec<Vec<String>> = overview
        .dtypes
        .iter()
        .map(|d| vec![d.name.clone(), d.kind.dtype_label().to_string()])
        .collect();
    text_table(ui, "dtypes", &["column".into(), "dtype".into()], &dtype_rows);
    ui.add_space(6.0);

    let mut headers = vec![String::new()];
    headers.extend(overview.preview.headers.iter().cloned());
    let preview_rows: Vec<Vec<String>> = overview
        .preview
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| std::iter::once(i.to_string()).chain(row.iter().cloned()).collect())
        .collect();
    text_table(ui, "preview", &headers, &preview_rows);

    section(ui, "🧹 Missing Values");
    let missing_rows: Vec<Vec<String>> = profile
        .missing
        .iter()
        .map(|m| {
            vec![
                m.column.clone(),
                m.null_count.to_string(),
                format!("{:.2}", m.null_pct),
            ]
        })
        .collect();
    text_table(
        ui,
        "missing",
        &["column".into(), "missing".into(), "% missing".into()],
        &missing_rows,
    );
    ui.add_space(4.0);
    ui.label(format!("Duplicate rows: {}", profile.duplicate_rows));

    section(ui, "📈 Summary Statistics");
    let mut describe_headers = vec![String::new()];
    describe_headers.extend(profile.describe.iter().map(|s| s.column.clone()));
    let describe_rows: Vec<Vec<String>> = profile::describe_rows(&profile.describe)
        .into_iter()
        .map(|(label, cells)| std::iter::once(label.to_string()).chain(cells).collect())
        .collect();
    text_table(ui, "describe", &describe_headers, &describe_rows);

    section(ui, "🔥 Correlation Heatmap");
    match &report.correlation {
        CorrelationView::NoNumericColumns { message } => banner(ui, INFO_COLOR, "ℹ", message),
        CorrelationView::Heatmap(matrix) => {
            let size = inches(config.heatmap_size);
            plot::correlation_heatmap(ui, matrix, size, config.label_rotation_deg);
        }
    }

    ui.add_space(6.0);
    ui.checkbox(
        &mut changes.show_pairplot,
        "Show Pairplot (may be slow for large data)",
    );
    if let Some(grid) = &report.pairplot {
        plot::pairplot(ui, grid);
    }

    section(ui, "📊 Column-wise Analysis");
    let mut selected = changes.column.clone().unwrap_or_default();
    egui::ComboBox::from_label("Select a column to analyze")
        .selected_text(&selected)
        .show_ui(ui, |ui: &mut Ui| {
            for name in columns {
                ui.selectable_value(&mut selected, name.clone(), name);
            }
        });
    if !selected.is_empty() {
        changes.column = Some(selected);
    }
    ui.add_space(6.0);

    let chart_size = inches(config.column_chart_size);
    match &report.inspection {
        Some(Inspection::Numeric(num)) => {
            text_table(
                ui,
                "column_summary",
                &["".into(), num.column.clone()],
                &summary_rows(&num.summary),
            );
            ui.add_space(6.0);
            plot::numeric_charts(ui, num, chart_size);
        }
        Some(Inspection::Categorical(cat)) => {
            let rows: Vec<Vec<String>> = cat
                .frequencies
                .iter()
                .map(|f| vec![f.value.clone(), f.count.to_string()])
                .collect();
            text_table(
                ui,
                "value_counts",
                &[cat.column.clone(), "count".into()],
                &rows,
            );
            ui.add_space(6.0);
            plot::count_plot(ui, cat, chart_size);
        }
        None => {}
    }

    section(ui, "🚨 Outliers");
    let label = format!("Detect outliers (|z| > {})", config.zscore_threshold);
    ui.checkbox(&mut changes.show_outliers, label);
    if let Some(outliers) = &report.outliers {
        ui.label(RichText::new(outliers.message()).strong());
    }
    ui.add_space(12.0);
}

fn summary_rows(s: &NumericSummary) -> Vec<Vec<String>> {
    let float = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |x| format!("{x:.4}"));
    vec![
        vec!["count".into(), s.count.to_string()],
        vec!["mean".into(), float(s.mean)],
        vec!["std".into(), float(s.std)],
        vec!["min".into(), float(s.min)],
        vec!["25%".into(), float(s.q1)],
        vec!["50%".into(), float(s.median)],
        vec!["75%".into(), float(s.q3)],
        vec!["max".into(), float(s.max)],
    ]
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn inches(size: [f32; 2]) -> egui::Vec2 {
    vec2(size[0], size[1]) * AnalysisConfig::POINTS_PER_INCH
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(10.0);
    ui.separator();
    ui.heading(title);
}

fn banner(ui: &mut Ui, color: Color32, icon: &str, text: &str) {
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, color))
        .show(ui, |ui: &mut Ui| {
            ui.colored_label(color, format!("{icon} {text}"));
        });
}

/// Plain text table with a header row, scrollable sideways when wide.
fn text_table(ui: &mut Ui, id: &str, headers: &[String], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().id_salt(id).show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(TableColumn::auto().at_least(60.0).resizable(true), headers.len())
                .header(20.0, |mut header| {
                    for h in headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(h);
                        });
                    }
                })
                .body(|mut body| {
                    for row in rows {
                        body.row(18.0, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    }
                });
        });
    });
}
