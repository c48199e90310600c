use eframe::egui::epaint::TextShape;
use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Pos2, RichText, Sense, Ui, Vec2, pos2, vec2,
};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints, Points,
};

use crate::color::{DivergingScale, generate_palette};
use crate::data::inspect::{BoxStats, CategoricalInspection, NumericInspection};
use crate::data::relational::{CorrelationMatrix, PairCell, PairGrid};
use crate::data::stats::Histogram;

const HIST_COLOR: Color32 = Color32::from_rgb(76, 114, 176);
const KDE_COLOR: Color32 = Color32::from_rgb(221, 132, 82);
const LABEL_FONT: f32 = 11.0;
const MAX_LABEL_CHARS: usize = 20;

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Annotated heatmap with a diverging scale and a colour bar.
pub fn correlation_heatmap(
    ui: &mut Ui,
    matrix: &CorrelationMatrix,
    size: Vec2,
    rotation_deg: f32,
) {
    if matrix.is_empty() {
        return;
    }
    let scale = DivergingScale::default();
    let n = matrix.len();

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let area = response.rect;

    // Margins: row labels on the left, rotated column labels below, colour bar right.
    let left = 110.0;
    let bottom = 90.0;
    let right = 60.0;
    let cell = ((area.width() - left - right) / n as f32)
        .min((area.height() - bottom) / n as f32)
        .max(4.0);
    let origin = pos2(area.left() + left, area.top());
    let grid = egui::Rect::from_min_size(origin, Vec2::splat(cell * n as f32));

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let rect = egui::Rect::from_min_size(
                pos2(origin.x + j as f32 * cell, origin.y + i as f32 * cell),
                Vec2::splat(cell),
            );
            let (fill, text, text_color) = match value {
                Some(r) => (scale.color_for(*r), format!("{r:.2}"), scale.text_color_for(*r)),
                None => (scale.missing_color(), "NaN".to_string(), Color32::DARK_GRAY),
            };
            painter.rect_filled(rect, 0.0, fill);
            if cell >= 24.0 {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(LABEL_FONT),
                    text_color,
                );
            }
        }
    }

    let label_color = ui.visuals().text_color();
    for (i, name) in matrix.columns.iter().enumerate() {
        let y = origin.y + (i as f32 + 0.5) * cell;
        painter.text(
            pos2(grid.left() - 4.0, y),
            Align2::RIGHT_CENTER,
            shorten(name),
            FontId::proportional(LABEL_FONT),
            label_color,
        );
    }
    let ticks: Vec<(Pos2, String)> = matrix
        .columns
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let x = origin.x + (j as f32 + 0.5) * cell;
            (pos2(x, grid.bottom() + 4.0), name.clone())
        })
        .collect();
    draw_rotated_labels(&painter, &ticks, rotation_deg, label_color);

    color_bar(&painter, &scale, grid, label_color);

    if let Some(pos) = response.hover_pos() {
        if grid.contains(pos) {
            let j = (((pos.x - grid.left()) / cell) as usize).min(n - 1);
            let i = (((pos.y - grid.top()) / cell) as usize).min(n - 1);
            if let (Some(a), Some(b)) = (matrix.columns.get(i), matrix.columns.get(j)) {
                let value = matrix
                    .get(i, j)
                    .map_or_else(|| "NaN".to_string(), |r| format!("{r:.4}"));
                response.on_hover_text_at_pointer(format!("{a} × {b}: {value}"));
            }
        }
    }
}

fn color_bar(painter: &Painter, scale: &DivergingScale, grid: egui::Rect, text_color: Color32) {
    let bar = egui::Rect::from_min_size(
        pos2(grid.right() + 12.0, grid.top()),
        vec2(12.0, grid.height()),
    );
    let steps = 64;
    let step_h = bar.height() / steps as f32;
    for s in 0..steps {
        let value = 1.0 - 2.0 * (s as f64 + 0.5) / steps as f64;
        let rect = egui::Rect::from_min_size(
            pos2(bar.left(), bar.top() + s as f32 * step_h),
            vec2(bar.width(), step_h + 0.5),
        );
        painter.rect_filled(rect, 0.0, scale.color_for(value));
    }
    for (label, y) in [("1.0", bar.top()), ("0.0", bar.center().y), ("-1.0", bar.bottom())] {
        painter.text(
            pos2(bar.right() + 4.0, y),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(LABEL_FONT),
            text_color,
        );
    }
}

/// Draw labels rotated counter-clockwise by `rotation_deg`, each ending at
/// its tick position so the text hangs down and to the left.
fn draw_rotated_labels(
    painter: &Painter,
    ticks: &[(Pos2, String)],
    rotation_deg: f32,
    color: Color32,
) {
    let angle = -rotation_deg.to_radians();
    let dir = vec2(angle.cos(), angle.sin());
    for (tick, text) in ticks {
        let galley =
            painter.layout_no_wrap(shorten(text), FontId::proportional(LABEL_FONT), color);
        let start = *tick - dir * galley.size().x;
        painter.add(TextShape::new(start, galley, color).with_angle(angle));
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_LABEL_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Numeric column: histogram + KDE, boxplot
// ---------------------------------------------------------------------------

fn histogram_bars(hist: &Histogram, color: Color32) -> BarChart {
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .centers()
        .into_iter()
        .zip(&hist.counts)
        .map(|(x, &count)| Bar::new(x, count as f64).width(width).fill(color))
        .collect();
    BarChart::new(bars).color(color)
}

pub fn numeric_charts(ui: &mut Ui, inspection: &NumericInspection, size: Vec2) {
    ui.label(RichText::new(&inspection.title).strong());

    Plot::new(("histogram", &inspection.column))
        .width(size.x)
        .height(size.y)
        .legend(Legend::default())
        .x_axis_label(&inspection.column)
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            if let Some(hist) = &inspection.histogram {
                plot_ui.bar_chart(histogram_bars(hist, HIST_COLOR).name("count"));
            }
            if !inspection.kde.is_empty() {
                let curve = PlotPoints::from(inspection.kde.clone());
                plot_ui.line(Line::new(curve).name("KDE").color(KDE_COLOR).width(2.0));
            }
        });

    if let Some(stats) = &inspection.boxplot {
        ui.add_space(8.0);
        boxplot(ui, &inspection.column, stats, size.x);
    }
}

fn boxplot(ui: &mut Ui, column: &str, stats: &BoxStats, width: f32) {
    let spread = BoxSpread::new(
        stats.lower_whisker,
        stats.q1,
        stats.median,
        stats.q3,
        stats.upper_whisker,
    );
    let elem = BoxElem::new(0.0, spread)
        .name(column)
        .box_width(0.5)
        .whisker_width(0.3)
        .fill(HIST_COLOR.gamma_multiply(0.5));

    Plot::new(("boxplot", column))
        .width(width)
        .height(130.0)
        .x_axis_label(column)
        .show_y(false)
        .y_axis_formatter(|_, _| String::new())
        .include_y(-0.6)
        .include_y(0.6)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal());
            if !stats.fliers.is_empty() {
                let points: PlotPoints = stats.fliers.iter().map(|&v| [v, 0.0]).collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(3.0)
                        .color(Color32::DARK_GRAY)
                        .name("outliers"),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Categorical column: count plot
// ---------------------------------------------------------------------------

pub fn count_plot(ui: &mut Ui, inspection: &CategoricalInspection, size: Vec2) {
    ui.label(RichText::new(&inspection.title).strong());

    let n = inspection.frequencies.len();
    let palette = generate_palette(n);
    let bars: Vec<Bar> = inspection
        .frequencies
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, (f, color))| {
            Bar::new(i as f64, f.count as f64)
                .width(0.8)
                .name(&f.value)
                .fill(color)
        })
        .collect();

    let response = Plot::new(("countplot", &inspection.column))
        .width(size.x)
        .height(size.y)
        .y_axis_label("count")
        .x_axis_formatter(|_, _| String::new())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-0.5)
        .include_x(n as f64 - 0.5)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&inspection.column));
        });

    // egui_plot cannot rotate tick labels, so paint them under the plot.
    let (rect, _) = ui.allocate_exact_size(vec2(size.x, 90.0), Sense::hover());
    let painter = ui.painter_at(rect);
    let ticks: Vec<(Pos2, String)> = inspection
        .frequencies
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let x = response
                .transform
                .position_from_point(&PlotPoint::new(i as f64, 0.0))
                .x;
            (pos2(x, rect.top() + 4.0), f.value.clone())
        })
        .collect();
    let color = ui.visuals().text_color();
    draw_rotated_labels(&painter, &ticks, inspection.label_rotation_deg, color);
}

// ---------------------------------------------------------------------------
// Pairplot
// ---------------------------------------------------------------------------

pub fn pairplot(ui: &mut Ui, grid: &PairGrid) {
    let n = grid.columns.len();
    if n == 0 {
        return;
    }
    let cell = (ui.available_width() / n as f32 - 8.0).clamp(90.0, 180.0);

    egui::ScrollArea::horizontal()
        .id_salt("pairplot_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("pairplot").spacing([4.0, 4.0]).show(ui, |ui: &mut Ui| {
                for (row, cells) in grid.cells.iter().enumerate() {
                    for (col, pair) in cells.iter().enumerate() {
                        let mut plot = Plot::new(("pair", row, col))
                            .width(cell)
                            .height(cell)
                            .show_axes([row == n - 1, col == 0])
                            .allow_drag(false)
                            .allow_zoom(false)
                            .allow_scroll(false);
                        if row == n - 1 {
                            plot = plot.x_axis_label(&grid.columns[col]);
                        }
                        if col == 0 {
                            plot = plot.y_axis_label(&grid.columns[row]);
                        }
                        plot.show(ui, |plot_ui| match pair {
                            PairCell::Histogram(hist) => {
                                plot_ui.bar_chart(histogram_bars(hist, HIST_COLOR));
                            }
                            PairCell::Scatter(points) => {
                                let pts = PlotPoints::from(points.clone());
                                plot_ui.points(Points::new(pts).radius(1.5).color(HIST_COLOR));
                            }
                            PairCell::Empty => {}
                        });
                    }
                    ui.end_row();
                }
            });
        });
}
