use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyEdaApp {
    pub state: AppState,
}

impl RustyEdaApp {
    /// Load the first file dropped onto the window, if any.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.first() else {
            return;
        };
        if let Some(path) = &file.path {
            self.state.load_path(path);
        } else if let Some(bytes) = &file.bytes {
            self.state.load_bytes(&file.name, bytes);
        }
    }
}

impl eframe::App for RustyEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report::report_page(ui, &mut self.state);
        });
    }
}
