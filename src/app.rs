use eframe::egui;

use crate::config::ViewerConfig;
use crate::data::source::Source;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LifetimeViewerApp {
    pub state: AppState,
}

impl LifetimeViewerApp {
    /// Build the app, loading `initial` straight away if given.
    pub fn new(config: ViewerConfig, initial: Option<Source>) -> Self {
        let mut state = AppState::new(config);
        if let Some(source) = initial {
            state.url_input = source.to_string();
            state.open_source(source);
        }
        Self { state }
    }
}

impl Default for LifetimeViewerApp {
    fn default() -> Self {
        Self::new(ViewerConfig::default(), None)
    }
}

impl eframe::App for LifetimeViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + source box ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: axes + fit ----
        egui::SidePanel::left("fit_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: raw table (optional) ----
        if self.state.show_table {
            egui::TopBottomPanel::bottom("table_panel")
                .resizable(true)
                .default_height(220.0)
                .show(ctx, |ui| {
                    table::data_table(ui, &self.state);
                });
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::lifetime_plot(ui, &mut self.state);
        });
    }
}
