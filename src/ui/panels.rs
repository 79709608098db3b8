use eframe::egui::{self, Color32, Grid, RichText, Ui};

use crate::data::source::{Format, Source};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – axes, fit controls, results
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Axes");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let columns = dataset.columns().to_vec();

    Grid::new("axes_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("x");
        if let Some(col) = column_picker(ui, "x_column", &columns, state.x_column) {
            state.set_x_column(col);
        }
        ui.end_row();

        ui.label("y");
        if let Some(col) = column_picker(ui, "y_column", &columns, state.y_column) {
            state.set_y_column(col);
        }
        ui.end_row();
    });

    ui.add_space(8.0);
    ui.heading("Lifetime fit");
    ui.separator();
    ui.label("Zoom or drag the plot to the range to fit, then:");
    ui.horizontal(|ui: &mut Ui| {
        let can_fit = state.series.is_some();
        if ui
            .add_enabled(can_fit, egui::Button::new("Fit exponential"))
            .clicked()
        {
            state.fit_view();
        }
        if ui.button("Reset view").clicked() {
            state.reset_view();
        }
    });

    ui.add_space(8.0);
    results(ui, state);

    if let Some(tau) = state.simulated_tau {
        ui.add_space(8.0);
        ui.label(format!("Simulated with tau = {tau}"));
    }
}

/// Combo box over column names; returns the newly picked index.
fn column_picker(ui: &mut Ui, id: &str, columns: &[String], current: usize) -> Option<usize> {
    let mut picked = None;
    let selected = columns.get(current).cloned().unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui: &mut Ui| {
            for (i, name) in columns.iter().enumerate() {
                if ui.selectable_label(i == current, name).clicked() && i != current {
                    picked = Some(i);
                }
            }
        });
    picked
}

fn results(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.fit else {
        return;
    };
    let fit = &report.result;

    Grid::new("fit_results")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("tau");
            ui.monospace(format!("{:.4}", fit.tau()));
            ui.end_row();

            ui.label("half-life");
            ui.monospace(format!("{:.4}", fit.half_life()));
            ui.end_row();

            ui.label("decay rate");
            ui.monospace(format!("{:.4}", fit.decay_rate()));
            ui.end_row();

            ui.label("points");
            ui.monospace(fit.points.to_string());
            ui.end_row();
        });

    if !fit.converged {
        ui.label(
            RichText::new("The fit did not converge; try a different range.")
                .color(Color32::YELLOW),
        );
    }
}

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
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Simulate decay").clicked() {
                state.simulate_random();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Path / URL:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.url_input)
                .hint_text("https://… .csv or .tdf")
                .desired_width(320.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Load").clicked() || submitted {
            state.open_input();
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!("{} rows × {} columns", ds.len(), ds.width()));
        }

        ui.toggle_value(&mut state.show_table, "Table");

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn extensions() -> Vec<&'static str> {
    Format::ALL.iter().map(|f| f.extension()).collect()
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open lifetime data")
        .add_filter("Supported files", extensions().as_slice())
        .add_filter("CSV", &["csv"])
        .add_filter("TDF", &["tdf"])
        .pick_file();

    if let Some(path) = file {
        state.url_input = path.display().to_string();
        state.open_source(Source::Local(path));
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dataset")
        .add_filter("CSV", &["csv"])
        .add_filter("TDF", &["tdf"])
        .set_file_name("dataset.csv")
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
