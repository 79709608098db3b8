use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable preview of the loaded table.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(40.0))
        .columns(Column::auto().at_least(60.0).clip(true), dataset.width())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for (i, name) in dataset.columns().iter().enumerate() {
                header.col(|ui| {
                    let label = if i == state.x_column {
                        format!("{name} (x)")
                    } else if i == state.y_column {
                        format!("{name} (y)")
                    } else {
                        name.clone()
                    };
                    ui.strong(label);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, dataset.len(), |mut row| {
                let index = row.index();
                let cells = &dataset.rows()[index];
                row.col(|ui| {
                    ui.label((index + 1).to_string());
                });
                for cell in cells {
                    row.col(|ui| {
                        ui.monospace(cell.to_string());
                    });
                }
            });
        });
}
