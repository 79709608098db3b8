use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints, Points};

use crate::data::model::XySeries;
use crate::data::selection::ViewWindow;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Lifetime plot (central panel)
// ---------------------------------------------------------------------------

fn plot_points(series: &XySeries) -> PlotPoints {
    series.points().map(|(x, y)| [x, y]).collect()
}

/// Render the data points, the fitted curve, and track the visible window.
pub fn lifetime_plot(ui: &mut Ui, state: &mut AppState) {
    if state.series.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a .csv or .tdf file, enter a URL, or simulate a decay  (File menu)");
        });
        return;
    }

    ui.heading(state.title());
    let colors = state.colors;

    Plot::new("lifetime_plot")
        .legend(Legend::default())
        .x_axis_label(state.x_label())
        .y_axis_label(state.y_label())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(w) = state.pending_view.take() {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([w.x0, w.y0], [w.x1, w.y1]));
            }

            if let Some(series) = &state.series {
                plot_ui.points(
                    Points::new(plot_points(series))
                        .name("data")
                        .radius(2.5)
                        .filled(true)
                        .color(colors.points_translucent()),
                );
            }

            if let Some(report) = &state.fit {
                plot_ui.points(
                    Points::new(plot_points(&report.selection))
                        .name("fitted range")
                        .radius(1.5)
                        .color(colors.points_outline),
                );
                plot_ui.line(
                    Line::new(plot_points(&report.curve))
                        .name(format!("fit (tau = {:.4})", report.result.tau()))
                        .color(colors.fit)
                        .width(3.0),
                );
            }

            let bounds = plot_ui.plot_bounds();
            let (min, max) = (bounds.min(), bounds.max());
            state.view = Some(ViewWindow::new(min[0], max[0], min[1], max[1]));
        });
}
