use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

use crate::color::CurveColors;
use crate::config::ViewerConfig;
use crate::data::loader::load;
use crate::data::model::{Dataset, XySeries};
use crate::data::selection::ViewWindow;
use crate::data::source::Source;
use crate::data::writer::save_dataset;
use crate::fit::{fit_exponential, FitResult};
use crate::simulate::{simulate_decay, DEFAULT_X_LABEL, DEFAULT_Y_LABEL};

/// Relative tolerance under which two plot windows count as the same window.
const WINDOW_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Fit report
// ---------------------------------------------------------------------------

/// A fit together with the window and points it was computed from.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub result: FitResult,
    pub window: ViewWindow,
    pub selection: XySeries,
    pub curve: XySeries,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded dataset (None until user loads a file or simulates).
    pub dataset: Option<Dataset>,

    /// Where the dataset came from, for the status line.
    pub source_name: Option<String>,

    /// Columns plotted on the x and y axes.
    pub x_column: usize,
    pub y_column: usize,

    /// Points of the chosen columns (cached).
    pub series: Option<XySeries>,

    /// Window currently shown by the plot, updated every frame.
    pub view: Option<ViewWindow>,

    /// Window to push into the plot on the next frame.
    pub pending_view: Option<ViewWindow>,

    pub fit: Option<FitReport>,

    /// Contents of the URL / path box.
    pub url_input: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// True lifetime of the last simulated dataset.
    pub simulated_tau: Option<f64>,

    pub show_table: bool,

    pub colors: CurveColors,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            dataset: None,
            source_name: None,
            x_column: 0,
            y_column: 1,
            series: None,
            view: None,
            pending_view: None,
            fit: None,
            url_input: String::new(),
            status_message: None,
            simulated_tau: None,
            show_table: false,
            colors: CurveColors::default(),
        }
    }

    /// Open whatever is typed in the path / URL box. Blank input is ignored.
    pub fn open_input(&mut self) {
        let input = self.url_input.trim().to_string();
        if input.is_empty() {
            return;
        }
        self.open_source(Source::parse(&input));
    }

    /// Load a source and make it the current dataset.
    pub fn open_source(&mut self, source: Source) {
        match load(&source, &self.config.ingest, &self.config.fetch) {
            Ok(dataset) => {
                self.simulated_tau = None;
                self.set_dataset(dataset, source.display_name());
            }
            Err(e) => self.report_error(&format!("Failed to load {source}"), &e),
        }
    }

    /// Replace the dataset with a freshly simulated one.
    pub fn simulate(&mut self, seed: u64) {
        match simulate_decay(&self.config.simulation, seed) {
            Ok(sim) => {
                self.simulated_tau = Some(sim.tau);
                self.set_dataset(sim.dataset, "simulation".to_string());
            }
            Err(e) => self.report_error("Simulation failed", &e),
        }
    }

    /// [`Self::simulate`] seeded from the clock.
    pub fn simulate_random(&mut self) {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        self.simulate(seed);
    }

    /// Ingest a newly loaded dataset, pick default columns, reset the view.
    pub fn set_dataset(&mut self, dataset: Dataset, name: String) {
        let numeric = dataset.numeric_columns();
        let last = dataset.width() - 1;
        self.x_column = numeric.first().copied().unwrap_or(0);
        self.y_column = numeric
            .get(1)
            .copied()
            .unwrap_or_else(|| (self.x_column + 1).min(last));

        self.dataset = Some(dataset);
        self.source_name = Some(name);
        self.status_message = None;
        self.fit = None;
        self.rebuild_series();
        self.reset_view();
    }

    pub fn set_x_column(&mut self, col: usize) {
        self.x_column = col;
        self.on_columns_changed();
    }

    pub fn set_y_column(&mut self, col: usize) {
        self.y_column = col;
        self.on_columns_changed();
    }

    fn on_columns_changed(&mut self) {
        self.fit = None;
        self.rebuild_series();
        self.reset_view();
    }

    /// Recompute `series` from the chosen columns.
    fn rebuild_series(&mut self) {
        let Some(ds) = &self.dataset else {
            self.series = None;
            return;
        };
        match ds.xy(self.x_column, self.y_column) {
            Ok(series) => {
                self.series = Some(series);
            }
            Err(e) => {
                self.series = None;
                self.report_error("Cannot plot the selected columns", &e);
            }
        }
    }

    /// Zoom back out to the whole series. The last fit stays on the plot.
    pub fn reset_view(&mut self) {
        self.pending_view = self.series.as_ref().and_then(ViewWindow::bounding);
        self.view = self.pending_view;
    }

    /// Fit the points inside the current plot window.
    ///
    /// Does nothing when the window has not changed since the last fit.
    pub fn fit_view(&mut self) {
        let (Some(series), Some(window)) = (&self.series, self.view) else {
            self.status_message = Some("Load data and select a range to fit first".into());
            return;
        };
        let window = window.normalized();
        if let Some(report) = &self.fit {
            if report.window.approx_eq(&window, WINDOW_TOLERANCE) {
                log::debug!("Window unchanged since last fit, skipping");
                return;
            }
        }

        let selection = window.select(series);
        match fit_exponential(&selection, &self.config.fit) {
            Ok(result) => {
                if !result.converged {
                    log::warn!("Fit over {} points did not converge", result.points);
                }
                let curve = result.curve(&selection);
                self.fit = Some(FitReport {
                    result,
                    window,
                    selection,
                    curve,
                });
                self.pending_view = Some(window);
                self.status_message = None;
            }
            Err(e) => self.report_error("Fit failed", &e),
        }
    }

    /// Write the current dataset to `path` (`.csv` or `.tdf`).
    pub fn export(&mut self, path: &Path) {
        if let Err(e) = self.try_export(path) {
            log::error!("{e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        } else {
            self.status_message = Some(format!("Exported to {}", path.display()));
        }
    }

    fn try_export(&self, path: &Path) -> anyhow::Result<()> {
        let dataset = self.dataset.as_ref().context("no dataset to export")?;
        save_dataset(dataset, path, &self.config.ingest)
            .with_context(|| format!("exporting to {}", path.display()))
    }

    // -- Labels --

    pub fn title(&self) -> String {
        self.dataset
            .as_ref()
            .and_then(|ds| ds.meta.title.clone())
            .or_else(|| self.source_name.clone())
            .unwrap_or_else(|| "Graph".to_string())
    }

    pub fn x_label(&self) -> String {
        self.axis_label(self.x_column, |ds| ds.meta.x_label.clone(), DEFAULT_X_LABEL)
    }

    pub fn y_label(&self) -> String {
        self.axis_label(self.y_column, |ds| ds.meta.y_label.clone(), DEFAULT_Y_LABEL)
    }

    /// Directive label, then column name when the file had a header, then default.
    fn axis_label(
        &self,
        column: usize,
        from_meta: impl Fn(&Dataset) -> Option<String>,
        default: &str,
    ) -> String {
        let Some(ds) = &self.dataset else {
            return default.to_string();
        };
        from_meta(ds)
            .or_else(|| {
                ds.has_header()
                    .then(|| ds.columns().get(column).cloned())
                    .flatten()
            })
            .unwrap_or_else(|| default.to_string())
    }

    fn report_error(&mut self, context: &str, err: &crate::error::Error) {
        log::error!("{context}: {err}");
        self.status_message = Some(format!("Error: {context}: {err}"));
    }
}
