use eframe::egui;
use lifetime_viewer::app::LifetimeViewerApp;
use lifetime_viewer::config::ViewerConfig;
use lifetime_viewer::data::source::Source;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::load().unwrap_or_else(|e| {
        log::warn!("Ignoring config: {e}");
        ViewerConfig::default()
    });
    let initial = std::env::args().nth(1).map(|arg| Source::parse(&arg));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Lifetime Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(LifetimeViewerApp::new(config, initial)))),
    )
}
