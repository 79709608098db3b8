use std::path::PathBuf;

use anyhow::{Context, Result};
use lifetime_viewer::config::IngestOptions;
use lifetime_viewer::data::source::Format;
use lifetime_viewer::data::writer::save_dataset;
use lifetime_viewer::simulate::{simulate_decay, SimulationParams};

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let sim = simulate_decay(&SimulationParams::default(), 42).context("simulating decay")?;
    let options = IngestOptions::default();

    for format in Format::ALL {
        let path = out_dir.join(format!("sample_decay.{}", format.extension()));
        save_dataset(&sim.dataset, &path, &options)
            .with_context(|| format!("writing {}", path.display()))?;
        println!(
            "Wrote {} bins (tau = {}) to {}",
            sim.dataset.len(),
            sim.tau,
            path.display()
        );
    }
    Ok(())
}
