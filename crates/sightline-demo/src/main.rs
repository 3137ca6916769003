//! Sightline demo entry point.
//!
//! Loads `config.ron`, applies CLI overrides, spawns a wandering population
//! and runs it for the configured number of ticks, logging join/leave churn.
//!
//! Run with: `cargo run -p sightline-demo -- --entities 500 --ticks 50`

use clap::Parser;
use sightline_config::{CliArgs, Config};
use sightline_demo::Simulation;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(Config::default_dir);
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(&args);
    config.validate()?;

    let log_dir = config_dir.join("logs");
    sightline_log::init_logging(
        config.debug.file_logging.then_some(log_dir.as_path()),
        cfg!(debug_assertions),
        Some(&config),
    );

    info!("Sightline AOI demo");
    info!(
        "Plane: {}x{} | Cell: {}x{} | Leave on refresh: {}",
        config.aoi.width,
        config.aoi.height,
        config.aoi.cell_width,
        config.aoi.cell_height,
        config.aoi.leave_on_refresh
    );

    let mut simulation = Simulation::new(&config)?;
    for _ in 0..config.simulation.ticks {
        let report = simulation.step();
        info!(
            "Tick {}: moved={} arrived={} joins={} leaves={} avg_focus={:.2}",
            report.tick,
            report.moved,
            report.arrived,
            report.joins,
            report.leaves,
            report.average_focus
        );
    }

    let (joins, leaves) = simulation.totals();
    info!(
        "Finished {} ticks with {} entities: {} joins, {} leaves, avg focus {:.2}",
        config.simulation.ticks,
        simulation.index().len(),
        joins,
        leaves,
        simulation.average_focus()
    );
    Ok(())
}
