//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Sightline command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "sightline", about = "Sightline area-of-interest simulation")]
pub struct CliArgs {
    /// Plane width.
    #[arg(long)]
    pub width: Option<f64>,

    /// Plane height.
    #[arg(long)]
    pub height: Option<f64>,

    /// Grid cell width.
    #[arg(long)]
    pub cell_width: Option<f64>,

    /// Grid cell height.
    #[arg(long)]
    pub cell_height: Option<f64>,

    /// Number of entities to spawn.
    #[arg(long)]
    pub entities: Option<u32>,

    /// Number of ticks to simulate.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.aoi.width = w;
        }
        if let Some(h) = args.height {
            self.aoi.height = h;
        }
        if let Some(cw) = args.cell_width {
            self.aoi.cell_width = cw;
        }
        if let Some(ch) = args.cell_height {
            self.aoi.cell_height = ch;
        }
        if let Some(count) = args.entities {
            self.simulation.entity_count = count;
        }
        if let Some(ticks) = args.ticks {
            self.simulation.ticks = ticks;
        }
        if let Some(seed) = args.seed {
            self.simulation.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            cell_width: Some(50.0),
            entities: Some(1000),
            log_level: Some("debug".to_string()),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.aoi.cell_width, 50.0);
        assert_eq!(config.simulation.entity_count, 1000);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.aoi.cell_height, 100.0);
        assert_eq!(config.simulation.seed, 42);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "sightline",
            "--width",
            "2000",
            "--cell-height",
            "40",
            "--ticks",
            "5",
            "--config",
            "/tmp/sightline",
        ]);
        assert_eq!(args.width, Some(2000.0));
        assert_eq!(args.cell_height, Some(40.0));
        assert_eq!(args.ticks, Some(5));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/sightline")));
        assert!(args.seed.is_none());
    }
}
