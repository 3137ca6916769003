//! Configuration for Sightline.
//!
//! Settings persist to disk as `config.ron`. Supports CLI overrides via clap,
//! hot-reload detection, range validation, and forward/backward compatible
//! serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AoiConfig, Config, DebugConfig, SimulationConfig};
pub use error::ConfigError;
