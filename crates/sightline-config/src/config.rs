//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Plane and grid dimensions of the AOI index.
    pub aoi: AoiConfig,
    /// Headless simulation settings.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Area-of-interest index configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AoiConfig {
    /// Width of the tracked plane.
    pub width: f64,
    /// Height of the tracked plane.
    pub height: f64,
    /// Width of one grid cell. Smaller cells mean fewer candidates per scan
    /// but more cells to visit.
    pub cell_width: f64,
    /// Height of one grid cell.
    pub cell_height: f64,
    /// Fire leave events when an entity walks out of view, not only on removal.
    pub leave_on_refresh: bool,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of entities to spawn.
    pub entity_count: u32,
    /// Number of ticks to run.
    pub ticks: u32,
    /// Simulated time per tick in milliseconds.
    pub tick_interval_ms: u64,
    /// Movement speed in plane units per second.
    pub speed: f64,
    /// Vision radius of every spawned entity.
    pub vision: f64,
    /// RNG seed for spawn positions and destinations.
    pub seed: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs to the config directory in debug builds.
    pub file_logging: bool,
}

// --- Default implementations ---

impl Default for AoiConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            cell_width: 100.0,
            cell_height: 100.0,
            leave_on_refresh: true,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            entity_count: 200,
            ticks: 100,
            tick_interval_ms: 100,
            speed: 50.0,
            vision: 80.0,
            seed: 42,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: false,
        }
    }
}

// --- Validation ---

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

impl AoiConfig {
    /// Reject non-positive plane or cell dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("aoi.width", self.width)?;
        positive("aoi.height", self.height)?;
        positive("aoi.cell_width", self.cell_width)?;
        positive("aoi.cell_height", self.cell_height)?;
        Ok(())
    }
}

impl SimulationConfig {
    /// Reject non-positive speed or vision and a zero tick interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("simulation.speed", self.speed)?;
        positive("simulation.vision", self.vision)?;
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "simulation.tick_interval_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for Sightline, e.g. `~/.config/sightline`.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sightline")
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aoi.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("cell_width: 100.0"));
        assert!(ron_str.contains("entity_count: 200"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(aoi: (width: 500.0), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.aoi.width, 500.0);
        assert_eq!(config.aoi.cell_width, 100.0);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_positive_cell_rejected() {
        let mut config = Config::default();
        config.aoi.cell_height = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("aoi.cell_height")));

        let mut config = Config::default();
        config.aoi.width = -10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulation_validation() {
        let mut config = Config::default();
        config.simulation.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.vision = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.aoi.cell_width = 25.0;
        config.simulation.seed = 7;
        config.debug.log_level = "debug".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "(aoi: (cell_width: 0.0))").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.aoi.width = 2000.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().aoi.width, 2000.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_dir_ends_with_app_name() {
        assert!(Config::default_dir().ends_with("sightline"));
    }
}
