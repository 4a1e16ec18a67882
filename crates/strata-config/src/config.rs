//! Configuration structs with sensible defaults and RON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_blocks::{BlockDef, BlockRegistry};

use crate::error::ConfigError;
use crate::world_gen::{WorldGenConfig, default_block_table};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain generation tables.
    pub world_gen: WorldGenConfig,
    /// Block symbol table.
    pub blocks: BTreeMap<char, BlockDef>,
    /// Session settings.
    pub server: ServerConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory holding save folders.
    pub data_dir: PathBuf,
    /// Ticks per second.
    pub tps: u32,
    /// Sun angle advance per tick, in radians.
    pub sun_tick: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs into this directory.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            world_gen: WorldGenConfig::default(),
            blocks: default_block_table(),
            server: ServerConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("saves"),
            tps: 10,
            sun_tick: (1.0_f64 / 32.0).to_radians(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Default directory for `config.ron`, e.g. `~/.config/strata`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strata"))
}

// --- Validation ---

impl Config {
    /// Validates the world generation tables against the block table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world_gen.validate(&self.blocks)
    }

    /// Builds the block registry from the block table.
    pub fn block_registry(&self) -> Result<BlockRegistry, ConfigError> {
        BlockRegistry::from_table(self.blocks.iter().map(|(&symbol, def)| (symbol, def.clone())))
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// The loaded config is validated before it is returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            config
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
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

        if &new_config != self {
            new_config.validate()?;
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
