//! Configuration system for Strata.
//!
//! World generation tables, the block table, and session settings persist to
//! disk as a RON file. Supports CLI overrides via clap, hot-reload detection,
//! forward/backward compatible serialization, and startup validation.

mod cli;
mod config;
mod error;
mod world_gen;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, ServerConfig, default_config_dir};
pub use error::ConfigError;
pub use world_gen::{
    BiomeConfig, MAX_VEIN_CELLS, OreConfig, TreeConfig, WorldGenConfig, default_block_table,
};
