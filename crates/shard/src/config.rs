//! Shard configuration, loaded from RON files.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use world_core::CombatConfig;

use crate::error::{Result, ShardError};

/// Top-level configuration for one shard process.
///
/// Every field has a sensible default, so a RON file only needs to name the
/// values it overrides:
///
/// ```ron
/// (
///     seed: 42,
///     tick_millis: 600,
///     combat: (
///         quick_finish_cooldown: false,
///     ),
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardConfig {
    /// Seed for all deterministic combat rolls. Two shards with the same
    /// seed, config, and inputs produce identical tick histories.
    pub seed: u64,

    /// Wall-clock milliseconds per simulation tick.
    pub tick_millis: u64,

    /// Per-topic buffer capacity of the event bus.
    pub event_capacity: usize,

    /// Combat core tunables, passed through to the engine.
    pub combat: CombatConfig,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            tick_millis: 600,
            event_capacity: 256,
            combat: CombatConfig::default(),
        }
    }
}

impl ShardConfig {
    /// Loads a configuration from a RON file. Missing fields fall back to
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ShardError::DataIo {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ShardError::DataParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
