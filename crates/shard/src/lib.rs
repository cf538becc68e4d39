//! Runtime layer for a combat world shard.
//!
//! `shard-runtime` wires the deterministic combat core (`world-core`) into a
//! running process: configuration loading, reference oracle implementations,
//! mutable service state, a tick loop driver, and a topic-based event bus.
//!
//! Modules are organized by responsibility:
//! - [`config`] loads shard settings from RON files
//! - [`oracle`] hosts the read-only collaborator implementations
//! - [`services`] hosts the mutable ones (equipment, experience, event sink)
//! - [`driver`] owns the per-tick loop
//! - [`events`] provides the topic-based event bus

pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod oracle;
pub mod services;

pub use config::ShardConfig;
pub use driver::{DriverHandle, ShardDriver};
pub use error::{Result, ShardError};
pub use events::{EventBus, ShardEvent, Topic};
pub use oracle::{CombatFormulas, FormulaTables, OracleBundle, RegionMap, RegionZone, Spellbook, TileLos};
pub use services::{BufferedSink, InMemoryEquipment, XpTracker};
