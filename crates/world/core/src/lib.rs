//! Deterministic combat core of a persistent-world shard.
//!
//! `world-core` owns the per-tick combat simulation: entity positions in a
//! spatial hash, target acquisition, life-cycle state gating, and the
//! two-phase combat resolution engine. Everything else (wire protocol,
//! persistence, pathfinding, catalogs, experience math) lives behind the
//! collaborator seams in [`env`]. All state mutation flows through
//! [`combat::CombatEngine`] against an explicit [`state::WorldShard`];
//! nothing in this crate blocks, suspends, or touches I/O.
pub mod combat;
pub mod config;
pub mod env;
pub mod spatial;
pub mod state;
pub mod targeting;

pub use combat::{
    AreaEffect, CombatEngine, CombatMode, DamageLedger, DeathEvent, DeathOutbox, Discipline,
    Notice, TickReport, resolve_combat_mode,
};
pub use config::CombatConfig;
pub use env::{
    CombatEnv, CombatServices, EquipmentService, EventSink, ExperienceService, FormulaOracle,
    LosOracle, OracleError, PcgRng, Reagent, RegionFlags, RegionOracle, RngOracle, RollContext,
    SpellDefinition, SpellOracle, compute_seed,
};
pub use spatial::SpatialIndex;
pub use state::{
    ActorId, AggroState, AttackStyle, ItemId, LifecycleState, NpcId, NpcState, PlayerId,
    PlayerState, Position, Skill, SpellId, Tick, WeaponClass, WeaponProfile, WorldShard,
};
pub use targeting::{TargetKind, TargetRef, TargetingService};
