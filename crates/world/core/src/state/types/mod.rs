//! Value types shared across the shard state.

pub mod actor;
pub mod common;
pub mod lifecycle;

pub use actor::{
    AggroState, AttackStyle, NpcState, PlayerState, Skill, WeaponClass, WeaponProfile,
};
pub use common::{ActorId, ItemId, NpcId, PlayerId, Position, SpellId, Tick};
pub use lifecycle::LifecycleState;
