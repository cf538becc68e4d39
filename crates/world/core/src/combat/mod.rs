//! Combat resolution: the tick-driven engine and its supporting types.
//!
//! The engine decides who attacks whom, computes and applies damage, emits
//! notifications, awards experience, and flags deaths. Everything else
//! (positions, catalogs, formulas, inventory) belongs to collaborators
//! reached through [`crate::env`].

mod engine;
mod events;
mod ledger;
mod mode;

pub use engine::{CombatEngine, TickReport};
pub use events::{AreaEffect, DeathEvent, DeathOutbox, Notice};
pub use ledger::DamageLedger;
pub use mode::{CombatMode, Discipline, resolve_combat_mode};

// Re-exported here so collaborator seams can name recipe types without
// reaching into env internals.
pub use crate::env::{Reagent, SpellDefinition};
