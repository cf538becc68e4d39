//! Line-of-sight collaborator.

use crate::state::Position;

/// Unobstructed-visibility check between two tiles on a map level.
///
/// Ranged and magic attacks require a clear line; melee does not. The
/// oracle is optional on [`crate::env::CombatEnv`]: when absent the engine
/// assumes clear sight, so a shard without LOS wiring degrades rather than
/// stalls. Production shards are expected to always supply one.
pub trait LosOracle: Send + Sync {
    fn has_los(&self, from: Position, to: Position) -> bool;
}
