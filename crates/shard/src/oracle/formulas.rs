//! Table-driven damage and attack-speed formulas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use world_core::{ActorId, FormulaOracle, NpcId, PlayerId, SpellId};

/// Tunable formula tables, loadable alongside the shard config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaTables {
    /// Ticks between player attacks.
    pub player_attack_speed: u32,
    /// Max hit floor before the level bonus.
    pub base_max_hit: u32,
    /// Combat levels per +1 max hit.
    pub levels_per_max_hit: u32,
    /// Flat max hit for combat spells.
    pub spell_max_hit: u32,
    /// Fallbacks for NPC templates missing from the per-template tables.
    pub default_npc_max_hit: u32,
    pub default_npc_attack_speed: u32,
    /// Per-template overrides.
    pub npc_max_hits: BTreeMap<u32, u32>,
    pub npc_attack_speeds: BTreeMap<u32, u32>,
}

impl Default for FormulaTables {
    fn default() -> Self {
        Self {
            player_attack_speed: 4,
            base_max_hit: 1,
            levels_per_max_hit: 7,
            spell_max_hit: 4,
            default_npc_max_hit: 2,
            default_npc_attack_speed: 4,
            npc_max_hits: BTreeMap::new(),
            npc_attack_speeds: BTreeMap::new(),
        }
    }
}

/// [`FormulaOracle`] implementation over [`FormulaTables`].
///
/// The oracle cannot reach into the shard, so the driver mirrors the stats
/// it needs (player combat levels, NPC templates) into the registry at
/// spawn time.
#[derive(Clone, Debug, Default)]
pub struct CombatFormulas {
    tables: FormulaTables,
    player_levels: BTreeMap<PlayerId, u32>,
    npc_templates: BTreeMap<NpcId, u32>,
}

impl CombatFormulas {
    pub fn new(tables: FormulaTables) -> Self {
        Self {
            tables,
            player_levels: BTreeMap::new(),
            npc_templates: BTreeMap::new(),
        }
    }

    pub fn register_player(&mut self, id: PlayerId, combat_level: u32) {
        self.player_levels.insert(id, combat_level);
    }

    pub fn register_npc(&mut self, id: NpcId, template: u32) {
        self.npc_templates.insert(id, template);
    }

    pub fn unregister(&mut self, actor: ActorId) {
        match actor {
            ActorId::Player(id) => {
                self.player_levels.remove(&id);
            }
            ActorId::Npc(id) => {
                self.npc_templates.remove(&id);
            }
        }
    }

    fn player_max_hit(&self, attacker: PlayerId) -> u32 {
        let level = self.player_levels.get(&attacker).copied().unwrap_or(1);
        self.tables.base_max_hit + level / self.tables.levels_per_max_hit.max(1)
    }

    fn npc_max_hit(&self, attacker: NpcId) -> u32 {
        self.npc_templates
            .get(&attacker)
            .and_then(|template| self.tables.npc_max_hits.get(template))
            .copied()
            .unwrap_or(self.tables.default_npc_max_hit)
    }

    /// Uniform damage in `0..=max_hit` from a pre-seeded roll.
    fn damage(roll: u32, max_hit: u32) -> u32 {
        roll % (max_hit + 1)
    }
}

impl FormulaOracle for CombatFormulas {
    fn melee_damage(&self, attacker: PlayerId, _target: ActorId, roll: u32) -> u32 {
        Self::damage(roll, self.player_max_hit(attacker))
    }

    fn ranged_damage(&self, attacker: PlayerId, _target: ActorId, roll: u32) -> u32 {
        Self::damage(roll, self.player_max_hit(attacker))
    }

    fn magic_damage(&self, _attacker: PlayerId, _spell: SpellId, _target: ActorId, roll: u32) -> u32 {
        Self::damage(roll, self.tables.spell_max_hit)
    }

    fn npc_damage(&self, attacker: NpcId, _target: ActorId, roll: u32) -> u32 {
        Self::damage(roll, self.npc_max_hit(attacker))
    }

    fn attack_speed(&self, actor: ActorId) -> u32 {
        match actor {
            ActorId::Player(_) => self.tables.player_attack_speed,
            ActorId::Npc(id) => self
                .npc_templates
                .get(&id)
                .and_then(|template| self.tables.npc_attack_speeds.get(template))
                .copied()
                .unwrap_or(self.tables.default_npc_attack_speed),
        }
    }
}
