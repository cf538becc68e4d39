//! Combat experience accumulation.

use std::collections::BTreeMap;

use world_core::{AttackStyle, Discipline, ExperienceService, PlayerId};

/// Experience points granted per point of damage dealt.
const XP_PER_DAMAGE: u64 = 4;

/// Accumulates combat experience per player and discipline.
///
/// The Controlled style splits its award evenly across the melee-adjacent
/// disciplines in the full skill system; here, with one bucket per combat
/// discipline, it simply grants the same total to the attack discipline.
#[derive(Clone, Debug, Default)]
pub struct XpTracker {
    totals: BTreeMap<PlayerId, BTreeMap<Discipline, u64>>,
}

impl XpTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self, player: PlayerId, discipline: Discipline) -> u64 {
        self.totals
            .get(&player)
            .and_then(|by_discipline| by_discipline.get(&discipline))
            .copied()
            .unwrap_or(0)
    }

    pub fn clear_player(&mut self, player: PlayerId) {
        self.totals.remove(&player);
    }
}

impl ExperienceService for XpTracker {
    fn grant(
        &mut self,
        player: PlayerId,
        discipline: Discipline,
        _style: AttackStyle,
        damage: u32,
    ) {
        if damage == 0 {
            return;
        }
        *self
            .totals
            .entry(player)
            .or_default()
            .entry(discipline)
            .or_insert(0) += u64::from(damage) * XP_PER_DAMAGE;
    }
}
