//! Per-victim damage ledger for kill credit.
//!
//! Tracks cumulative damage per attacker for each victim's current life.
//! Used for exactly one thing: picking the killer when the victim dies.
//! An entry is born at first damage and destroyed at the victim's death.

use std::collections::BTreeMap;

use crate::state::ActorId;

/// victim → (attacker → cumulative damage this life).
#[derive(Debug, Default)]
pub struct DamageLedger {
    entries: BTreeMap<ActorId, BTreeMap<ActorId, u32>>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates damage dealt by `attacker` to `victim`.
    pub fn record(&mut self, victim: ActorId, attacker: ActorId, damage: u32) {
        if damage == 0 {
            return;
        }
        *self
            .entries
            .entry(victim)
            .or_default()
            .entry(attacker)
            .or_insert(0) += damage;
    }

    /// Top cumulative contributor against `victim`, if any damage was
    /// recorded. Ties resolve to the lowest attacker id so credit is
    /// deterministic across runs.
    pub fn top_contributor(&self, victim: ActorId) -> Option<ActorId> {
        self.entries.get(&victim).and_then(|per_attacker| {
            per_attacker
                .iter()
                .max_by(|(a_id, a_dmg), (b_id, b_dmg)| {
                    a_dmg.cmp(b_dmg).then(b_id.cmp(a_id))
                })
                .map(|(id, _)| *id)
        })
    }

    /// Total damage recorded against `victim` this life.
    pub fn total_against(&self, victim: ActorId) -> u32 {
        self.entries
            .get(&victim)
            .map(|per_attacker| per_attacker.values().sum())
            .unwrap_or(0)
    }

    /// Drops the victim's entry; called when the victim dies.
    pub fn clear_victim(&mut self, victim: ActorId) {
        self.entries.remove(&victim);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{NpcId, PlayerId};

    fn p(id: u32) -> ActorId {
        ActorId::Player(PlayerId(id))
    }

    #[test]
    fn top_contributor_is_cumulative() {
        let mut ledger = DamageLedger::new();
        let victim = ActorId::Npc(NpcId(1));
        ledger.record(victim, p(1), 4);
        ledger.record(victim, p(2), 3);
        ledger.record(victim, p(2), 3);
        assert_eq!(ledger.top_contributor(victim), Some(p(2)));
        assert_eq!(ledger.total_against(victim), 10);
    }

    #[test]
    fn ties_break_to_lowest_attacker_id() {
        let mut ledger = DamageLedger::new();
        let victim = ActorId::Npc(NpcId(1));
        ledger.record(victim, p(9), 5);
        ledger.record(victim, p(2), 5);
        assert_eq!(ledger.top_contributor(victim), Some(p(2)));
    }

    #[test]
    fn zero_damage_creates_no_entry() {
        let mut ledger = DamageLedger::new();
        ledger.record(ActorId::Npc(NpcId(1)), p(1), 0);
        assert!(ledger.is_empty());
        assert_eq!(ledger.top_contributor(ActorId::Npc(NpcId(1))), None);
    }

    #[test]
    fn clear_victim_resets_credit() {
        let mut ledger = DamageLedger::new();
        let victim = ActorId::Npc(NpcId(1));
        ledger.record(victim, p(1), 8);
        ledger.clear_victim(victim);
        assert_eq!(ledger.top_contributor(victim), None);
    }
}
