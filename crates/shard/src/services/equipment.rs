//! In-memory equipment state: ammunition slots and reagent pouches.

use std::collections::BTreeMap;

use world_core::{EquipmentService, ItemId, PlayerId, Reagent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AmmoSlot {
    item: ItemId,
    count: u32,
}

/// Per-player ammunition and reagent storage.
///
/// This stands in for the full inventory system: the combat engine only
/// touches the equipped ammunition slot and the reagent pouch, so that is
/// all the runtime tracks here.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEquipment {
    ammo: BTreeMap<PlayerId, AmmoSlot>,
    reagents: BTreeMap<PlayerId, BTreeMap<ItemId, u32>>,
}

impl InMemoryEquipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equips `count` units of ammunition, replacing any current slot.
    pub fn equip_ammo(&mut self, player: PlayerId, item: ItemId, count: u32) {
        self.ammo.insert(player, AmmoSlot { item, count });
    }

    pub fn ammo_count(&self, player: PlayerId) -> u32 {
        self.ammo.get(&player).map_or(0, |slot| slot.count)
    }

    pub fn add_reagents(&mut self, player: PlayerId, item: ItemId, count: u32) {
        *self
            .reagents
            .entry(player)
            .or_default()
            .entry(item)
            .or_insert(0) += count;
    }

    pub fn reagent_count(&self, player: PlayerId, item: ItemId) -> u32 {
        self.reagents
            .get(&player)
            .and_then(|pouch| pouch.get(&item))
            .copied()
            .unwrap_or(0)
    }

    /// Drops all state for a player, e.g. on logout.
    pub fn clear_player(&mut self, player: PlayerId) {
        self.ammo.remove(&player);
        self.reagents.remove(&player);
    }
}

impl EquipmentService for InMemoryEquipment {
    fn equipped_ammo(&self, player: PlayerId) -> Option<ItemId> {
        self.ammo
            .get(&player)
            .filter(|slot| slot.count > 0)
            .map(|slot| slot.item)
    }

    fn consume_ammo(&mut self, player: PlayerId) -> Option<ItemId> {
        let slot = self.ammo.get_mut(&player).filter(|slot| slot.count > 0)?;
        slot.count -= 1;
        Some(slot.item)
    }

    fn consume_reagents(
        &mut self,
        player: PlayerId,
        recipe: &[Reagent],
        waived: Option<ItemId>,
    ) -> bool {
        let pouch = self.reagents.entry(player).or_default();
        let needed: Vec<&Reagent> = recipe
            .iter()
            .filter(|reagent| Some(reagent.item) != waived)
            .collect();
        // Check everything up front so a failure consumes nothing.
        let available = needed
            .iter()
            .all(|reagent| pouch.get(&reagent.item).copied().unwrap_or(0) >= reagent.amount);
        if !available {
            return false;
        }
        for reagent in needed {
            if let Some(count) = pouch.get_mut(&reagent.item) {
                *count -= reagent.amount;
            }
        }
        true
    }
}
