use super::item::{EquipProfile, Item};
use super::item_list::ItemList;

/// A named equip position holding at most one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    MainHand,
    OffHand,
    Armor,
    Helmet,
    Gloves,
    Boots,
    Amulet,
    Ring,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::MainHand,
        Slot::OffHand,
        Slot::Armor,
        Slot::Helmet,
        Slot::Gloves,
        Slot::Boots,
        Slot::Amulet,
        Slot::Ring,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::MainHand => "main_hand",
            Self::OffHand => "off_hand",
            Self::Armor => "armor",
            Self::Helmet => "helmet",
            Self::Gloves => "gloves",
            Self::Boots => "boots",
            Self::Amulet => "amulet",
            Self::Ring => "ring",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == token)
    }

    fn index(self) -> usize {
        match self {
            Self::MainHand => 0,
            Self::OffHand => 1,
            Self::Armor => 2,
            Self::Helmet => 3,
            Self::Gloves => 4,
            Self::Boots => 5,
            Self::Amulet => 6,
            Self::Ring => 7,
        }
    }
}

/// A creature's carried items: an unequipped list plus one item per slot.
/// An item reference lives in at most one of the two at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    unequipped: ItemList,
    equipped: [Option<Item>; Slot::ALL.len()],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unequipped(&self) -> &ItemList {
        &self.unequipped
    }

    pub fn unequipped_mut(&mut self) -> &mut ItemList {
        &mut self.unequipped
    }

    pub fn equipped(&self, slot: Slot) -> Option<Item> {
        self.equipped[slot.index()]
    }

    pub fn equipped_slots(&self) -> impl Iterator<Item = (Slot, Item)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.equipped(slot).map(|item| (slot, item)))
    }

    /// Picks the slot an equip of `profile` should target: the requested slot
    /// when given, otherwise the first empty compatible slot, otherwise the
    /// class's primary slot (whose occupant will be evicted).
    pub fn resolve_equip_slot(&self, profile: EquipProfile, requested: Option<Slot>) -> Option<Slot> {
        match requested {
            Some(slot) => profile.class.is_compatible_with(slot).then_some(slot),
            None => profile
                .class
                .compatible_slots()
                .iter()
                .copied()
                .find(|slot| self.equipped(*slot).is_none())
                .or_else(|| profile.class.compatible_slots().first().copied()),
        }
    }

    /// Moves one unit of `item` from the unequipped list into `slot`,
    /// returning any evicted occupant to the unequipped list. Fails without
    /// mutation when the slot is incompatible or the item is not carried.
    pub fn equip(&mut self, item: Item, profile: EquipProfile, requested: Option<Slot>) -> bool {
        let Some(slot) = self.resolve_equip_slot(profile, requested) else {
            return false;
        };
        if !self.unequipped.remove(item, 1) {
            return false;
        }
        if let Some(evicted) = self.equipped[slot.index()].take() {
            self.unequipped.add(evicted, 1);
        }
        self.equipped[slot.index()] = Some(item);
        true
    }

    /// Moves the item in `slot` back to the unequipped list.
    pub fn unequip(&mut self, slot: Slot) -> Option<Item> {
        let item = self.equipped[slot.index()].take()?;
        self.unequipped.add(item, 1);
        Some(item)
    }

    /// Removes the item in `slot` without returning it to the unequipped
    /// list; the caller takes ownership (give-equipped, sell-equipped).
    pub fn take_equipped(&mut self, slot: Slot) -> Option<Item> {
        self.equipped[slot.index()].take()
    }

    /// Counts every occurrence of `item` across the unequipped list and all
    /// slots. The equip-exclusivity invariant keeps slot occurrences 0 or 1
    /// per slot; the total is the creature-wide carried quantity.
    pub fn carried_quantity(&self, item: Item) -> u32 {
        let equipped = self
            .equipped
            .iter()
            .filter(|occupant| **occupant == Some(item))
            .count() as u32;
        self.unequipped.quantity(item).saturating_add(equipped)
    }
}
