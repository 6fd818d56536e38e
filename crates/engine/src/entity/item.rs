use super::inventory::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemTemplateId(pub u32);

/// Capability class of an equippable item; decides which slots may hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipClass {
    Weapon,
    Shield,
    Armor,
    Helmet,
    Gloves,
    Boots,
    Amulet,
    Ring,
}

impl EquipClass {
    pub fn compatible_slots(self) -> &'static [Slot] {
        match self {
            Self::Weapon => &[Slot::MainHand],
            Self::Shield => &[Slot::OffHand],
            Self::Armor => &[Slot::Armor],
            Self::Helmet => &[Slot::Helmet],
            Self::Gloves => &[Slot::Gloves],
            Self::Boots => &[Slot::Boots],
            Self::Amulet => &[Slot::Amulet],
            Self::Ring => &[Slot::Ring],
        }
    }

    pub fn is_compatible_with(self, slot: Slot) -> bool {
        self.compatible_slots().contains(&slot)
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Weapon" => Some(Self::Weapon),
            "Shield" => Some(Self::Shield),
            "Armor" => Some(Self::Armor),
            "Helmet" => Some(Self::Helmet),
            "Gloves" => Some(Self::Gloves),
            "Boots" => Some(Self::Boots),
            "Amulet" => Some(Self::Amulet),
            "Ring" => Some(Self::Ring),
            _ => None,
        }
    }
}

/// Equip-time behavior of an item: where it goes and what swapping it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipProfile {
    pub class: EquipClass,
    /// Action points charged when this item moves in or out of a slot.
    pub equip_cost: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTemplate {
    pub id: ItemTemplateId,
    pub def_name: String,
    pub label: String,
    pub base_value: i32,
    /// Quest items may never leave the owning creature (drop, sell, give).
    pub quest: bool,
    pub icon: Option<String>,
    pub equip: Option<EquipProfile>,
}

/// Mutable quality tier; part of an item's stacking identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quality(pub u8);

/// An item reference as it lives inside lists and slots. Two items stack
/// together exactly when template and quality both match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    pub template: ItemTemplateId,
    pub quality: Quality,
}

impl Item {
    pub fn new(template: ItemTemplateId, quality: Quality) -> Self {
        Self { template, quality }
    }

    pub fn of_template(template: ItemTemplateId) -> Self {
        Self {
            template,
            quality: Quality::default(),
        }
    }
}
