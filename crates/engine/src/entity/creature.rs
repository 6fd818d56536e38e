use crate::hex::HexPoint;

use super::inventory::Inventory;
use super::timer::ActionTimer;
use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreatureTemplateId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureTemplate {
    pub id: CreatureTemplateId,
    pub def_name: String,
    pub label: String,
    pub portrait: Option<String>,
}

/// A creature standing on a world tile, carrying an inventory and the
/// action budget that gates everything it does this round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creature {
    pub id: EntityId,
    pub template: CreatureTemplateId,
    pub label: String,
    pub location: HexPoint,
    pub inventory: Inventory,
    pub timer: ActionTimer,
}

impl Creature {
    pub fn new(
        id: EntityId,
        template: CreatureTemplateId,
        label: impl Into<String>,
        location: HexPoint,
        round_action_points: i32,
    ) -> Self {
        Self {
            id,
            template,
            label: label.into(),
            location,
            inventory: Inventory::new(),
            timer: ActionTimer::new(round_action_points),
        }
    }
}
