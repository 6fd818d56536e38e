use crate::entity::{buy_price, sell_price, transfer, EntityId, Item, MerchantId, Slot};
use crate::session::Session;

/// A deferred item action, captured as a value when the UI builds its menu
/// and executed later. Operands are ids, never references: every
/// precondition is re-validated at execution time because the world may
/// have changed between queuing and firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCommand {
    Take {
        actor: EntityId,
        item: Item,
        max_quantity: u32,
        container: EntityId,
    },
    TakeAll {
        actor: EntityId,
        container: EntityId,
    },
    Buy {
        actor: EntityId,
        item: Item,
        max_quantity: u32,
        merchant: MerchantId,
    },
    Sell {
        actor: EntityId,
        item: Item,
        max_quantity: u32,
        merchant: MerchantId,
    },
    SellEquipped {
        actor: EntityId,
        slot: Slot,
        merchant: MerchantId,
    },
    Drop {
        actor: EntityId,
        item: Item,
        max_quantity: u32,
    },
    DropEquipped {
        actor: EntityId,
        slot: Slot,
    },
    Give {
        actor: EntityId,
        item: Item,
        max_quantity: u32,
        target: EntityId,
    },
    GiveEquipped {
        actor: EntityId,
        slot: Slot,
        target: EntityId,
    },
    Equip {
        actor: EntityId,
        item: Item,
        slot: Option<Slot>,
    },
    Unequip {
        actor: EntityId,
        slot: Slot,
    },
    TakeAndEquip {
        actor: EntityId,
        item: Item,
        container: EntityId,
    },
}

impl ItemCommand {
    /// Upper bound the quantity prompt may offer. Commands without a
    /// quantity choice always operate on exactly one unit (or, for
    /// take-all, on whole entries).
    pub fn max_quantity(&self) -> u32 {
        match self {
            Self::Take { max_quantity, .. }
            | Self::Buy { max_quantity, .. }
            | Self::Sell { max_quantity, .. }
            | Self::Drop { max_quantity, .. }
            | Self::Give { max_quantity, .. } => (*max_quantity).max(1),
            Self::TakeAll { .. }
            | Self::SellEquipped { .. }
            | Self::DropEquipped { .. }
            | Self::GiveEquipped { .. }
            | Self::Equip { .. }
            | Self::Unequip { .. }
            | Self::TakeAndEquip { .. } => 1,
        }
    }

    pub fn actor(&self) -> EntityId {
        match self {
            Self::Take { actor, .. }
            | Self::TakeAll { actor, .. }
            | Self::Buy { actor, .. }
            | Self::Sell { actor, .. }
            | Self::SellEquipped { actor, .. }
            | Self::Drop { actor, .. }
            | Self::DropEquipped { actor, .. }
            | Self::Give { actor, .. }
            | Self::GiveEquipped { actor, .. }
            | Self::Equip { actor, .. }
            | Self::Unequip { actor, .. }
            | Self::TakeAndEquip { actor, .. } => *actor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Cost charged, state mutated, one refresh signal emitted.
    Committed,
    /// The command needs a quantity in 1..=max_quantity; re-enter through
    /// `Session::invoke_with_quantity` once the player has chosen.
    AwaitingQuantity { max_quantity: u32 },
    /// Nothing happened: no charge, no mutation, no signal.
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientActionPoints,
    QuestItem,
    InsufficientQuantity,
    IncompatibleSlot,
    NothingEquipped,
    NotEquippable,
    NotInInventory,
    InsufficientFunds,
    UnknownEntity,
    UnknownItem,
    UnknownMerchant,
}

impl RejectReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::InsufficientActionPoints => "not enough action points",
            Self::QuestItem => "quest items cannot leave their owner",
            Self::InsufficientQuantity => "not that many available",
            Self::IncompatibleSlot => "item does not fit that slot",
            Self::NothingEquipped => "nothing is equipped there",
            Self::NotEquippable => "item cannot be equipped",
            Self::NotInInventory => "item is not in the inventory",
            Self::InsufficientFunds => "not enough coin",
            Self::UnknownEntity => "no such entity",
            Self::UnknownItem => "no such item",
            Self::UnknownMerchant => "no such merchant",
        }
    }
}

/// Feedback the host UI consumes after command execution. A committed
/// command always produces exactly one `RefreshInterface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    HideMenu,
    RefreshInterface,
}

impl Session {
    /// Entry point for a freshly selected menu action. Quantity-bearing
    /// commands with more than one unit available come back as
    /// `AwaitingQuantity` so the UI can prompt without blocking the
    /// simulation thread.
    pub fn invoke(&mut self, command: ItemCommand) -> CommandOutcome {
        let max_quantity = command.max_quantity();
        if max_quantity > 1 {
            return CommandOutcome::AwaitingQuantity { max_quantity };
        }
        self.invoke_with_quantity(command, 1)
    }

    /// Re-entry point after the quantity prompt. The chosen quantity is
    /// clamped into 1..=max; preconditions are validated now, against
    /// current state.
    pub fn invoke_with_quantity(&mut self, command: ItemCommand, quantity: u32) -> CommandOutcome {
        let quantity = quantity.clamp(1, command.max_quantity());
        let result = match command {
            ItemCommand::Take {
                actor,
                item,
                container,
                ..
            } => self.execute_take(actor, item, quantity, container),
            ItemCommand::TakeAll { actor, container } => self.execute_take_all(actor, container),
            ItemCommand::Buy {
                actor,
                item,
                merchant,
                ..
            } => self.execute_buy(actor, item, quantity, merchant),
            ItemCommand::Sell {
                actor,
                item,
                merchant,
                ..
            } => self.execute_sell(actor, item, quantity, merchant),
            ItemCommand::SellEquipped {
                actor,
                slot,
                merchant,
            } => self.execute_sell_equipped(actor, slot, merchant),
            ItemCommand::Drop { actor, item, .. } => self.execute_drop(actor, item, quantity),
            ItemCommand::DropEquipped { actor, slot } => self.execute_drop_equipped(actor, slot),
            ItemCommand::Give {
                actor,
                item,
                target,
                ..
            } => self.execute_give(actor, item, quantity, target),
            ItemCommand::GiveEquipped {
                actor,
                slot,
                target,
            } => self.execute_give_equipped(actor, slot, target),
            ItemCommand::Equip { actor, item, slot } => self.execute_equip(actor, item, slot),
            ItemCommand::Unequip { actor, slot } => self.execute_unequip(actor, slot),
            ItemCommand::TakeAndEquip {
                actor,
                item,
                container,
            } => self.execute_take_and_equip(actor, item, container),
        };

        match result {
            Ok(()) => {
                self.push_ui_signal(UiSignal::HideMenu);
                self.push_ui_signal(UiSignal::RefreshInterface);
                CommandOutcome::Committed
            }
            Err(reason) => CommandOutcome::Rejected(reason),
        }
    }

    /// The label shown on the quantity popup's value line for trade
    /// commands, recomputed per chosen quantity.
    pub fn price_quote(&self, command: ItemCommand, quantity: u32) -> Option<String> {
        match command {
            ItemCommand::Buy { item, merchant, .. } => {
                let base_value = self.templates().item(item.template)?.base_value;
                let merchant = self.merchant(merchant)?;
                let price = buy_price(base_value, quantity, merchant.current_sell_percentage());
                Some(format!("Price: {price}"))
            }
            ItemCommand::Sell { item, merchant, .. } => {
                let base_value = self.templates().item(item.template)?.base_value;
                let merchant = self.merchant(merchant)?;
                let price = sell_price(base_value, quantity, merchant.current_buy_percentage());
                Some(format!("Price: {price}"))
            }
            _ => None,
        }
    }

    fn execute_take(
        &mut self,
        actor: EntityId,
        item: Item,
        quantity: u32,
        container_id: EntityId,
    ) -> Result<(), RejectReason> {
        if self.templates().item(item.template).is_none() {
            return Err(RejectReason::UnknownItem);
        }
        let cost = self.costs().pick_up_item;
        let (creature, container) = self
            .area_mut()
            .creature_and_container_mut(actor, container_id)
            .ok_or(RejectReason::UnknownEntity)?;
        if container.items().quantity(item) < quantity {
            return Err(RejectReason::InsufficientQuantity);
        }
        if !creature.timer.perform_action(cost) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        transfer(
            item,
            quantity,
            container.items_mut(),
            creature.inventory.unequipped_mut(),
        );
        self.area_mut().remove_container_if_spent(container_id);
        Ok(())
    }

    /// Takes container entries one by one, each charged separately; stops
    /// at the first refused charge, leaving the remainder in place. An
    /// empty container is a successful no-op, matching the menu action.
    fn execute_take_all(
        &mut self,
        actor: EntityId,
        container_id: EntityId,
    ) -> Result<(), RejectReason> {
        let cost = self.costs().pick_up_item;
        let (creature, container) = self
            .area_mut()
            .creature_and_container_mut(actor, container_id)
            .ok_or(RejectReason::UnknownEntity)?;

        let entries = container.items().entries().to_vec();
        let mut moved = 0usize;
        for entry in &entries {
            if !creature.timer.perform_action(cost) {
                break;
            }
            container.items_mut().remove(entry.item, entry.quantity);
            creature
                .inventory
                .unequipped_mut()
                .add(entry.item, entry.quantity);
            moved += 1;
        }

        if moved == 0 && !entries.is_empty() {
            return Err(RejectReason::InsufficientActionPoints);
        }
        self.area_mut().remove_container_if_spent(container_id);
        Ok(())
    }

    fn execute_buy(
        &mut self,
        actor: EntityId,
        item: Item,
        quantity: u32,
        merchant_id: MerchantId,
    ) -> Result<(), RejectReason> {
        let base_value = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?
            .base_value;
        let sell_percentage = self
            .merchant(merchant_id)
            .ok_or(RejectReason::UnknownMerchant)?
            .current_sell_percentage();
        let stock_quantity = self
            .merchant(merchant_id)
            .map(|merchant| merchant.stock().quantity(item))
            .unwrap_or(0);
        if stock_quantity < quantity {
            return Err(RejectReason::InsufficientQuantity);
        }
        let price = buy_price(base_value, quantity, sell_percentage);
        if price > self.party_funds() {
            return Err(RejectReason::InsufficientFunds);
        }

        let cost = self.costs().pick_up_item;
        let creature = self
            .area_mut()
            .creature_mut(actor)
            .ok_or(RejectReason::UnknownEntity)?;
        if !creature.timer.perform_action(cost) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        creature.inventory.unequipped_mut().add(item, quantity);
        self.merchant_mut(merchant_id)
            .expect("merchant checked above")
            .stock_mut()
            .remove(item, quantity);
        self.spend_party_funds(price);
        Ok(())
    }

    fn execute_sell(
        &mut self,
        actor: EntityId,
        item: Item,
        quantity: u32,
        merchant_id: MerchantId,
    ) -> Result<(), RejectReason> {
        let template = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?;
        if template.quest {
            return Err(RejectReason::QuestItem);
        }
        let base_value = template.base_value;
        let buy_percentage = self
            .merchant(merchant_id)
            .ok_or(RejectReason::UnknownMerchant)?
            .current_buy_percentage();

        let creature = self
            .area_mut()
            .creature_mut(actor)
            .ok_or(RejectReason::UnknownEntity)?;
        if creature.inventory.unequipped().quantity(item) < quantity {
            return Err(RejectReason::InsufficientQuantity);
        }
        // Selling costs no time, but still passes the gate so every
        // mutation shares the same choke point.
        if !creature.timer.perform_action(0) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        creature.inventory.unequipped_mut().remove(item, quantity);
        let price = sell_price(base_value, quantity, buy_percentage);
        self.merchant_mut(merchant_id)
            .expect("merchant checked above")
            .stock_mut()
            .add(item, quantity);
        self.earn_party_funds(price);
        Ok(())
    }

    fn execute_sell_equipped(
        &mut self,
        actor: EntityId,
        slot: Slot,
        merchant_id: MerchantId,
    ) -> Result<(), RejectReason> {
        if self.merchant(merchant_id).is_none() {
            return Err(RejectReason::UnknownMerchant);
        }
        let item = self
            .area()
            .creature(actor)
            .ok_or(RejectReason::UnknownEntity)?
            .inventory
            .equipped(slot)
            .ok_or(RejectReason::NothingEquipped)?;
        let template = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?;
        if template.quest {
            return Err(RejectReason::QuestItem);
        }
        let base_value = template.base_value;
        let buy_percentage = self
            .merchant(merchant_id)
            .expect("merchant checked above")
            .current_buy_percentage();

        let creature = self
            .area_mut()
            .creature_mut(actor)
            .expect("creature checked above");
        if !creature.timer.perform_action(0) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        creature.inventory.take_equipped(slot);
        let price = sell_price(base_value, 1, buy_percentage);
        self.merchant_mut(merchant_id)
            .expect("merchant checked above")
            .stock_mut()
            .add(item, 1);
        self.earn_party_funds(price);
        Ok(())
    }

    fn execute_drop(
        &mut self,
        actor: EntityId,
        item: Item,
        quantity: u32,
    ) -> Result<(), RejectReason> {
        let template = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?;
        if template.quest {
            return Err(RejectReason::QuestItem);
        }
        let cost = self.costs().drop_item;
        let creature = self
            .area()
            .creature(actor)
            .ok_or(RejectReason::UnknownEntity)?;
        if creature.inventory.unequipped().quantity(item) < quantity {
            return Err(RejectReason::InsufficientQuantity);
        }
        let feet = creature.location;

        let gate_passed = self
            .area_mut()
            .creature_mut(actor)
            .expect("creature checked above")
            .timer
            .perform_action(cost);
        if !gate_passed {
            return Err(RejectReason::InsufficientActionPoints);
        }

        // With the charge accepted, the drop target resolves as part of the
        // commit: the open container when one is on screen, else a pile at
        // the actor's feet.
        let container_id = self.resolve_drop_target(feet);
        let (creature, container) = self
            .area_mut()
            .creature_and_container_mut(actor, container_id)
            .expect("drop target resolved above");
        creature.inventory.unequipped_mut().remove(item, quantity);
        container.items_mut().add(item, quantity);
        Ok(())
    }

    fn execute_drop_equipped(&mut self, actor: EntityId, slot: Slot) -> Result<(), RejectReason> {
        let item = self
            .area()
            .creature(actor)
            .ok_or(RejectReason::UnknownEntity)?
            .inventory
            .equipped(slot)
            .ok_or(RejectReason::NothingEquipped)?;
        let template = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?;
        if template.quest {
            return Err(RejectReason::QuestItem);
        }
        let cost = self.costs().drop_item;
        let feet = self
            .area()
            .creature(actor)
            .expect("creature checked above")
            .location;

        let gate_passed = self
            .area_mut()
            .creature_mut(actor)
            .expect("creature checked above")
            .timer
            .perform_action(cost);
        if !gate_passed {
            return Err(RejectReason::InsufficientActionPoints);
        }

        let container_id = self.resolve_drop_target(feet);
        let (creature, container) = self
            .area_mut()
            .creature_and_container_mut(actor, container_id)
            .expect("drop target resolved above");
        creature.inventory.take_equipped(slot);
        container.items_mut().add(item, 1);
        Ok(())
    }

    fn execute_give(
        &mut self,
        actor: EntityId,
        item: Item,
        quantity: u32,
        target: EntityId,
    ) -> Result<(), RejectReason> {
        let template = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?;
        if template.quest {
            return Err(RejectReason::QuestItem);
        }
        let cost = self.costs().give_item;
        let (giver, receiver) = self
            .area_mut()
            .creature_pair_mut(actor, target)
            .ok_or(RejectReason::UnknownEntity)?;
        if giver.inventory.unequipped().quantity(item) < quantity {
            return Err(RejectReason::InsufficientQuantity);
        }
        if !giver.timer.perform_action(cost) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        transfer(
            item,
            quantity,
            giver.inventory.unequipped_mut(),
            receiver.inventory.unequipped_mut(),
        );
        Ok(())
    }

    fn execute_give_equipped(
        &mut self,
        actor: EntityId,
        slot: Slot,
        target: EntityId,
    ) -> Result<(), RejectReason> {
        let item = self
            .area()
            .creature(actor)
            .ok_or(RejectReason::UnknownEntity)?
            .inventory
            .equipped(slot)
            .ok_or(RejectReason::NothingEquipped)?;
        let template = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?;
        if template.quest {
            return Err(RejectReason::QuestItem);
        }
        let cost = self.costs().give_item;
        let (giver, receiver) = self
            .area_mut()
            .creature_pair_mut(actor, target)
            .ok_or(RejectReason::UnknownEntity)?;
        if !giver.timer.perform_action(cost) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        giver.inventory.take_equipped(slot);
        receiver.inventory.unequipped_mut().add(item, 1);
        Ok(())
    }

    fn execute_equip(
        &mut self,
        actor: EntityId,
        item: Item,
        slot: Option<Slot>,
    ) -> Result<(), RejectReason> {
        let profile = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?
            .equip
            .ok_or(RejectReason::NotEquippable)?;
        let creature = self
            .area_mut()
            .creature_mut(actor)
            .ok_or(RejectReason::UnknownEntity)?;
        if creature.inventory.resolve_equip_slot(profile, slot).is_none() {
            return Err(RejectReason::IncompatibleSlot);
        }
        if !creature.inventory.unequipped().contains(item) {
            return Err(RejectReason::NotInInventory);
        }
        if !creature.timer.perform_equip_action(profile) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        creature.inventory.equip(item, profile, slot);
        Ok(())
    }

    fn execute_unequip(&mut self, actor: EntityId, slot: Slot) -> Result<(), RejectReason> {
        let item = self
            .area()
            .creature(actor)
            .ok_or(RejectReason::UnknownEntity)?
            .inventory
            .equipped(slot)
            .ok_or(RejectReason::NothingEquipped)?;
        let profile = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?
            .equip
            .ok_or(RejectReason::NotEquippable)?;
        let creature = self
            .area_mut()
            .creature_mut(actor)
            .expect("creature checked above");
        if !creature.timer.perform_equip_action(profile) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        creature.inventory.unequip(slot);
        Ok(())
    }

    /// Takes the item out of the container and wields it in one action,
    /// charged once at the combined pick-up-and-wield rate.
    fn execute_take_and_equip(
        &mut self,
        actor: EntityId,
        item: Item,
        container_id: EntityId,
    ) -> Result<(), RejectReason> {
        let profile = self
            .templates()
            .item(item.template)
            .ok_or(RejectReason::UnknownItem)?
            .equip
            .ok_or(RejectReason::NotEquippable)?;
        let cost = self.costs().pick_up_and_wield_item;
        let (creature, container) = self
            .area_mut()
            .creature_and_container_mut(actor, container_id)
            .ok_or(RejectReason::UnknownEntity)?;
        if !container.items().contains(item) {
            return Err(RejectReason::InsufficientQuantity);
        }
        if creature.inventory.resolve_equip_slot(profile, None).is_none() {
            return Err(RejectReason::IncompatibleSlot);
        }
        if !creature.timer.perform_action(cost) {
            return Err(RejectReason::InsufficientActionPoints);
        }
        container.items_mut().remove(item, 1);
        creature.inventory.unequipped_mut().add(item, 1);
        creature.inventory.equip(item, profile, None);
        self.area_mut().remove_container_if_spent(container_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TemplateDatabase;
    use crate::entity::{
        ContainerTemplate, ContainerTemplateId, CreatureTemplate, CreatureTemplateId, EquipClass,
        EquipProfile, ItemTemplate, ItemTemplateId, Quality,
    };
    use crate::hex::HexPoint;
    use crate::rules::ActionCosts;
    use crate::Area;

    const ROUND_AP: i32 = 10_000;

    const COSTS: ActionCosts = ActionCosts {
        pick_up_item: 1200,
        drop_item: 600,
        give_item: 800,
        pick_up_and_wield_item: 2000,
        action_points_per_round: ROUND_AP,
    };

    fn item_template(
        id: u32,
        def_name: &str,
        base_value: i32,
        quest: bool,
        equip: Option<EquipProfile>,
    ) -> ItemTemplate {
        ItemTemplate {
            id: ItemTemplateId(id),
            def_name: def_name.to_string(),
            label: def_name.to_string(),
            base_value,
            quest,
            icon: None,
            equip,
        }
    }

    fn templates() -> TemplateDatabase {
        TemplateDatabase::from_templates(
            vec![
                item_template(
                    0,
                    "ironSword",
                    30,
                    false,
                    Some(EquipProfile {
                        class: EquipClass::Weapon,
                        equip_cost: 1000,
                    }),
                ),
                item_template(1, "ration", 10, false, None),
                item_template(2, "sealedWrit", 100, true, None),
                item_template(
                    3,
                    "oakShield",
                    25,
                    false,
                    Some(EquipProfile {
                        class: EquipClass::Shield,
                        equip_cost: 700,
                    }),
                ),
            ],
            vec![CreatureTemplate {
                id: CreatureTemplateId(0),
                def_name: "wanderer".to_string(),
                label: "Wanderer".to_string(),
                portrait: None,
            }],
            vec![
                ContainerTemplate {
                    id: ContainerTemplateId(0),
                    def_name: "groundPile".to_string(),
                    label: "Ground".to_string(),
                    temporary: true,
                    icon: None,
                },
                ContainerTemplate {
                    id: ContainerTemplateId(1),
                    def_name: "chest".to_string(),
                    label: "Chest".to_string(),
                    temporary: false,
                    icon: None,
                },
            ],
        )
    }

    struct Fixture {
        session: Session,
        actor: EntityId,
        companion: EntityId,
        chest: EntityId,
        pile: EntityId,
        merchant: MerchantId,
        sword: Item,
        ration: Item,
        writ: Item,
        shield: Item,
    }

    fn fixture() -> Fixture {
        let database = templates();
        let ground_pile = database
            .container(ContainerTemplateId(0))
            .expect("ground pile template")
            .clone();
        let chest_template = database
            .container(ContainerTemplateId(1))
            .expect("chest template")
            .clone();

        let mut area = Area::new("glade", ground_pile);
        let actor = area.spawn_creature(CreatureTemplateId(0), "Aldric", HexPoint::new(0, 0), ROUND_AP);
        let companion =
            area.spawn_creature(CreatureTemplateId(0), "Brena", HexPoint::new(1, 0), ROUND_AP);
        let chest = area.spawn_container(&chest_template, HexPoint::new(0, 1));
        let pile = area.ground_container_at(HexPoint::new(1, 1));

        let mut session = Session::new(database, COSTS, area);
        session.add_party_member(actor);
        session.add_party_member(companion);
        session.set_party_funds(100);
        let merchant = session.add_merchant("Trader", 50, 150);

        let sword = Item::of_template(ItemTemplateId(0));
        let ration = Item::of_template(ItemTemplateId(1));
        let writ = Item::of_template(ItemTemplateId(2));
        let shield = Item::of_template(ItemTemplateId(3));

        Fixture {
            session,
            actor,
            companion,
            chest,
            pile,
            merchant,
            sword,
            ration,
            writ,
            shield,
        }
    }

    fn actor_unequipped_quantity(fixture: &Fixture, item: Item) -> u32 {
        fixture
            .session
            .area()
            .creature(fixture.actor)
            .expect("actor")
            .inventory
            .unequipped()
            .quantity(item)
    }

    fn actor_remaining_ap(fixture: &Fixture) -> i32 {
        fixture
            .session
            .area()
            .creature(fixture.actor)
            .expect("actor")
            .timer
            .remaining()
    }

    fn drain_refresh_count(session: &mut Session) -> usize {
        session
            .drain_ui_signals()
            .into_iter()
            .filter(|signal| *signal == UiSignal::RefreshInterface)
            .count()
    }

    #[test]
    fn take_moves_item_and_charges_pickup_cost() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .add(f.sword, 1);

        let outcome = f.session.invoke(ItemCommand::Take {
            actor: f.actor,
            item: f.sword,
            max_quantity: 1,
            container: f.chest,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(actor_unequipped_quantity(&f, f.sword), 1);
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - COSTS.pick_up_item);
        assert!(f
            .session
            .area()
            .container(f.chest)
            .expect("chest stays")
            .is_empty());
    }

    #[test]
    fn rejected_gate_leaves_state_byte_for_byte_unchanged() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .add(f.ration, 1);
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .timer
            .perform_action(ROUND_AP - 100);
        let before = f.session.area().clone();

        let outcome = f.session.invoke(ItemCommand::Take {
            actor: f.actor,
            item: f.ration,
            max_quantity: 1,
            container: f.chest,
        });

        assert_eq!(
            outcome,
            CommandOutcome::Rejected(RejectReason::InsufficientActionPoints)
        );
        assert_eq!(*f.session.area(), before);
        assert_eq!(drain_refresh_count(&mut f.session), 0);
    }

    #[test]
    fn quantity_commands_await_a_choice_then_commit() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .add(f.ration, 5);

        let command = ItemCommand::Take {
            actor: f.actor,
            item: f.ration,
            max_quantity: 5,
            container: f.chest,
        };
        let outcome = f.session.invoke(command);
        assert_eq!(outcome, CommandOutcome::AwaitingQuantity { max_quantity: 5 });
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 0);

        let outcome = f.session.invoke_with_quantity(command, 3);
        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 3);
    }

    #[test]
    fn chosen_quantity_is_clamped_to_the_command_bound() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .add(f.ration, 2);

        let command = ItemCommand::Take {
            actor: f.actor,
            item: f.ration,
            max_quantity: 2,
            container: f.chest,
        };
        assert_eq!(
            f.session.invoke_with_quantity(command, 99),
            CommandOutcome::Committed
        );
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 2);
    }

    #[test]
    fn stale_quantity_is_revalidated_at_execution_time() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .add(f.ration, 4);
        let command = ItemCommand::Take {
            actor: f.actor,
            item: f.ration,
            max_quantity: 4,
            container: f.chest,
        };
        assert!(matches!(
            f.session.invoke(command),
            CommandOutcome::AwaitingQuantity { .. }
        ));

        // Someone else empties most of the chest while the prompt is open.
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .remove(f.ration, 3);

        assert_eq!(
            f.session.invoke_with_quantity(command, 4),
            CommandOutcome::Rejected(RejectReason::InsufficientQuantity)
        );
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 0);
    }

    #[test]
    fn take_all_empties_container_and_removes_temporary_pile() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.pile)
            .expect("pile")
            .items_mut()
            .add(f.ration, 3);
        f.session
            .area_mut()
            .container_mut(f.pile)
            .expect("pile")
            .items_mut()
            .add(f.sword, 1);

        let outcome = f.session.invoke(ItemCommand::TakeAll {
            actor: f.actor,
            container: f.pile,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 3);
        assert_eq!(actor_unequipped_quantity(&f, f.sword), 1);
        assert!(f.session.area().container(f.pile).is_none());
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - 2 * COSTS.pick_up_item);
    }

    #[test]
    fn take_all_stops_at_the_budget_and_keeps_the_remainder() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.pile)
            .expect("pile")
            .items_mut()
            .add(f.ration, 2);
        f.session
            .area_mut()
            .container_mut(f.pile)
            .expect("pile")
            .items_mut()
            .add(f.sword, 1);
        // Budget for exactly one pick-up.
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .timer
            .perform_action(ROUND_AP - COSTS.pick_up_item);

        let outcome = f.session.invoke(ItemCommand::TakeAll {
            actor: f.actor,
            container: f.pile,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 2);
        assert_eq!(actor_unequipped_quantity(&f, f.sword), 0);
        let pile = f.session.area().container(f.pile).expect("pile remains");
        assert_eq!(pile.items().quantity(f.sword), 1);
    }

    #[test]
    fn buy_scenario_charges_price_and_stock_and_gate() {
        let mut f = fixture();
        f.session
            .merchant_mut(f.merchant)
            .expect("merchant")
            .stock_mut()
            .add(f.ration, 10);

        let command = ItemCommand::Buy {
            actor: f.actor,
            item: f.ration,
            max_quantity: 10,
            merchant: f.merchant,
        };
        assert_eq!(
            f.session.price_quote(command, 3).expect("quote"),
            "Price: 45"
        );
        let outcome = f.session.invoke_with_quantity(command, 3);

        assert_eq!(outcome, CommandOutcome::Committed);
        // 10 * 3 * 150 / 100 = 45 out of the starting 100.
        assert_eq!(f.session.party_funds(), 55);
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 3);
        assert_eq!(
            f.session
                .merchant(f.merchant)
                .expect("merchant")
                .stock()
                .quantity(f.ration),
            7
        );
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - COSTS.pick_up_item);
    }

    #[test]
    fn buy_rejected_when_gate_refuses_changes_nothing() {
        let mut f = fixture();
        f.session
            .merchant_mut(f.merchant)
            .expect("merchant")
            .stock_mut()
            .add(f.ration, 10);
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .timer
            .perform_action(ROUND_AP);
        let area_before = f.session.area().clone();
        let funds_before = f.session.party_funds();

        let outcome = f.session.invoke_with_quantity(
            ItemCommand::Buy {
                actor: f.actor,
                item: f.ration,
                max_quantity: 10,
                merchant: f.merchant,
            },
            3,
        );

        assert_eq!(
            outcome,
            CommandOutcome::Rejected(RejectReason::InsufficientActionPoints)
        );
        assert_eq!(*f.session.area(), area_before);
        assert_eq!(f.session.party_funds(), funds_before);
        assert_eq!(
            f.session
                .merchant(f.merchant)
                .expect("merchant")
                .stock()
                .quantity(f.ration),
            10
        );
    }

    #[test]
    fn buy_rejected_without_funds() {
        let mut f = fixture();
        f.session
            .merchant_mut(f.merchant)
            .expect("merchant")
            .stock_mut()
            .add(f.sword, 1);
        f.session.set_party_funds(10);

        // Sword: 30 * 1 * 150 / 100 = 45 > 10.
        let outcome = f.session.invoke(ItemCommand::Buy {
            actor: f.actor,
            item: f.sword,
            max_quantity: 1,
            merchant: f.merchant,
        });
        assert_eq!(
            outcome,
            CommandOutcome::Rejected(RejectReason::InsufficientFunds)
        );
        assert_eq!(f.session.party_funds(), 10);
        assert_eq!(actor_remaining_ap(&f), ROUND_AP);
    }

    #[test]
    fn sell_earns_the_marked_down_price() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.ration, 4);

        let outcome = f.session.invoke_with_quantity(
            ItemCommand::Sell {
                actor: f.actor,
                item: f.ration,
                max_quantity: 4,
                merchant: f.merchant,
            },
            4,
        );

        assert_eq!(outcome, CommandOutcome::Committed);
        // 10 * 4 * 50 / 100 = 20 on top of the starting 100.
        assert_eq!(f.session.party_funds(), 120);
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 0);
        assert_eq!(
            f.session
                .merchant(f.merchant)
                .expect("merchant")
                .stock()
                .quantity(f.ration),
            4
        );
    }

    #[test]
    fn quest_item_never_leaves_its_owner() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.writ, 1);
        let before = f.session.area().clone();

        let drop = f.session.invoke(ItemCommand::Drop {
            actor: f.actor,
            item: f.writ,
            max_quantity: 1,
        });
        let sell = f.session.invoke(ItemCommand::Sell {
            actor: f.actor,
            item: f.writ,
            max_quantity: 1,
            merchant: f.merchant,
        });
        let give = f.session.invoke(ItemCommand::Give {
            actor: f.actor,
            item: f.writ,
            max_quantity: 1,
            target: f.companion,
        });

        for outcome in [drop, sell, give] {
            assert_eq!(outcome, CommandOutcome::Rejected(RejectReason::QuestItem));
        }
        assert_eq!(*f.session.area(), before);
        assert_eq!(f.session.party_funds(), 100);
    }

    #[test]
    fn drop_lands_in_open_container_when_one_is_open() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.ration, 1);
        f.session.set_open_container(Some(f.chest));

        let outcome = f.session.invoke(ItemCommand::Drop {
            actor: f.actor,
            item: f.ration,
            max_quantity: 1,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(
            f.session
                .area()
                .container(f.chest)
                .expect("chest")
                .items()
                .quantity(f.ration),
            1
        );
    }

    #[test]
    fn drop_without_open_container_piles_at_the_actor_feet() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.ration, 2);

        let outcome = f.session.invoke_with_quantity(
            ItemCommand::Drop {
                actor: f.actor,
                item: f.ration,
                max_quantity: 2,
            },
            2,
        );

        assert_eq!(outcome, CommandOutcome::Committed);
        let feet = f
            .session
            .area()
            .creature(f.actor)
            .expect("actor")
            .location;
        let pile_id = f.session.area().container_at(feet).expect("pile at feet");
        let pile = f.session.area().container(pile_id).expect("pile");
        assert!(pile.temporary);
        assert_eq!(pile.items().quantity(f.ration), 2);
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - COSTS.drop_item);
    }

    #[test]
    fn give_moves_items_between_party_members() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.ration, 3);

        let outcome = f.session.invoke_with_quantity(
            ItemCommand::Give {
                actor: f.actor,
                item: f.ration,
                max_quantity: 3,
                target: f.companion,
            },
            2,
        );

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(actor_unequipped_quantity(&f, f.ration), 1);
        assert_eq!(
            f.session
                .area()
                .creature(f.companion)
                .expect("companion")
                .inventory
                .unequipped()
                .quantity(f.ration),
            2
        );
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - COSTS.give_item);
    }

    #[test]
    fn equip_and_unequip_charge_the_item_swap_cost() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.sword, 1);

        let outcome = f.session.invoke(ItemCommand::Equip {
            actor: f.actor,
            item: f.sword,
            slot: None,
        });
        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(
            f.session
                .area()
                .creature(f.actor)
                .expect("actor")
                .inventory
                .equipped(Slot::MainHand),
            Some(f.sword)
        );
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - 1000);

        let outcome = f.session.invoke(ItemCommand::Unequip {
            actor: f.actor,
            slot: Slot::MainHand,
        });
        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(actor_unequipped_quantity(&f, f.sword), 1);
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - 2000);
    }

    #[test]
    fn equip_to_incompatible_slot_is_rejected() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.shield, 1);

        let outcome = f.session.invoke(ItemCommand::Equip {
            actor: f.actor,
            item: f.shield,
            slot: Some(Slot::MainHand),
        });
        assert_eq!(
            outcome,
            CommandOutcome::Rejected(RejectReason::IncompatibleSlot)
        );
        assert_eq!(actor_remaining_ap(&f), ROUND_AP);
    }

    #[test]
    fn take_and_equip_is_charged_once_at_the_wield_rate() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.pile)
            .expect("pile")
            .items_mut()
            .add(f.sword, 1);

        let outcome = f.session.invoke(ItemCommand::TakeAndEquip {
            actor: f.actor,
            item: f.sword,
            container: f.pile,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(
            f.session
                .area()
                .creature(f.actor)
                .expect("actor")
                .inventory
                .equipped(Slot::MainHand),
            Some(f.sword)
        );
        assert_eq!(actor_unequipped_quantity(&f, f.sword), 0);
        assert_eq!(actor_remaining_ap(&f), ROUND_AP - COSTS.pick_up_and_wield_item);
        assert!(f.session.area().container(f.pile).is_none());
    }

    #[test]
    fn sell_equipped_moves_slot_item_to_merchant_stock() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.sword, 1);
        assert_eq!(
            f.session.invoke(ItemCommand::Equip {
                actor: f.actor,
                item: f.sword,
                slot: None,
            }),
            CommandOutcome::Committed
        );
        f.session.drain_ui_signals();

        let outcome = f.session.invoke(ItemCommand::SellEquipped {
            actor: f.actor,
            slot: Slot::MainHand,
            merchant: f.merchant,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        // 30 * 1 * 50 / 100 = 15.
        assert_eq!(f.session.party_funds(), 115);
        assert_eq!(
            f.session
                .area()
                .creature(f.actor)
                .expect("actor")
                .inventory
                .equipped(Slot::MainHand),
            None
        );
        assert_eq!(actor_unequipped_quantity(&f, f.sword), 0);
    }

    #[test]
    fn give_equipped_hands_the_slot_item_to_the_target() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.shield, 1);
        assert_eq!(
            f.session.invoke(ItemCommand::Equip {
                actor: f.actor,
                item: f.shield,
                slot: None,
            }),
            CommandOutcome::Committed
        );

        let outcome = f.session.invoke(ItemCommand::GiveEquipped {
            actor: f.actor,
            slot: Slot::OffHand,
            target: f.companion,
        });

        assert_eq!(outcome, CommandOutcome::Committed);
        assert_eq!(
            f.session
                .area()
                .creature(f.companion)
                .expect("companion")
                .inventory
                .unequipped()
                .quantity(f.shield),
            1
        );
        assert_eq!(actor_unequipped_quantity(&f, f.shield), 0);
    }

    #[test]
    fn committed_command_emits_exactly_one_refresh() {
        let mut f = fixture();
        f.session
            .area_mut()
            .container_mut(f.chest)
            .expect("chest")
            .items_mut()
            .add(f.sword, 1);

        f.session.invoke(ItemCommand::Take {
            actor: f.actor,
            item: f.sword,
            max_quantity: 1,
            container: f.chest,
        });
        let signals = f.session.drain_ui_signals();
        assert_eq!(
            signals,
            vec![UiSignal::HideMenu, UiSignal::RefreshInterface]
        );
        assert!(f.session.drain_ui_signals().is_empty());
    }

    #[test]
    fn dropping_onto_an_occupied_tile_reuses_the_existing_pile() {
        let mut f = fixture();
        f.session
            .area_mut()
            .creature_mut(f.actor)
            .expect("actor")
            .inventory
            .unequipped_mut()
            .add(f.ration, 2);

        assert_eq!(
            f.session.invoke_with_quantity(
                ItemCommand::Drop {
                    actor: f.actor,
                    item: f.ration,
                    max_quantity: 2,
                },
                1,
            ),
            CommandOutcome::Committed
        );
        let container_count = f.session.area().containers().len();
        assert_eq!(
            f.session.invoke_with_quantity(
                ItemCommand::Drop {
                    actor: f.actor,
                    item: f.ration,
                    max_quantity: 1,
                },
                1,
            ),
            CommandOutcome::Committed
        );
        assert_eq!(f.session.area().containers().len(), container_count);
    }
}
