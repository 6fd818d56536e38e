use engine::{
    CommandOutcome, EntityId, Item, ItemCommand, ItemList, MerchantId, Session, Slot,
    TemplateDatabase, UiSignal,
};
use tracing::debug;

/// Line-oriented command surface driving the session's item commands: the
/// headless stand-in for the right-click menu and its quantity popup. A
/// command that needs a quantity parks here as pending state and the next
/// numeric line re-enters it, so the simulation never blocks on the
/// prompt.
#[derive(Default)]
pub(crate) struct Console {
    selected_actor: Option<EntityId>,
    pending: Option<PendingQuantity>,
}

#[derive(Clone, Copy)]
struct PendingQuantity {
    command: ItemCommand,
    max_quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConsoleAction {
    None,
    Quit,
    ToMenu,
    Save,
    Load,
}

pub(crate) struct ConsoleResponse {
    pub(crate) text: String,
    pub(crate) action: ConsoleAction,
}

impl ConsoleResponse {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ConsoleAction::None,
        }
    }

    fn action(action: ConsoleAction) -> Self {
        Self {
            text: String::new(),
            action,
        }
    }
}

const HELP_TEXT: &str = "\
commands:
  status | party | inventory | look | trade
  take <item> [qty] | takeall | wield <item>
  drop <item> [qty] | dropequipped <slot>
  give <name> <item> [qty] | giveequipped <slot> <name>
  equip <item> [slot] | unequip <slot>
  buy <item> [qty] | sell <item> [qty] | sellequipped <slot>
  open | close | select <name> | endround
  save | load | menu | quit";

impl Console {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn handle_line(&mut self, session: &mut Session, line: &str) -> ConsoleResponse {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleResponse::text("");
        }

        if let Some(pending) = self.pending.take() {
            return self.finish_quantity_prompt(session, pending, line);
        }

        let mut tokens = line.split_whitespace();
        let keyword = tokens
            .next()
            .expect("non-empty line has a first token")
            .to_ascii_lowercase();
        let rest = tokens.collect::<Vec<_>>();

        match keyword.as_str() {
            "help" => ConsoleResponse::text(HELP_TEXT),
            "quit" => ConsoleResponse::action(ConsoleAction::Quit),
            "menu" => ConsoleResponse::action(ConsoleAction::ToMenu),
            "save" => ConsoleResponse::action(ConsoleAction::Save),
            "load" => ConsoleResponse::action(ConsoleAction::Load),
            "status" => ConsoleResponse::text(self.status_line(session)),
            "party" => ConsoleResponse::text(render_party(session)),
            "inventory" => self.render_inventory(session),
            "look" => self.render_look(session),
            "trade" => self.render_trade(session),
            "endround" => {
                session.start_round();
                ConsoleResponse::text(format!("round {} begins", session.round()))
            }
            "select" => self.select_actor(session, &rest),
            "open" => self.open_container(session),
            "close" => {
                session.set_open_container(None);
                ConsoleResponse::text("container closed")
            }
            "take" => self.command_take(session, &rest),
            "takeall" => self.command_take_all(session),
            "wield" => self.command_wield(session, &rest),
            "drop" => self.command_drop(session, &rest),
            "dropequipped" => self.command_drop_equipped(session, &rest),
            "give" => self.command_give(session, &rest),
            "giveequipped" => self.command_give_equipped(session, &rest),
            "equip" => self.command_equip(session, &rest),
            "unequip" => self.command_unequip(session, &rest),
            "buy" => self.command_buy(session, &rest),
            "sell" => self.command_sell(session, &rest),
            "sellequipped" => self.command_sell_equipped(session, &rest),
            _ => ConsoleResponse::text("unknown command, try 'help'"),
        }
    }

    fn finish_quantity_prompt(
        &mut self,
        session: &mut Session,
        pending: PendingQuantity,
        line: &str,
    ) -> ConsoleResponse {
        match line.parse::<u32>() {
            Ok(quantity) if quantity >= 1 => {
                let outcome = session.invoke_with_quantity(pending.command, quantity);
                self.describe_outcome(session, pending.command, outcome)
            }
            _ => ConsoleResponse::text("cancelled"),
        }
    }

    /// Runs the command through the session, parking it when a quantity
    /// choice is required.
    fn dispatch(&mut self, session: &mut Session, command: ItemCommand) -> ConsoleResponse {
        let outcome = session.invoke(command);
        self.describe_outcome(session, command, outcome)
    }

    fn describe_outcome(
        &mut self,
        session: &mut Session,
        command: ItemCommand,
        outcome: CommandOutcome,
    ) -> ConsoleResponse {
        match outcome {
            CommandOutcome::Committed => {
                let mut text = String::from("done");
                let signals = session.drain_ui_signals();
                debug!(signal_count = signals.len(), "console_drained_ui_signals");
                if signals.contains(&UiSignal::RefreshInterface) {
                    text.push_str("\n");
                    text.push_str(&self.status_line(session));
                }
                ConsoleResponse::text(text)
            }
            CommandOutcome::AwaitingQuantity { max_quantity } => {
                self.pending = Some(PendingQuantity {
                    command,
                    max_quantity,
                });
                let quote = session
                    .price_quote(command, max_quantity)
                    .map(|quote| format!(" ({quote} for all)"))
                    .unwrap_or_default();
                ConsoleResponse::text(format!("how many? 1-{max_quantity}{quote}"))
            }
            CommandOutcome::Rejected(reason) => ConsoleResponse::text(reason.describe()),
        }
    }

    fn actor(&self, session: &Session) -> Result<EntityId, ConsoleResponse> {
        self.selected_actor
            .filter(|id| session.area().creature(*id).is_some())
            .or_else(|| session.party().first().copied())
            .ok_or_else(|| ConsoleResponse::text("no party member available"))
    }

    fn status_line(&self, session: &Session) -> String {
        let actor_part = match self.actor(session) {
            Ok(actor) => session
                .area()
                .creature(actor)
                .map(|creature| {
                    format!(
                        "{}: {}/{} ap",
                        creature.label,
                        creature.timer.remaining(),
                        creature.timer.max_ap()
                    )
                })
                .unwrap_or_default(),
            Err(_) => String::from("no actor"),
        };
        format!(
            "round {} | {} | {} coin",
            session.round(),
            actor_part,
            session.party_funds()
        )
    }

    fn select_actor(&mut self, session: &Session, args: &[&str]) -> ConsoleResponse {
        let Some(name) = args.first() else {
            return ConsoleResponse::text("select <name>");
        };
        match find_party_member(session, name) {
            Some(id) => {
                self.selected_actor = Some(id);
                let label = session
                    .area()
                    .creature(id)
                    .map(|creature| creature.label.clone())
                    .unwrap_or_default();
                ConsoleResponse::text(format!("{label} selected"))
            }
            None => ConsoleResponse::text("no such party member"),
        }
    }

    fn open_container(&mut self, session: &mut Session) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let feet = session
            .area()
            .creature(actor)
            .expect("actor resolved above")
            .location;
        match session.area().container_at(feet) {
            Some(container_id) => {
                session.set_open_container(Some(container_id));
                let container = session
                    .area()
                    .container(container_id)
                    .expect("container found above");
                ConsoleResponse::text(format!(
                    "{} opened: {}",
                    container.label,
                    render_item_list(session.templates(), container.items())
                ))
            }
            None => ConsoleResponse::text("nothing to open here"),
        }
    }

    fn render_inventory(&self, session: &Session) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let creature = session.area().creature(actor).expect("actor resolved above");
        let mut lines = vec![format!(
            "{} carries: {}",
            creature.label,
            render_item_list(session.templates(), creature.inventory.unequipped())
        )];
        for (slot, item) in creature.inventory.equipped_slots() {
            lines.push(format!(
                "  {}: {}",
                slot.name(),
                item_label(session.templates(), item)
            ));
        }
        ConsoleResponse::text(lines.join("\n"))
    }

    fn render_look(&self, session: &Session) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let feet = session
            .area()
            .creature(actor)
            .expect("actor resolved above")
            .location;
        let mut lines = vec![format!("standing at ({}, {})", feet.q, feet.r)];
        for container in session.area().containers() {
            if container.location == feet {
                lines.push(format!(
                    "  {}: {}",
                    container.label,
                    render_item_list(session.templates(), container.items())
                ));
            }
        }
        for creature in session.area().creatures() {
            if creature.id != actor && creature.location.distance_to(feet) <= 1 {
                lines.push(format!("  {} is nearby", creature.label));
            }
        }
        ConsoleResponse::text(lines.join("\n"))
    }

    fn render_trade(&self, session: &Session) -> ConsoleResponse {
        let Some(merchant) = session.merchants().first() else {
            return ConsoleResponse::text("no merchant here");
        };
        let mut lines = vec![format!(
            "{} (buys at {}%, sells at {}%):",
            merchant.label,
            merchant.current_buy_percentage(),
            merchant.current_sell_percentage()
        )];
        for entry in merchant.stock().entries() {
            let price = session
                .templates()
                .item(entry.item.template)
                .map(|template| {
                    engine::entity::buy_price(
                        template.base_value,
                        1,
                        merchant.current_sell_percentage(),
                    )
                })
                .unwrap_or(0);
            lines.push(format!(
                "  {} x{} at {} coin",
                item_label(session.templates(), entry.item),
                entry.quantity,
                price
            ));
        }
        ConsoleResponse::text(lines.join("\n"))
    }

    fn command_take(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(item_name) = args.first() else {
            return ConsoleResponse::text("take <item> [qty]");
        };
        let Some(container_id) = nearby_container(session, actor) else {
            return ConsoleResponse::text("no container here");
        };
        let container = session
            .area()
            .container(container_id)
            .expect("container resolved above");
        let Some((item, available)) =
            find_in_list(session.templates(), container.items(), item_name)
        else {
            return ConsoleResponse::text("no such item in the container");
        };
        let command = ItemCommand::Take {
            actor,
            item,
            max_quantity: available,
            container: container_id,
        };
        self.run_maybe_with_quantity(session, command, args.get(1))
    }

    fn command_take_all(&mut self, session: &mut Session) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(container_id) = nearby_container(session, actor) else {
            return ConsoleResponse::text("no container here");
        };
        self.dispatch(
            session,
            ItemCommand::TakeAll {
                actor,
                container: container_id,
            },
        )
    }

    fn command_wield(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(item_name) = args.first() else {
            return ConsoleResponse::text("wield <item>");
        };
        let Some(container_id) = nearby_container(session, actor) else {
            return ConsoleResponse::text("no container here");
        };
        let container = session
            .area()
            .container(container_id)
            .expect("container resolved above");
        let Some((item, _)) = find_in_list(session.templates(), container.items(), item_name)
        else {
            return ConsoleResponse::text("no such item in the container");
        };
        self.dispatch(
            session,
            ItemCommand::TakeAndEquip {
                actor,
                item,
                container: container_id,
            },
        )
    }

    fn command_drop(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(item_name) = args.first() else {
            return ConsoleResponse::text("drop <item> [qty]");
        };
        let creature = session.area().creature(actor).expect("actor resolved above");
        let Some((item, available)) = find_in_list(
            session.templates(),
            creature.inventory.unequipped(),
            item_name,
        ) else {
            return ConsoleResponse::text("not carrying that");
        };
        let command = ItemCommand::Drop {
            actor,
            item,
            max_quantity: available,
        };
        self.run_maybe_with_quantity(session, command, args.get(1))
    }

    fn command_drop_equipped(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(slot) = args.first().and_then(|token| Slot::parse(token)) else {
            return ConsoleResponse::text("dropequipped <slot>");
        };
        self.dispatch(session, ItemCommand::DropEquipped { actor, slot })
    }

    fn command_give(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let (Some(target_name), Some(item_name)) = (args.first(), args.get(1)) else {
            return ConsoleResponse::text("give <name> <item> [qty]");
        };
        let Some(target) = find_party_member(session, target_name) else {
            return ConsoleResponse::text("no such party member");
        };
        if !session.give_targets(actor).contains(&target) {
            return ConsoleResponse::text("cannot give to yourself");
        }
        let creature = session.area().creature(actor).expect("actor resolved above");
        let Some((item, available)) = find_in_list(
            session.templates(),
            creature.inventory.unequipped(),
            item_name,
        ) else {
            return ConsoleResponse::text("not carrying that");
        };
        let command = ItemCommand::Give {
            actor,
            item,
            max_quantity: available,
            target,
        };
        self.run_maybe_with_quantity(session, command, args.get(2))
    }

    fn command_give_equipped(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let (Some(slot_token), Some(target_name)) = (args.first(), args.get(1)) else {
            return ConsoleResponse::text("giveequipped <slot> <name>");
        };
        let Some(slot) = Slot::parse(slot_token) else {
            return ConsoleResponse::text("no such slot");
        };
        let Some(target) = find_party_member(session, target_name) else {
            return ConsoleResponse::text("no such party member");
        };
        self.dispatch(
            session,
            ItemCommand::GiveEquipped {
                actor,
                slot,
                target,
            },
        )
    }

    fn command_equip(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(item_name) = args.first() else {
            return ConsoleResponse::text("equip <item> [slot]");
        };
        let slot = match args.get(1) {
            Some(token) => match Slot::parse(token) {
                Some(slot) => Some(slot),
                None => return ConsoleResponse::text("no such slot"),
            },
            None => None,
        };
        let creature = session.area().creature(actor).expect("actor resolved above");
        let Some((item, _)) = find_in_list(
            session.templates(),
            creature.inventory.unequipped(),
            item_name,
        ) else {
            return ConsoleResponse::text("not carrying that");
        };
        self.dispatch(session, ItemCommand::Equip { actor, item, slot })
    }

    fn command_unequip(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(slot) = args.first().and_then(|token| Slot::parse(token)) else {
            return ConsoleResponse::text("unequip <slot>");
        };
        self.dispatch(session, ItemCommand::Unequip { actor, slot })
    }

    fn command_buy(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(item_name) = args.first() else {
            return ConsoleResponse::text("buy <item> [qty]");
        };
        let Some(merchant_id) = first_merchant(session) else {
            return ConsoleResponse::text("no merchant here");
        };
        let merchant = session.merchant(merchant_id).expect("merchant exists");
        let Some((item, available)) = find_in_list(session.templates(), merchant.stock(), item_name)
        else {
            return ConsoleResponse::text("the merchant does not stock that");
        };
        let command = ItemCommand::Buy {
            actor,
            item,
            max_quantity: available,
            merchant: merchant_id,
        };
        self.run_maybe_with_quantity(session, command, args.get(1))
    }

    fn command_sell(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(item_name) = args.first() else {
            return ConsoleResponse::text("sell <item> [qty]");
        };
        let Some(merchant_id) = first_merchant(session) else {
            return ConsoleResponse::text("no merchant here");
        };
        let creature = session.area().creature(actor).expect("actor resolved above");
        let Some((item, available)) = find_in_list(
            session.templates(),
            creature.inventory.unequipped(),
            item_name,
        ) else {
            return ConsoleResponse::text("not carrying that");
        };
        let command = ItemCommand::Sell {
            actor,
            item,
            max_quantity: available,
            merchant: merchant_id,
        };
        self.run_maybe_with_quantity(session, command, args.get(1))
    }

    fn command_sell_equipped(&mut self, session: &mut Session, args: &[&str]) -> ConsoleResponse {
        let actor = match self.actor(session) {
            Ok(actor) => actor,
            Err(response) => return response,
        };
        let Some(slot) = args.first().and_then(|token| Slot::parse(token)) else {
            return ConsoleResponse::text("sellequipped <slot>");
        };
        let Some(merchant_id) = first_merchant(session) else {
            return ConsoleResponse::text("no merchant here");
        };
        self.dispatch(
            session,
            ItemCommand::SellEquipped {
                actor,
                slot,
                merchant: merchant_id,
            },
        )
    }

    /// An explicit quantity argument skips the prompt; otherwise the
    /// command goes through `invoke` and may park as pending.
    fn run_maybe_with_quantity(
        &mut self,
        session: &mut Session,
        command: ItemCommand,
        quantity_arg: Option<&&str>,
    ) -> ConsoleResponse {
        match quantity_arg.and_then(|token| token.parse::<u32>().ok()) {
            Some(quantity) => {
                let outcome = session.invoke_with_quantity(command, quantity);
                self.describe_outcome(session, command, outcome)
            }
            None => self.dispatch(session, command),
        }
    }
}

fn find_party_member(session: &Session, name: &str) -> Option<EntityId> {
    let wanted = name.to_ascii_lowercase();
    session.party().iter().copied().find(|id| {
        session
            .area()
            .creature(*id)
            .is_some_and(|creature| creature.label.to_ascii_lowercase() == wanted)
    })
}

fn first_merchant(session: &Session) -> Option<MerchantId> {
    session.merchants().first().map(|merchant| merchant.id)
}

/// The container the actor can reach: the open one if any, else whatever
/// sits on the actor's tile.
fn nearby_container(session: &Session, actor: EntityId) -> Option<EntityId> {
    if let Some(open) = session.open_container() {
        if session.area().container(open).is_some() {
            return Some(open);
        }
    }
    let feet = session.area().creature(actor)?.location;
    session.area().container_at(feet)
}

fn find_in_list(
    templates: &TemplateDatabase,
    list: &ItemList,
    name: &str,
) -> Option<(Item, u32)> {
    let wanted = name.to_ascii_lowercase();
    list.entries().iter().find_map(|entry| {
        let template = templates.item(entry.item.template)?;
        (template.def_name.to_ascii_lowercase() == wanted
            || template.label.to_ascii_lowercase() == wanted)
            .then_some((entry.item, entry.quantity))
    })
}

fn item_label(templates: &TemplateDatabase, item: Item) -> String {
    templates
        .item(item.template)
        .map(|template| template.label.clone())
        .unwrap_or_else(|| format!("item#{}", item.template.0))
}

fn render_item_list(templates: &TemplateDatabase, list: &ItemList) -> String {
    if list.is_empty() {
        return String::from("(empty)");
    }
    list.entries()
        .iter()
        .map(|entry| format!("{} x{}", item_label(templates, entry.item), entry.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_party(session: &Session) -> String {
    let mut lines = vec![format!("{} coin", session.party_funds())];
    for id in session.party() {
        if let Some(creature) = session.area().creature(*id) {
            lines.push(format!(
                "  {} at ({}, {}) with {}/{} ap",
                creature.label,
                creature.location.q,
                creature.location.r,
                creature.timer.remaining(),
                creature.timer.max_ap()
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::super::bootstrap::{self, AppWiring};
    use super::*;
    use engine::{compile_template_database, ActionCosts, Ruleset};

    fn wiring() -> AppWiring {
        let paths = engine::resolve_app_paths().expect("app paths");
        let ruleset =
            Ruleset::from_file(&paths.campaign_dir.join("rules.json")).expect("ruleset");
        let costs = ActionCosts::from_ruleset(&ruleset).expect("costs");
        let templates = compile_template_database(&paths.campaign_dir).expect("templates");
        AppWiring {
            paths,
            templates,
            costs,
        }
    }

    fn session() -> Session {
        bootstrap::new_session(&wiring()).expect("session")
    }

    #[test]
    fn unknown_command_suggests_help() {
        let mut session = session();
        let mut console = Console::new();
        let response = console.handle_line(&mut session, "dance");
        assert!(response.text.contains("help"));
        assert_eq!(response.action, ConsoleAction::None);
    }

    #[test]
    fn take_prompts_for_quantity_then_commits() {
        let mut session = session();
        let mut console = Console::new();

        let response = console.handle_line(&mut session, "take ration");
        assert!(response.text.starts_with("how many? 1-5"));

        let response = console.handle_line(&mut session, "3");
        assert!(response.text.starts_with("done"));

        let inventory = console.handle_line(&mut session, "inventory");
        assert!(inventory.text.contains("Ration x3"));
    }

    #[test]
    fn non_numeric_reply_cancels_the_prompt() {
        let mut session = session();
        let mut console = Console::new();
        console.handle_line(&mut session, "take ration");
        let response = console.handle_line(&mut session, "never mind");
        assert_eq!(response.text, "cancelled");
        let inventory = console.handle_line(&mut session, "inventory");
        assert!(!inventory.text.contains("Ration"));
    }

    #[test]
    fn explicit_quantity_skips_the_prompt() {
        let mut session = session();
        let mut console = Console::new();
        let response = console.handle_line(&mut session, "take ration 2");
        assert!(response.text.starts_with("done"));
    }

    #[test]
    fn wield_takes_and_equips_in_one_action() {
        let mut session = session();
        let mut console = Console::new();
        let response = console.handle_line(&mut session, "wield ironSword");
        assert!(response.text.starts_with("done"));
        let inventory = console.handle_line(&mut session, "inventory");
        assert!(inventory.text.contains("main_hand: Iron Sword"));
    }

    #[test]
    fn quest_item_drop_is_refused_with_the_reason() {
        let mut session = session();
        let mut console = Console::new();
        assert!(console
            .handle_line(&mut session, "take sealedWrit")
            .text
            .starts_with("done"));
        let response = console.handle_line(&mut session, "drop sealedWrit");
        assert!(response.text.contains("quest"));
    }

    #[test]
    fn buy_beyond_the_party_funds_is_refused() {
        let mut session = session();
        let mut console = Console::new();
        // Silver amulet: 300 * 150 / 100 = 450 > 100 starting coin.
        let response = console.handle_line(&mut session, "buy silverAmulet 1");
        assert!(response.text.contains("coin"));
        assert_eq!(session.party_funds(), 100);
    }

    #[test]
    fn endround_refills_action_points() {
        let mut session = session();
        let mut console = Console::new();
        console.handle_line(&mut session, "take ration 5");
        let before = session
            .area()
            .creature(session.party()[0])
            .expect("actor")
            .timer
            .remaining();
        assert!(before < session.costs().action_points_per_round);

        console.handle_line(&mut session, "endround");
        let after = session
            .area()
            .creature(session.party()[0])
            .expect("actor")
            .timer
            .remaining();
        assert_eq!(after, session.costs().action_points_per_round);
    }

    #[test]
    fn give_moves_items_to_the_named_companion() {
        let mut session = session();
        let mut console = Console::new();
        console.handle_line(&mut session, "take ration 4");
        let response = console.handle_line(&mut session, "give brena ration 2");
        assert!(response.text.starts_with("done"));

        console.handle_line(&mut session, "select brena");
        let inventory = console.handle_line(&mut session, "inventory");
        assert!(inventory.text.contains("Ration x2"));
    }

    #[test]
    fn selecting_an_unknown_member_is_reported() {
        let mut session = session();
        let mut console = Console::new();
        let response = console.handle_line(&mut session, "select morwen");
        assert_eq!(response.text, "no such party member");
    }
}
