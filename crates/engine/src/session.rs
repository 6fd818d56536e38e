use tracing::info;

use crate::area::Area;
use crate::command::UiSignal;
use crate::content::TemplateDatabase;
use crate::entity::{EntityId, Merchant, MerchantId};
use crate::hex::HexPoint;
use crate::rules::ActionCosts;

/// The running game state for one loaded area: the world, the player
/// party, trading counterparts, and the queue of UI feedback produced by
/// committed commands. One session is owned and driven by the single
/// simulation thread; there are no globals behind it.
#[derive(Debug, Clone)]
pub struct Session {
    templates: TemplateDatabase,
    costs: ActionCosts,
    area: Area,
    party: Vec<EntityId>,
    party_funds: i32,
    merchants: Vec<Merchant>,
    open_container: Option<EntityId>,
    round: u32,
    ui_signals: Vec<UiSignal>,
}

impl Session {
    pub fn new(templates: TemplateDatabase, costs: ActionCosts, area: Area) -> Self {
        Self {
            templates,
            costs,
            area,
            party: Vec::new(),
            party_funds: 0,
            merchants: Vec::new(),
            open_container: None,
            round: 1,
            ui_signals: Vec::new(),
        }
    }

    pub fn templates(&self) -> &TemplateDatabase {
        &self.templates
    }

    pub fn costs(&self) -> &ActionCosts {
        &self.costs
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut Area {
        &mut self.area
    }

    pub fn party(&self) -> &[EntityId] {
        &self.party
    }

    pub fn add_party_member(&mut self, id: EntityId) {
        if !self.party.contains(&id) {
            self.party.push(id);
        }
    }

    /// Party members other than `actor`: the candidate list for the give
    /// target menu.
    pub fn give_targets(&self, actor: EntityId) -> Vec<EntityId> {
        self.party
            .iter()
            .copied()
            .filter(|member| *member != actor)
            .collect()
    }

    pub fn party_funds(&self) -> i32 {
        self.party_funds
    }

    pub fn set_party_funds(&mut self, funds: i32) {
        self.party_funds = funds.max(0);
    }

    pub(crate) fn spend_party_funds(&mut self, amount: i32) {
        self.party_funds = (self.party_funds - amount.max(0)).max(0);
    }

    pub(crate) fn earn_party_funds(&mut self, amount: i32) {
        self.party_funds = self.party_funds.saturating_add(amount.max(0));
    }

    pub fn add_merchant(
        &mut self,
        label: impl Into<String>,
        buy_percentage: i32,
        sell_percentage: i32,
    ) -> MerchantId {
        let id = MerchantId(self.merchants.len() as u32);
        self.merchants
            .push(Merchant::new(id, label, buy_percentage, sell_percentage));
        id
    }

    pub fn merchant(&self, id: MerchantId) -> Option<&Merchant> {
        self.merchants.get(id.0 as usize)
    }

    pub fn merchant_mut(&mut self, id: MerchantId) -> Option<&mut Merchant> {
        self.merchants.get_mut(id.0 as usize)
    }

    pub fn merchants(&self) -> &[Merchant] {
        &self.merchants
    }

    /// The container whose window the UI currently shows, if any. Drops
    /// land there instead of on the ground while one is open.
    pub fn open_container(&self) -> Option<EntityId> {
        self.open_container
    }

    pub fn set_open_container(&mut self, container: Option<EntityId>) {
        self.open_container = container;
    }

    pub(crate) fn resolve_drop_target(&mut self, feet: HexPoint) -> EntityId {
        let open = self
            .open_container
            .filter(|id| self.area.container(*id).is_some());
        match open {
            Some(id) => id,
            None => self.area.ground_container_at(feet),
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Restores the round counter from a save.
    pub fn set_round(&mut self, round: u32) {
        self.round = round.max(1);
    }

    /// Starts the next round: every creature's action budget refills. No
    /// carry-over between rounds.
    pub fn start_round(&mut self) {
        self.round = self.round.saturating_add(1);
        for creature in self.area.creatures_mut() {
            creature.timer.start_round();
        }
        info!(round = self.round, "round_started");
    }

    pub(crate) fn push_ui_signal(&mut self, signal: UiSignal) {
        self.ui_signals.push(signal);
    }

    /// Hands the accumulated UI feedback to the host, emptying the queue.
    pub fn drain_ui_signals(&mut self) -> Vec<UiSignal> {
        std::mem::take(&mut self.ui_signals)
    }
}
