use std::collections::HashMap;
use std::fs;
use std::path::Path;

use engine::{
    ActionTimer, Area, EntityId, HexPoint, Item, ItemList, Quality, Session, Slot,
    TemplateDatabase,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::bootstrap::{self, AppWiring};

const SAVE_VERSION: u32 = 1;
pub(crate) const QUICKSAVE_FILE: &str = "quicksave.json";

type SaveLoadResult<T> = Result<T, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct SavedHex {
    q: i32,
    r: i32,
}

impl SavedHex {
    fn from_hex(value: HexPoint) -> Self {
        Self {
            q: value.q,
            r: value.r,
        }
    }

    fn to_hex(self) -> HexPoint {
        HexPoint::new(self.q, self.r)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedItem {
    def_name: String,
    quality: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedEntry {
    item: SavedItem,
    quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedEquipped {
    slot: String,
    item: SavedItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedCreature {
    save_id: u64,
    template_def: String,
    label: String,
    location: SavedHex,
    max_ap: i32,
    remaining_ap: i32,
    unequipped: Vec<SavedEntry>,
    equipped: Vec<SavedEquipped>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedContainer {
    save_id: u64,
    template_def: String,
    location: SavedHex,
    items: Vec<SavedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedMerchant {
    label: String,
    buy_percentage: i32,
    sell_percentage: i32,
    stock: Vec<SavedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SaveGame {
    save_version: u32,
    round: u32,
    area_name: String,
    party_funds: i32,
    party_save_ids: Vec<u64>,
    open_container_save_id: Option<u64>,
    creatures: Vec<SavedCreature>,
    containers: Vec<SavedContainer>,
    merchants: Vec<SavedMerchant>,
}

pub(crate) fn save_game(session: &Session, path: &Path) -> SaveLoadResult<()> {
    let save = snapshot(session)?;
    let text = serde_json::to_string_pretty(&save)
        .map_err(|error| format!("failed to encode save: {error}"))?;
    fs::write(path, text).map_err(|error| format!("failed to write {}: {error}", path.display()))?;
    info!(path = %path.display(), "game_saved");
    Ok(())
}

pub(crate) fn load_game(wiring: &AppWiring, path: &Path) -> SaveLoadResult<Session> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let save: SaveGame = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| format!("malformed save at {}: {error}", error.path()))?;
    if save.save_version != SAVE_VERSION {
        return Err(format!(
            "save version {} is not supported (expected {SAVE_VERSION})",
            save.save_version
        ));
    }
    let session = rebuild(wiring, save)?;
    info!(path = %path.display(), "game_loaded");
    Ok(session)
}

fn snapshot(session: &Session) -> SaveLoadResult<SaveGame> {
    let templates = session.templates();

    let mut creatures = Vec::new();
    for creature in session.area().creatures() {
        let template_def = templates
            .creature(creature.template)
            .map(|template| template.def_name.clone())
            .ok_or_else(|| format!("creature '{}' has no template", creature.label))?;
        let mut equipped = Vec::new();
        for (slot, item) in creature.inventory.equipped_slots() {
            equipped.push(SavedEquipped {
                slot: slot.name().to_string(),
                item: saved_item(templates, item)?,
            });
        }
        creatures.push(SavedCreature {
            save_id: creature.id.0,
            template_def,
            label: creature.label.clone(),
            location: SavedHex::from_hex(creature.location),
            max_ap: creature.timer.max_ap(),
            remaining_ap: creature.timer.remaining(),
            unequipped: saved_entries(templates, creature.inventory.unequipped())?,
            equipped,
        });
    }

    let mut containers = Vec::new();
    for container in session.area().containers() {
        let template_def = templates
            .container(container.template)
            .map(|template| template.def_name.clone())
            .ok_or_else(|| format!("container '{}' has no template", container.label))?;
        containers.push(SavedContainer {
            save_id: container.id.0,
            template_def,
            location: SavedHex::from_hex(container.location),
            items: saved_entries(templates, container.items())?,
        });
    }

    let merchants = session
        .merchants()
        .iter()
        .map(|merchant| {
            Ok(SavedMerchant {
                label: merchant.label.clone(),
                buy_percentage: merchant.current_buy_percentage(),
                sell_percentage: merchant.current_sell_percentage(),
                stock: saved_entries(templates, merchant.stock())?,
            })
        })
        .collect::<SaveLoadResult<Vec<_>>>()?;

    Ok(SaveGame {
        save_version: SAVE_VERSION,
        round: session.round(),
        area_name: session.area().name().to_string(),
        party_funds: session.party_funds(),
        party_save_ids: session.party().iter().map(|id| id.0).collect(),
        open_container_save_id: session.open_container().map(|id| id.0),
        creatures,
        containers,
        merchants,
    })
}

/// Entity ids are not stable across a reload (temporary containers leave
/// holes), so saved ids are remapped onto the freshly spawned entities.
fn rebuild(wiring: &AppWiring, save: SaveGame) -> SaveLoadResult<Session> {
    let templates = wiring.templates.clone();
    let ground_pile = bootstrap::ground_pile_template(&templates)?;
    let mut area = Area::new(save.area_name.clone(), ground_pile);
    let mut id_map = HashMap::<u64, EntityId>::new();

    for saved in &save.creatures {
        let template_id = templates
            .creature_id_by_name(&saved.template_def)
            .ok_or_else(|| format!("save references unknown creature '{}'", saved.template_def))?;
        let id = area.spawn_creature(
            template_id,
            saved.label.clone(),
            saved.location.to_hex(),
            saved.max_ap,
        );
        let creature = area.creature_mut(id).expect("spawned above");
        creature.timer = ActionTimer::restore(saved.max_ap, saved.remaining_ap);
        for entry in &saved.unequipped {
            let item = restore_item(&templates, &entry.item)?;
            creature.inventory.unequipped_mut().add(item, entry.quantity);
        }
        for equipped in &saved.equipped {
            let slot = Slot::parse(&equipped.slot)
                .ok_or_else(|| format!("save references unknown slot '{}'", equipped.slot))?;
            let item = restore_item(&templates, &equipped.item)?;
            let profile = templates
                .item(item.template)
                .and_then(|template| template.equip)
                .ok_or_else(|| {
                    format!("saved equipped item '{}' is not equippable", equipped.item.def_name)
                })?;
            creature.inventory.unequipped_mut().add(item, 1);
            if !creature.inventory.equip(item, profile, Some(slot)) {
                return Err(format!(
                    "saved equipped item '{}' no longer fits slot '{}'",
                    equipped.item.def_name, equipped.slot
                ));
            }
        }
        id_map.insert(saved.save_id, id);
    }

    for saved in &save.containers {
        let template = templates
            .container_id_by_name(&saved.template_def)
            .and_then(|id| templates.container(id))
            .cloned()
            .ok_or_else(|| {
                format!("save references unknown container '{}'", saved.template_def)
            })?;
        let id = area.spawn_container(&template, saved.location.to_hex());
        let container = area.container_mut(id).expect("spawned above");
        for entry in &saved.items {
            let item = restore_item(&templates, &entry.item)?;
            container.items_mut().add(item, entry.quantity);
        }
        id_map.insert(saved.save_id, id);
    }

    let mut session = Session::new(templates, wiring.costs, area);
    session.set_round(save.round);
    session.set_party_funds(save.party_funds);
    for save_id in &save.party_save_ids {
        let id = id_map
            .get(save_id)
            .ok_or_else(|| format!("save party references unknown entity {save_id}"))?;
        session.add_party_member(*id);
    }
    if let Some(save_id) = save.open_container_save_id {
        session.set_open_container(id_map.get(&save_id).copied());
    }

    for saved in &save.merchants {
        let merchant_id =
            session.add_merchant(saved.label.clone(), saved.buy_percentage, saved.sell_percentage);
        for entry in &saved.stock {
            let item = restore_item(session.templates(), &entry.item)?;
            session
                .merchant_mut(merchant_id)
                .expect("merchant added above")
                .stock_mut()
                .add(item, entry.quantity);
        }
    }

    Ok(session)
}

fn saved_item(templates: &TemplateDatabase, item: Item) -> SaveLoadResult<SavedItem> {
    let def_name = templates
        .item(item.template)
        .map(|template| template.def_name.clone())
        .ok_or_else(|| format!("item template {} has no def", item.template.0))?;
    Ok(SavedItem {
        def_name,
        quality: item.quality.0,
    })
}

fn saved_entries(templates: &TemplateDatabase, list: &ItemList) -> SaveLoadResult<Vec<SavedEntry>> {
    list.entries()
        .iter()
        .map(|entry| {
            Ok(SavedEntry {
                item: saved_item(templates, entry.item)?,
                quantity: entry.quantity,
            })
        })
        .collect()
}

fn restore_item(templates: &TemplateDatabase, saved: &SavedItem) -> SaveLoadResult<Item> {
    let template_id = templates
        .item_id_by_name(&saved.def_name)
        .ok_or_else(|| format!("save references unknown item '{}'", saved.def_name))?;
    Ok(Item::new(template_id, Quality(saved.quality)))
}
