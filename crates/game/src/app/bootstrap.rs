use engine::{
    compile_template_database, resolve_app_paths, ActionCosts, AppPaths, Area, ContainerTemplate,
    HexPoint, Item, Ruleset, Session, TemplateDatabase,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const RULES_FILE: &str = "rules.json";
const GROUND_PILE_DEF: &str = "groundPile";
const STARTING_FUNDS: i32 = 100;

pub(crate) struct AppWiring {
    pub(crate) paths: AppPaths,
    pub(crate) templates: TemplateDatabase,
    pub(crate) costs: ActionCosts,
}

pub(crate) fn build_app() -> Result<AppWiring, String> {
    init_tracing();
    info!("=== Hexfall Startup ===");

    let paths = resolve_app_paths().map_err(|error| error.to_string())?;
    let ruleset = Ruleset::from_file(&paths.campaign_dir.join(RULES_FILE))
        .map_err(|error| error.to_string())?;
    let costs = ActionCosts::from_ruleset(&ruleset).map_err(|error| error.to_string())?;
    let templates =
        compile_template_database(&paths.campaign_dir).map_err(|error| error.to_string())?;

    info!(
        items = templates.items().len(),
        creatures = templates.creatures().len(),
        containers = templates.containers().len(),
        "campaign_content_loaded"
    );

    Ok(AppWiring {
        paths,
        templates,
        costs,
    })
}

pub(crate) fn ground_pile_template(templates: &TemplateDatabase) -> Result<ContainerTemplate, String> {
    templates
        .container_id_by_name(GROUND_PILE_DEF)
        .and_then(|id| templates.container(id))
        .cloned()
        .ok_or_else(|| format!("campaign must define the '{GROUND_PILE_DEF}' container"))
}

/// Builds the starting scenario: the two-member party, a stocked chest,
/// and a trading post. Entity placement lives in code, content in defs.
pub(crate) fn new_session(wiring: &AppWiring) -> Result<Session, String> {
    let templates = wiring.templates.clone();
    let ground_pile = ground_pile_template(&templates)?;

    let mut area = Area::new("crossing", ground_pile);
    let round_ap = wiring.costs.action_points_per_round;

    let mut party_ids = Vec::new();
    for (def_name, tile) in [("aldric", HexPoint::new(0, 0)), ("brena", HexPoint::new(1, 0))] {
        let template_id = templates
            .creature_id_by_name(def_name)
            .ok_or_else(|| format!("campaign must define the '{def_name}' creature"))?;
        let label = templates
            .creature(template_id)
            .map(|template| template.label.clone())
            .unwrap_or_else(|| def_name.to_string());
        party_ids.push(area.spawn_creature(template_id, label, tile, round_ap));
    }

    let chest_template_id = templates
        .container_id_by_name("woodenChest")
        .ok_or_else(|| "campaign must define the 'woodenChest' container".to_string())?;
    let chest_template = templates
        .container(chest_template_id)
        .cloned()
        .ok_or_else(|| "woodenChest template lookup failed".to_string())?;
    let chest = area.spawn_container(&chest_template, HexPoint::new(0, 0));

    let starting_loot: &[(&str, u32)] = &[("ironSword", 1), ("ration", 5), ("sealedWrit", 1)];
    for (def_name, quantity) in starting_loot {
        let item_id = templates
            .item_id_by_name(def_name)
            .ok_or_else(|| format!("campaign must define the '{def_name}' item"))?;
        area.container_mut(chest)
            .expect("chest spawned above")
            .items_mut()
            .add(Item::of_template(item_id), *quantity);
    }

    let mut session = Session::new(templates, wiring.costs, area);
    for id in party_ids {
        session.add_party_member(id);
    }
    session.set_party_funds(STARTING_FUNDS);

    let merchant = session.add_merchant("Wayside Trader", 50, 150);
    let stock: &[(&str, u32)] = &[("oakShield", 2), ("ration", 20), ("silverAmulet", 1)];
    for (def_name, quantity) in stock {
        let item_id = session
            .templates()
            .item_id_by_name(def_name)
            .ok_or_else(|| format!("campaign must define the '{def_name}' item"))?;
        let item = Item::of_template(item_id);
        session
            .merchant_mut(merchant)
            .expect("merchant added above")
            .stock_mut()
            .add(item, *quantity);
    }

    Ok(session)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
