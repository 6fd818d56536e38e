use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::entity::{
    ContainerTemplate, ContainerTemplateId, CreatureTemplate, CreatureTemplateId, EquipClass,
    EquipProfile, ItemTemplate, ItemTemplateId,
};

use super::collect_def_files_sorted;
use super::database::TemplateDatabase;
use super::DEFS_DIR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    Discovery,
    ReadFile,
    JsonMalformed,
    MissingField,
    InvalidValue,
    DuplicateDefInFile,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawDefFile {
    #[serde(default)]
    items: Vec<RawItemDef>,
    #[serde(default)]
    creatures: Vec<RawCreatureDef>,
    #[serde(default)]
    containers: Vec<RawContainerDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawItemDef {
    def_name: String,
    label: String,
    base_value: i32,
    #[serde(default)]
    quest: bool,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    equip: Option<RawEquipProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawEquipProfile {
    class: String,
    equip_cost: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawCreatureDef {
    def_name: String,
    label: String,
    #[serde(default)]
    portrait: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawContainerDef {
    def_name: String,
    label: String,
    #[serde(default)]
    temporary: bool,
    #[serde(default)]
    icon: Option<String>,
}

/// Compiles every def file under the campaign's defs directory into a
/// template database. Within one file a def name may appear only once;
/// across files the later (sorted) file wins, which is the campaign's
/// override point for mod content.
pub fn compile_template_database(
    campaign_dir: &Path,
) -> Result<TemplateDatabase, ContentCompileError> {
    let defs_dir = campaign_dir.join(DEFS_DIR);
    let def_files = collect_def_files_sorted(&defs_dir)?;

    let mut merged_items = BTreeMap::<String, ItemTemplate>::new();
    let mut merged_creatures = BTreeMap::<String, CreatureTemplate>::new();
    let mut merged_containers = BTreeMap::<String, ContainerTemplate>::new();

    for def_file in def_files {
        let raw = fs::read_to_string(&def_file).map_err(|source| ContentCompileError {
            code: ContentErrorCode::ReadFile,
            message: format!("failed to read def file: {source}"),
            file_path: def_file.clone(),
            location: None,
        })?;
        let parsed = parse_def_file(&def_file, &raw)?;

        let mut seen_in_file = HashSet::<String>::new();
        for item in parsed.items {
            let template = validate_item_def(&def_file, item)?;
            record_def_name(&def_file, &mut seen_in_file, &template.def_name)?;
            if merged_items.contains_key(&template.def_name) {
                debug!(
                    def_name = template.def_name.as_str(),
                    file = %def_file.display(),
                    "content_def_overridden_by_later_file"
                );
            }
            merged_items.insert(template.def_name.clone(), template);
        }
        for creature in parsed.creatures {
            let template = validate_creature_def(&def_file, creature)?;
            record_def_name(&def_file, &mut seen_in_file, &template.def_name)?;
            merged_creatures.insert(template.def_name.clone(), template);
        }
        for container in parsed.containers {
            let template = validate_container_def(&def_file, container)?;
            record_def_name(&def_file, &mut seen_in_file, &template.def_name)?;
            merged_containers.insert(template.def_name.clone(), template);
        }
    }

    Ok(TemplateDatabase::from_templates(
        merged_items.into_values().collect(),
        merged_creatures.into_values().collect(),
        merged_containers.into_values().collect(),
    ))
}

fn parse_def_file(file_path: &Path, raw: &str) -> Result<RawDefFile, ContentCompileError> {
    serde_json::from_str::<RawDefFile>(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::JsonMalformed,
        message: format!("malformed def file: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.line(),
            column: error.column(),
        }),
    })
}

fn record_def_name(
    file_path: &Path,
    seen_in_file: &mut HashSet<String>,
    def_name: &str,
) -> Result<(), ContentCompileError> {
    if seen_in_file.insert(def_name.to_string()) {
        Ok(())
    } else {
        Err(ContentCompileError {
            code: ContentErrorCode::DuplicateDefInFile,
            message: format!(
                "duplicate def '{def_name}'; a def file may define each name only once"
            ),
            file_path: file_path.to_path_buf(),
            location: None,
        })
    }
}

fn validate_item_def(
    file_path: &Path,
    raw: RawItemDef,
) -> Result<ItemTemplate, ContentCompileError> {
    require_def_name(file_path, &raw.def_name)?;
    if raw.base_value < 0 {
        return Err(invalid_value(
            file_path,
            format!(
                "item '{}' has negative baseValue {}",
                raw.def_name, raw.base_value
            ),
        ));
    }
    let equip = match raw.equip {
        None => None,
        Some(profile) => {
            let class = EquipClass::parse(&profile.class).ok_or_else(|| {
                invalid_value(
                    file_path,
                    format!(
                        "item '{}' has unknown equip class '{}'",
                        raw.def_name, profile.class
                    ),
                )
            })?;
            if profile.equip_cost < 0 {
                return Err(invalid_value(
                    file_path,
                    format!(
                        "item '{}' has negative equipCost {}",
                        raw.def_name, profile.equip_cost
                    ),
                ));
            }
            Some(EquipProfile {
                class,
                equip_cost: profile.equip_cost,
            })
        }
    };

    Ok(ItemTemplate {
        id: ItemTemplateId(0),
        def_name: raw.def_name,
        label: raw.label,
        base_value: raw.base_value,
        quest: raw.quest,
        icon: raw.icon,
        equip,
    })
}

fn validate_creature_def(
    file_path: &Path,
    raw: RawCreatureDef,
) -> Result<CreatureTemplate, ContentCompileError> {
    require_def_name(file_path, &raw.def_name)?;
    Ok(CreatureTemplate {
        id: CreatureTemplateId(0),
        def_name: raw.def_name,
        label: raw.label,
        portrait: raw.portrait,
    })
}

fn validate_container_def(
    file_path: &Path,
    raw: RawContainerDef,
) -> Result<ContainerTemplate, ContentCompileError> {
    require_def_name(file_path, &raw.def_name)?;
    Ok(ContainerTemplate {
        id: ContainerTemplateId(0),
        def_name: raw.def_name,
        label: raw.label,
        temporary: raw.temporary,
        icon: raw.icon,
    })
}

fn require_def_name(file_path: &Path, def_name: &str) -> Result<(), ContentCompileError> {
    if def_name.trim().is_empty() {
        Err(ContentCompileError {
            code: ContentErrorCode::MissingField,
            message: "def is missing a non-empty defName".to_string(),
            file_path: file_path.to_path_buf(),
            location: None,
        })
    } else {
        Ok(())
    }
}

fn invalid_value(file_path: &Path, message: String) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::InvalidValue,
        message,
        file_path: file_path.to_path_buf(),
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_campaign(defs: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().expect("tempdir");
        let defs_dir = temp.path().join(DEFS_DIR);
        fs::create_dir_all(&defs_dir).expect("defs dir");
        for (name, body) in defs {
            fs::write(defs_dir.join(name), body).expect("write def file");
        }
        temp
    }

    #[test]
    fn compiles_items_creatures_and_containers() {
        let campaign = write_campaign(&[(
            "core.json",
            r#"{
                "items": [
                    {"defName": "ironSword", "label": "Iron Sword", "baseValue": 30,
                     "equip": {"class": "Weapon", "equipCost": 1000}},
                    {"defName": "oldLetter", "label": "Old Letter", "baseValue": 0, "quest": true}
                ],
                "creatures": [{"defName": "aldric", "label": "Aldric"}],
                "containers": [{"defName": "lootPile", "label": "Loot", "temporary": true}]
            }"#,
        )]);

        let database = compile_template_database(campaign.path()).expect("database");
        let sword_id = database.item_id_by_name("ironSword").expect("sword id");
        let sword = database.item(sword_id).expect("sword");
        assert_eq!(sword.label, "Iron Sword");
        assert_eq!(
            sword.equip.expect("equip profile").class,
            EquipClass::Weapon
        );
        assert!(database.item_id_by_name("oldLetter").is_some());
        assert!(database.creature_id_by_name("aldric").is_some());
        let pile_id = database.container_id_by_name("lootPile").expect("pile id");
        assert!(database.container(pile_id).expect("pile").temporary);
    }

    #[test]
    fn later_file_overrides_earlier_def() {
        let campaign = write_campaign(&[
            (
                "00_core.json",
                r#"{"items": [{"defName": "ration", "label": "Ration", "baseValue": 2}]}"#,
            ),
            (
                "10_patch.json",
                r#"{"items": [{"defName": "ration", "label": "Field Ration", "baseValue": 3}]}"#,
            ),
        ]);

        let database = compile_template_database(campaign.path()).expect("database");
        let id = database.item_id_by_name("ration").expect("id");
        assert_eq!(database.item(id).expect("ration").label, "Field Ration");
    }

    #[test]
    fn duplicate_def_within_one_file_is_rejected() {
        let campaign = write_campaign(&[(
            "core.json",
            r#"{"items": [
                {"defName": "ration", "label": "Ration", "baseValue": 2},
                {"defName": "ration", "label": "Ration Again", "baseValue": 2}
            ]}"#,
        )]);

        let error = compile_template_database(campaign.path()).expect_err("duplicate");
        assert_eq!(error.code, ContentErrorCode::DuplicateDefInFile);
    }

    #[test]
    fn malformed_json_reports_line_and_column() {
        let campaign = write_campaign(&[("broken.json", "{\"items\": [\n  {\"defName\": ]}")]);

        let error = compile_template_database(campaign.path()).expect_err("malformed");
        assert_eq!(error.code, ContentErrorCode::JsonMalformed);
        let location = error.location.expect("location");
        assert_eq!(location.line, 2);
    }

    #[test]
    fn unknown_equip_class_is_an_invalid_value() {
        let campaign = write_campaign(&[(
            "core.json",
            r#"{"items": [{"defName": "wand", "label": "Wand", "baseValue": 5,
                "equip": {"class": "Focus", "equipCost": 500}}]}"#,
        )]);

        let error = compile_template_database(campaign.path()).expect_err("bad class");
        assert_eq!(error.code, ContentErrorCode::InvalidValue);
        assert!(error.message.contains("Focus"));
    }
}
