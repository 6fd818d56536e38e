use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const PICK_UP_ITEM_COST: &str = "PickUpItemCost";
pub const DROP_ITEM_COST: &str = "DropItemCost";
pub const GIVE_ITEM_COST: &str = "GiveItemCost";
pub const PICK_UP_AND_WIELD_ITEM_COST: &str = "PickUpAndWieldItemCost";
pub const ACTION_POINTS_PER_ROUND: &str = "ActionPointsPerRound";

/// Named integer constants supplied by the campaign ruleset. The scripting
/// layer resolves rule values by string key; a key consumed by an action
/// that is absent from the ruleset is a configuration error, not a default.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    values: BTreeMap<String, i32>,
}

#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("failed to read ruleset file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ruleset file {path} is not a flat JSON object of integers: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("ruleset has no value for required key '{key}'")]
    MissingKey { key: String },
}

impl Ruleset {
    pub fn from_file(path: &Path) -> Result<Self, RulesetError> {
        let raw = fs::read_to_string(path).map_err(|source| RulesetError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let values = serde_json::from_str::<BTreeMap<String, i32>>(&raw).map_err(|source| {
            RulesetError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self { values })
    }

    pub fn from_values(values: impl IntoIterator<Item = (&'static str, i32)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }

    pub fn value(&self, key: &str) -> Result<i32, RulesetError> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| RulesetError::MissingKey {
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The rule values the item action layer consumes, resolved once at session
/// construction so a missing key fails at startup rather than mid-action.
#[derive(Debug, Clone, Copy)]
pub struct ActionCosts {
    pub pick_up_item: i32,
    pub drop_item: i32,
    pub give_item: i32,
    pub pick_up_and_wield_item: i32,
    pub action_points_per_round: i32,
}

impl ActionCosts {
    pub fn from_ruleset(ruleset: &Ruleset) -> Result<Self, RulesetError> {
        Ok(Self {
            pick_up_item: ruleset.value(PICK_UP_ITEM_COST)?,
            drop_item: ruleset.value(DROP_ITEM_COST)?,
            give_item: ruleset.value(GIVE_ITEM_COST)?,
            pick_up_and_wield_item: ruleset.value(PICK_UP_AND_WIELD_ITEM_COST)?,
            action_points_per_round: ruleset.value(ACTION_POINTS_PER_ROUND)?,
        })
    }
}
