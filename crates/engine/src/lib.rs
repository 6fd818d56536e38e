use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod area;
pub mod command;
pub mod content;
pub mod entity;
pub mod hex;
pub mod resource;
pub mod rules;
pub mod session;

pub use area::Area;
pub use command::{CommandOutcome, ItemCommand, RejectReason, UiSignal};
pub use content::{
    compile_template_database, ContentCompileError, ContentErrorCode, SourceLocation,
    TemplateDatabase,
};
pub use entity::{
    ActionTimer, Container, ContainerTemplate, ContainerTemplateId, Creature, CreatureTemplate,
    CreatureTemplateId, EntityId, EquipClass, EquipProfile, Inventory, Item, ItemEntry, ItemList,
    ItemTemplate, ItemTemplateId, Merchant, MerchantId, Quality, Slot,
};
pub use hex::HexPoint;
pub use resource::{
    DeviceTextureId, SoftwareTextureDevice, SpriteCache, SpriteEntry, TextureDevice, TextureId,
    UploadJob, UvRect,
};
pub use rules::{ActionCosts, Ruleset, RulesetError};
pub use session::Session;

pub const ROOT_ENV_VAR: &str = "HEXFALL_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub campaign_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub saves_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create saves directory at {path}: {source}")]
    CreateSavesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "HEXFALL_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or campaign/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or campaign/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\hexfall\"\n\
Bash/zsh: export {env_var}=\"/path/to/hexfall\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let campaign_dir = root.join("campaign");
    let resources_dir = root.join("resources");
    let saves_dir = root.join("saves");

    fs::create_dir_all(&saves_dir).map_err(|source| StartupError::CreateSavesDir {
        path: saves_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        campaign_dir,
        resources_dir,
        saves_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_campaign = path.join("campaign").is_dir();

    cargo_toml && (has_crates || has_campaign)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
