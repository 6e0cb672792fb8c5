use crate::api::DEFAULT_ROOT_NAME;
use crate::error::{BridgeError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Environment variable that overrides the config directory.
pub const HOME_ENV: &str = "ITEMBRIDGE_HOME";

/// Configuration for itembridge, stored as `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Managed folder. Defaults to `<data dir>/gallery`.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Directory holding the shared tag store. Defaults to `<data dir>/shared`.
    #[serde(default)]
    pub metadata_dir: Option<PathBuf>,

    /// Name shown for the root item.
    #[serde(default = "default_root_name")]
    pub root_display_name: String,

    /// Resolve symlinks in the root before use.
    #[serde(default = "default_resolve_symlinks")]
    pub resolve_symlinks: bool,
}

fn default_root_name() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

fn default_resolve_symlinks() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            metadata_dir: None,
            root_display_name: default_root_name(),
            resolve_symlinks: default_resolve_symlinks(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "itembridge", "itembridge")
        .ok_or_else(|| BridgeError::Config("Could not determine home directory".to_string()))
}

/// `$ITEMBRIDGE_HOME` when set, otherwise the platform config directory.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    Ok(project_dirs()?.config_dir().to_path_buf())
}

impl BridgeConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(BridgeError::Io)?;
        let config: BridgeConfig =
            serde_json::from_str(&content).map_err(BridgeError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(BridgeError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(BridgeError::Serialization)?;
        fs::write(config_path, content).map_err(BridgeError::Io)?;
        Ok(())
    }

    /// Managed folder, falling back to the platform data directory.
    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().join("gallery")),
        }
    }

    /// Shared tag-store directory, falling back to the platform data directory.
    pub fn metadata_dir(&self) -> Result<PathBuf> {
        match &self.metadata_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().join("shared")),
        }
    }
}
