use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::BackendType;

/// User settings kept in `~/.dossier.config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Store file used when nothing else names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    /// Backend forced for `data_path` ("yaml" or "sqlite")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Investigator logged in when the store has no session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigator: Option<String>,
}

impl Config {
    /// Loads the config file, or the defaults when it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn backend_type(&self) -> Result<Option<BackendType>> {
        self.backend.as_deref().map(str::parse::<BackendType>).transpose()
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("DOSSIER_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home_dir.join(".dossier.config"))
}

/// Store location used when nothing else is configured
pub fn default_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(data_dir.join("dossier").join("dossier.yaml"))
}
