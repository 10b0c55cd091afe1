use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";

/// Application configuration, loaded from `config.toml` in the data directory.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
            user_agent: concat!("hack_or_snooze/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageSection {
    /// Where the credential database lives. Defaults to `~/.hack_or_snooze`.
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// doesn't exist. Environment variables override file values.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Config file location: `HOS_CONFIG` if set, otherwise inside the default data dir.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("HOS_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        Ok(default_data_dir()?.join("config.toml"))
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("HOS_API_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = var("HOS_TIMEOUT_SECS") {
            self.api.timeout_secs = secs
                .parse()
                .with_context(|| format!("HOS_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        if let Some(dir) = var("HOS_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home_dir.join(".hack_or_snooze"))
}
