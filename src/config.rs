use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::kana::Category;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Number of completed runs kept in the history store
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PracticeConfig {
    pub default_count: usize,
    pub categories: Vec<String>,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            default_count: 10,
            categories: Category::ALL.iter().map(|c| c.key().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub theme: String,
    pub history: HistoryConfig,
    pub practice: PracticeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            theme: "default".to_string(),
            history: HistoryConfig::default(),
            practice: PracticeConfig::default(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Result<Config>;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Reads the config, writing the defaults first if the file is missing
    fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            info!("no config at {}, writing defaults", self.path.display());
            let cfg = Config::default();
            self.save(&cfg)?;
            return Ok(cfg);
        }

        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
