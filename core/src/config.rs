use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::id::IdStrategy;

const APP_DIR_NAME: &str = ".tasknote";
const CONFIG_FILE_NAME: &str = "config.json";
const LOG_DIR_NAME: &str = "logs";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Data directory selected in an earlier session.
    pub directory: Option<PathBuf>,
    pub id_strategy: IdStrategy,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            directory: None,
            id_strategy: IdStrategy::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Expands a leading `~` to the home directory. Other paths, and `~` when no
/// home directory is known, come back unchanged.
pub fn expand_home(input: &str) -> PathBuf {
    let rest = match input.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => &rest[1..],
        _ => return PathBuf::from(input),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(input),
    }
}

/// Reads and writes [`AppConfig`] as JSON, by default at
/// `~/.tasknote/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    file_path: PathBuf,
}

impl ConfigStore {
    pub fn new(file_path: Option<PathBuf>) -> Result<Self> {
        let file_path = match file_path {
            Some(path) => path,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
            }
        };
        Ok(ConfigStore { file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Directory for log files, next to the config file.
    pub fn log_dir(&self) -> PathBuf {
        self.file_path
            .parent()
            .map(|dir| dir.join(LOG_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME))
    }

    /// Missing file means defaults.
    pub fn load(&self) -> Result<AppConfig> {
        if !self.file_path.exists() {
            return Ok(AppConfig::default());
        }
        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open {}", self.file_path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", self.file_path.display()))?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(dir) = self.file_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(&self.file_path)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, config)?;
        writer.flush()?;
        Ok(())
    }
}
