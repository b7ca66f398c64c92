use crate::board::LoadOptions;
use crate::storage::{MalformedLines, StorageType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub const KEYS: &[&str] = &["board.path", "storage.type", "load.malformed-lines"];
const VALID_STORAGE_TYPES: &[&str] = &["text", "json"];
const VALID_MALFORMED_POLICIES: &[&str] = &["abort", "skip"];

fn validate_board_path(path: &str) -> Result<PathBuf, ConfigError> {
    if path.contains('\0') {
        return Err(ConfigError::InvalidConfig(
            "Path contains invalid characters".to_string(),
        ));
    }
    if path.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "Path cannot be empty".to_string(),
        ));
    }

    let path = shellexpand::tilde(path);
    Ok(PathBuf::from(path.as_ref()))
}

fn validate_storage_type(value: &str) -> Result<(), ConfigError> {
    if StorageType::from_str(value).is_none() {
        return Err(ConfigError::InvalidConfig(format!(
            "storage.type must be one of: {}",
            VALID_STORAGE_TYPES.join(", ")
        )));
    }
    Ok(())
}

fn validate_malformed_policy(value: &str) -> Result<(), ConfigError> {
    if MalformedLines::from_str(value).is_none() {
        return Err(ConfigError::InvalidConfig(format!(
            "load.malformed-lines must be one of: {}",
            VALID_MALFORMED_POLICIES.join(", ")
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub board_path: Option<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub malformed_lines: Option<String>,
}

impl Config {
    pub fn with_defaults() -> Self {
        Self {
            board_path: default_board_path(),
            storage_type: None,
            malformed_lines: Some(MalformedLines::default().to_str().to_string()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.board_path {
            validate_board_path(path)?;
        }
        if let Some(ref storage_type) = self.storage_type {
            validate_storage_type(storage_type)?;
        }
        if let Some(ref policy) = self.malformed_lines {
            validate_malformed_policy(policy)?;
        }
        Ok(())
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("aacboard"))
}

fn default_board_path() -> Option<String> {
    config_dir().map(|dir| dir.join("board.txt").to_string_lossy().to_string())
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    config_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or_else(|| ConfigError::InvalidConfig("Could not determine home directory".to_string()))
}

pub struct ConfigManager {
    path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Opens the config at `config_path` (or the default location). A
    /// missing file means an empty config; nothing is written until `set`.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                Config::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            Config::default()
        };
        config.validate()?;

        Ok(Self { path, config })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "board.path" => self.config.board_path.clone(),
            "storage.type" => self.config.storage_type.clone(),
            "load.malformed-lines" => self.config.malformed_lines.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();

        match key {
            "board.path" => {
                let path = validate_board_path(value)?;
                config.board_path = Some(path.to_string_lossy().to_string());
            }
            "storage.type" => {
                validate_storage_type(value)?;
                config.storage_type = Some(value.to_lowercase());
            }
            "load.malformed-lines" => {
                validate_malformed_policy(value)?;
                config.malformed_lines = Some(value.to_lowercase());
            }
            _ => {
                return Err(ConfigError::InvalidKey(key.to_string()));
            }
        }
        config.validate()?;
        self.config = config;
        self.save()
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "board.path" => self.config.board_path = None,
            "storage.type" => self.config.storage_type = None,
            "load.malformed-lines" => self.config.malformed_lines = None,
            _ => return Err(ConfigError::InvalidKey(key.to_string())),
        }
        self.save()
    }

    /// Every key with its effective value and whether that value is a default.
    pub fn list(&self) -> Vec<(String, String, bool)> {
        let defaults = Config::with_defaults();
        let default_of = |key: &str| -> String {
            let value = match key {
                "board.path" => defaults.board_path.clone(),
                "storage.type" => defaults.storage_type.clone(),
                "load.malformed-lines" => defaults.malformed_lines.clone(),
                _ => None,
            };
            value.unwrap_or_else(|| "null".to_string())
        };

        KEYS.iter()
            .map(|key| match self.get(key) {
                Some(value) => (key.to_string(), value, false),
                None => (key.to_string(), default_of(key), true),
            })
            .collect()
    }

    pub fn board_path(&self) -> Result<PathBuf, ConfigError> {
        match self.config.board_path.as_deref() {
            Some(path) => validate_board_path(path),
            None => default_board_path()
                .map(PathBuf::from)
                .ok_or_else(|| {
                    ConfigError::InvalidConfig("Could not determine home directory".to_string())
                }),
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            storage_type: self
                .config
                .storage_type
                .as_deref()
                .and_then(StorageType::from_str),
            malformed: self
                .config
                .malformed_lines
                .as_deref()
                .and_then(MalformedLines::from_str)
                .unwrap_or_default(),
        }
    }
}
