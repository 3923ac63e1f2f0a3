use crate::error::QuestError;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::storage::json_store;
use crate::tracker::TrackerSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "QUESTLOG_CONFIG_PATH";
const DEFAULT_MESSAGE_SECONDS: u64 = 3;
pub const MAX_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

/// Lowercases and collapses punctuation to `_`, then maps known aliases.
pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Normalises a key such as ` Page-Size ` to `page_size`.
pub fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub message_seconds: Option<u64>,
    #[serde(default)]
    pub store_path: Option<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), QuestError> {
        if self.page_size == Some(0) {
            return Err(QuestError::invalid_config("page_size must be at least 1"));
        }
        if self.page_size.is_some_and(|size| size > MAX_PAGE_SIZE) {
            return Err(QuestError::invalid_config(format!(
                "page_size must be at most {MAX_PAGE_SIZE}"
            )));
        }
        if self.message_seconds == Some(0) {
            return Err(QuestError::invalid_config(
                "message_seconds must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn tracker_settings(&self) -> Result<TrackerSettings, QuestError> {
        self.validate()?;
        let seconds = self.message_seconds.unwrap_or(DEFAULT_MESSAGE_SECONDS);
        let seconds = i64::try_from(seconds)
            .map_err(|_| QuestError::invalid_config("message_seconds is too large"))?;

        Ok(TrackerSettings {
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            message_duration: Duration::seconds(seconds),
        })
    }

    /// `QUESTLOG_STORE_PATH` wins over the config file, which wins over the
    /// platform default.
    pub fn store_path(&self) -> Result<PathBuf, QuestError> {
        if let Some(path) = json_store::env_store_path() {
            return Ok(path);
        }

        match self.store_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => json_store::default_store_path(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<QuestError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub page_size: Option<usize>,
    pub message_seconds: Option<u64>,
    pub store_path: Option<String>,
}

impl ConfigOverrides {
    /// Applies one `KEY=VALUE` pair.
    pub fn apply(&mut self, raw: &str) -> Result<(), QuestError> {
        let (key, value) = raw
            .trim()
            .split_once('=')
            .ok_or_else(|| QuestError::invalid_config("override must be in KEY=VALUE format"))?;
        let value = value.trim();

        match canonical_key(key).as_str() {
            "" => return Err(QuestError::invalid_config("override key cannot be empty")),
            "theme" => self.theme = Some(value.to_string()),
            "page_size" => {
                let size = usize::try_from(parse_positive(value, "page_size")?)
                    .ok()
                    .filter(|size| *size <= MAX_PAGE_SIZE)
                    .ok_or_else(|| {
                        QuestError::invalid_config(format!(
                            "page_size must be at most {MAX_PAGE_SIZE}"
                        ))
                    })?;
                self.page_size = Some(size);
            }
            "message_seconds" => {
                self.message_seconds = Some(parse_positive(value, "message_seconds")?)
            }
            "store_path" => {
                if value.is_empty() {
                    return Err(QuestError::invalid_config("store_path cannot be empty"));
                }
                self.store_path = Some(value.to_string());
            }
            other => {
                return Err(QuestError::invalid_config(format!(
                    "unknown config field '{other}'"
                )));
            }
        }

        Ok(())
    }
}

fn parse_positive(value: &str, field: &str) -> Result<u64, QuestError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(QuestError::invalid_config(format!(
            "{field} must be a positive integer"
        ))),
    }
}

pub fn config_path() -> Result<PathBuf, QuestError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| QuestError::invalid_config("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("questlog")
            .join(CONFIG_FILE_NAME))
    } else {
        let home =
            std::env::var("HOME").map_err(|_| QuestError::invalid_config("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("questlog")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config() -> Result<Config, QuestError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config_from_path(&path)
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, QuestError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| QuestError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        QuestError::invalid_config(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config.validate()?;
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }
    if let Some(page_size) = overrides.page_size {
        merged.page_size = Some(page_size);
    }
    if let Some(seconds) = overrides.message_seconds {
        merged.message_seconds = Some(seconds);
    }
    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path = Some(path.clone());
    }
    merged
}
