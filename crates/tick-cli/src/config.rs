use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tick_core::error::CoreError;
use tick_core::models::{parse_priority, TaskPriority};

/// Overrides the data directory (tasks, audit log and config).
pub const HOME_ENV: &str = "TICK_HOME";
pub const CONFIG_FILE: &str = "config.toml";

const MASK: &str = "********";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Priority for tasks whose title and flags name none.
    pub default_priority: TaskPriority,
    /// IANA timezone used to resolve relative dates.
    pub timezone: String,
    /// Ask before storing a due date that had to be guessed.
    pub confirm_ambiguous: bool,
    /// Filters `list` applies when no query is given, joined with `and`.
    pub default_filters: Vec<String>,
    pub sync: SyncConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SyncConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_priority: TaskPriority::Medium,
            timezone: detect_system_timezone(),
            confirm_ambiguous: true,
            default_filters: Vec::new(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, then `<data_dir>/config.toml`, then `TICK_*` environment
    /// variables (`TICK_SYNC__TOKEN` for nested keys).
    pub fn load(data_dir: &Path) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(data_dir.join(CONFIG_FILE)))
            .merge(Env::prefixed("TICK_").split("__"))
            .extract()
    }

    pub fn tz(&self) -> Result<Tz> {
        validate_timezone(&self.timezone).map_err(|e| anyhow!(CoreError::InvalidInput(e)))
    }

    /// Copy safe to print: the sync token is replaced by a mask.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.sync.token = masked.sync.token.as_ref().map(|_| MASK.to_string());
        masked
    }
}

/// `$TICK_HOME`, or the platform data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("dev", "tick", "tick")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine a data directory; set {HOME_ENV}"))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Validates that a timezone string is a valid IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, String> {
    Tz::from_str(timezone).map_err(|_| {
        format!(
            "Invalid timezone: '{}'. Use IANA timezone names like 'America/New_York'",
            timezone
        )
    })
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

/// Keys accepted by `tick config set`.
pub const SETTABLE_KEYS: &[&str] = &[
    "default_priority",
    "timezone",
    "confirm_ambiguous",
    "default_filters",
    "sync.provider",
    "sync.endpoint",
    "sync.token",
];

/// Validates `value` for `key` and converts it to its TOML form.
fn settable_value(key: &str, value: &str) -> Result<toml::Value> {
    let value = match key {
        "default_priority" => toml::Value::String(parse_priority(value)?.to_string()),
        "timezone" => {
            validate_timezone(value).map_err(CoreError::InvalidInput)?;
            toml::Value::String(value.to_string())
        }
        "confirm_ambiguous" => {
            let flag = match value.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => {
                    return Err(anyhow!(CoreError::InvalidInput(format!(
                        "'{value}' is not a boolean"
                    ))))
                }
            };
            toml::Value::Boolean(flag)
        }
        "default_filters" => toml::Value::Array(
            value
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(|f| toml::Value::String(f.to_string()))
                .collect(),
        ),
        "sync.provider" | "sync.endpoint" | "sync.token" => {
            toml::Value::String(value.to_string())
        }
        _ => {
            return Err(anyhow!(CoreError::InvalidInput(format!(
                "Unknown config key '{key}'. Known keys: {}",
                SETTABLE_KEYS.join(", ")
            ))))
        }
    };
    Ok(value)
}

/// Writes one key into `config.toml`, keeping every other entry.
pub fn set_value(data_dir: &Path, key: &str, value: &str) -> Result<()> {
    let value = settable_value(key, value)?;
    let path = config_path(data_dir);

    let mut table = if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        raw.parse::<toml::Table>()
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    match key.split_once('.') {
        Some((section, field)) => {
            let entry = table
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            let toml::Value::Table(section_table) = entry else {
                return Err(anyhow!(CoreError::InvalidInput(format!(
                    "'{section}' in {} is not a table",
                    path.display()
                ))));
            };
            section_table.insert(field.to_string(), value);
        }
        None => {
            table.insert(key.to_string(), value);
        }
    }

    std::fs::create_dir_all(data_dir)?;
    std::fs::write(&path, toml::to_string_pretty(&table)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(key, path = %path.display(), "updated config");
    Ok(())
}
