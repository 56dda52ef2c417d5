//! Runtime configuration for the presence stack.
//!
//! # Responsibility
//! - Collect storage, logging and resolution settings from JSON or the
//!   environment, layered over defaults.
//! - Validate values once so downstream code can rely on them.
//!
//! # Invariants
//! - `priority_order` is non-empty and duplicate-free after `validate`.
//! - `shift_grace_minutes >= 0`, `lock_shards >= 1`.

use crate::engine::priority_table::{PriorityTable, PriorityTableError};
use crate::logging::default_log_level;
use crate::model::priority::PriorityLabel;
use crate::model::shift::DEFAULT_SHIFT_GRACE_MS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PRESENCE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PRESENCE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PRESENCE_LOG_DIR";
pub const ENV_SHIFT_GRACE_MINUTES: &str = "PRESENCE_SHIFT_GRACE_MINUTES";
pub const ENV_PRIORITY_ORDER: &str = "PRESENCE_PRIORITY_ORDER";
pub const ENV_LOCK_SHARDS: &str = "PRESENCE_LOCK_SHARDS";

const DEFAULT_LOCK_SHARDS: usize = 16;
const MS_PER_MINUTE: i64 = 60 * 1000;

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidValue { key: &'static str, value: String },
    PriorityTable(PriorityTableError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::PriorityTable(err) => write!(f, "invalid priority_order: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::PriorityTable(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<PriorityTableError> for ConfigError {
    fn from(value: PriorityTableError) -> Self {
        Self::PriorityTable(value)
    }
}

/// Settings for the presence service, its store and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// SQLite file; in-memory database when `None`.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub shift_grace_minutes: i64,
    /// Highest precedence first.
    pub priority_order: Vec<String>,
    pub lock_shards: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            shift_grace_minutes: DEFAULT_SHIFT_GRACE_MS / MS_PER_MINUTE,
            priority_order: PriorityLabel::DEFAULT_ORDER
                .iter()
                .map(|label| label.as_str().to_string())
                .collect(),
            lock_shards: DEFAULT_LOCK_SHARDS,
        }
    }
}

impl PresenceConfig {
    /// Parses JSON; missing keys fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `PRESENCE_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`, keyed like the env vars.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_SHIFT_GRACE_MINUTES) {
            config.shift_grace_minutes = parse_number(ENV_SHIFT_GRACE_MINUTES, &value)?;
        }
        if let Some(value) = get(ENV_PRIORITY_ORDER) {
            config.priority_order = value
                .split(',')
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect();
        }
        if let Some(value) = get(ENV_LOCK_SHARDS) {
            config.lock_shards = parse_number(ENV_LOCK_SHARDS, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shift_grace_minutes < 0 {
            return Err(ConfigError::InvalidValue {
                key: "shift_grace_minutes",
                value: self.shift_grace_minutes.to_string(),
            });
        }
        if self.lock_shards == 0 {
            return Err(ConfigError::InvalidValue {
                key: "lock_shards",
                value: "0".to_string(),
            });
        }
        self.priority_table()?;
        Ok(())
    }

    pub fn priority_table(&self) -> Result<PriorityTable, PriorityTableError> {
        PriorityTable::from_labels(&self.priority_order)
    }

    pub fn shift_grace_ms(&self) -> i64 {
        self.shift_grace_minutes.saturating_mul(MS_PER_MINUTE)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PresenceConfig, ENV_LOCK_SHARDS, ENV_PRIORITY_ORDER};
    use crate::model::priority::PriorityLabel;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_builtin_table_and_grace() {
        let config = PresenceConfig::default();
        assert_eq!(config.shift_grace_ms(), 10 * 60 * 1000);
        assert_eq!(
            config.priority_table().unwrap().labels(),
            PriorityLabel::DEFAULT_ORDER.as_slice()
        );
        config.validate().unwrap();
    }

    #[test]
    fn json_fills_missing_keys_with_defaults() {
        let config = PresenceConfig::from_json_str(r#"{"shift_grace_minutes": 5}"#).unwrap();
        assert_eq!(config.shift_grace_ms(), 5 * 60 * 1000);
        assert_eq!(config.lock_shards, 16);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn json_rejects_duplicate_priorities() {
        let err = PresenceConfig::from_json_str(r#"{"priority_order": ["TASK", "TASK"]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::PriorityTable(_)));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PRIORITY_ORDER, "CALENDAR, TASK ,EMERGENCY"),
            (ENV_LOCK_SHARDS, "4"),
        ]);
        let config =
            PresenceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.priority_order, ["CALENDAR", "TASK", "EMERGENCY"]);
        assert_eq!(config.lock_shards, 4);
    }

    #[test]
    fn lookup_rejects_unparseable_numbers() {
        let err = PresenceConfig::from_lookup(|key| {
            (key == ENV_LOCK_SHARDS).then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOCK_SHARDS));
    }
}
