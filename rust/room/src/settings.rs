use felt_engine::table::{TableConfig, DEFAULT_ACTION_CEILING, MAX_SEATS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_ENV: &str = "FELT_CONFIG";

/// Room configuration shared by every room a manager opens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSettings {
    pub small_blind: u32,
    pub big_blind: u32,
    pub starting_chips: u32,
    pub max_seats: usize,
    /// Delay before an automated seat acts
    pub ai_think_time_ms: u64,
    /// Pause between a finished hand and the next auto-deal
    pub hand_pause_ms: u64,
    pub auto_deal: bool,
    pub max_actions_per_street: u32,
    pub seed: Option<u64>,
    /// JSONL file finished hands are appended to
    pub history_path: Option<PathBuf>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            small_blind: 5,
            big_blind: 10,
            starting_chips: 1000,
            max_seats: 6,
            ai_think_time_ms: 800,
            hand_pause_ms: 3000,
            auto_deal: false,
            max_actions_per_street: DEFAULT_ACTION_CEILING,
            seed: None,
            history_path: None,
        }
    }
}

impl RoomSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.small_blind == 0 || self.big_blind == 0 {
            return Err(SettingsError::InvalidValue(
                "blinds must be greater than 0".to_string(),
            ));
        }
        if self.big_blind < self.small_blind {
            return Err(SettingsError::InvalidValue(
                "big_blind must be at least small_blind".to_string(),
            ));
        }
        if self.starting_chips == 0 {
            return Err(SettingsError::InvalidValue(
                "starting_chips must be greater than 0".to_string(),
            ));
        }
        if !(2..=MAX_SEATS).contains(&self.max_seats) {
            return Err(SettingsError::InvalidValue(format!(
                "max_seats must be between 2 and {}",
                MAX_SEATS
            )));
        }
        if self.max_actions_per_street == 0 {
            return Err(SettingsError::InvalidValue(
                "max_actions_per_street must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Table parameters for one room; `room_seed` overrides the configured seed.
    pub fn table_config(&self, room_seed: Option<u64>) -> TableConfig {
        TableConfig {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            max_actions_per_street: self.max_actions_per_street,
            seed: room_seed.or(self.seed),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsSources {
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub starting_chips: ValueSource,
    pub max_seats: ValueSource,
    pub ai_think_time_ms: ValueSource,
    pub hand_pause_ms: ValueSource,
    pub auto_deal: ValueSource,
    pub max_actions_per_street: ValueSource,
    pub seed: ValueSource,
    pub history_path: ValueSource,
}

impl Default for SettingsSources {
    fn default() -> Self {
        Self {
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            starting_chips: ValueSource::Default,
            max_seats: ValueSource::Default,
            ai_think_time_ms: ValueSource::Default,
            hand_pause_ms: ValueSource::Default,
            auto_deal: ValueSource::Default,
            max_actions_per_street: ValueSource::Default,
            seed: ValueSource::Default,
            history_path: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsResolved {
    pub settings: RoomSettings,
    pub sources: SettingsSources,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    starting_chips: Option<u32>,
    #[serde(default)]
    max_seats: Option<usize>,
    #[serde(default)]
    ai_think_time_ms: Option<u64>,
    #[serde(default)]
    hand_pause_ms: Option<u64>,
    #[serde(default)]
    auto_deal: Option<bool>,
    #[serde(default)]
    max_actions_per_street: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    history_path: Option<PathBuf>,
}

pub fn load() -> Result<RoomSettings, SettingsError> {
    load_with_sources().map(|resolved| resolved.settings)
}

/// Defaults, then the TOML file named by `FELT_CONFIG`, then `FELT_*`
/// environment variables. The result is validated.
pub fn load_with_sources() -> Result<SettingsResolved, SettingsError> {
    let mut cfg = RoomSettings::default();
    let mut sources = SettingsSources::default();

    if let Some(path) = env_value(CONFIG_ENV) {
        let s = fs::read_to_string(path)?;
        let f: FileSettings = toml::from_str(&s)?;
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = f.big_blind {
            cfg.big_blind = v;
            sources.big_blind = ValueSource::File;
        }
        if let Some(v) = f.starting_chips {
            cfg.starting_chips = v;
            sources.starting_chips = ValueSource::File;
        }
        if let Some(v) = f.max_seats {
            cfg.max_seats = v;
            sources.max_seats = ValueSource::File;
        }
        if let Some(v) = f.ai_think_time_ms {
            cfg.ai_think_time_ms = v;
            sources.ai_think_time_ms = ValueSource::File;
        }
        if let Some(v) = f.hand_pause_ms {
            cfg.hand_pause_ms = v;
            sources.hand_pause_ms = ValueSource::File;
        }
        if let Some(v) = f.auto_deal {
            cfg.auto_deal = v;
            sources.auto_deal = ValueSource::File;
        }
        if let Some(v) = f.max_actions_per_street {
            cfg.max_actions_per_street = v;
            sources.max_actions_per_street = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.history_path {
            cfg.history_path = Some(v);
            sources.history_path = ValueSource::File;
        }
    }

    if let Some(v) = env_parsed("FELT_SMALL_BLIND")? {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_BIG_BLIND")? {
        cfg.big_blind = v;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_STARTING_CHIPS")? {
        cfg.starting_chips = v;
        sources.starting_chips = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_MAX_SEATS")? {
        cfg.max_seats = v;
        sources.max_seats = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_AI_THINK_TIME_MS")? {
        cfg.ai_think_time_ms = v;
        sources.ai_think_time_ms = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_HAND_PAUSE_MS")? {
        cfg.hand_pause_ms = v;
        sources.hand_pause_ms = ValueSource::Env;
    }
    if let Some(v) = env_value("FELT_AUTO_DEAL") {
        cfg.auto_deal = parse_bool(&v).ok_or_else(|| {
            SettingsError::InvalidValue(format!("FELT_AUTO_DEAL is not a boolean: {}", v))
        })?;
        sources.auto_deal = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_MAX_ACTIONS_PER_STREET")? {
        cfg.max_actions_per_street = v;
        sources.max_actions_per_street = ValueSource::Env;
    }
    if let Some(v) = env_parsed("FELT_SEED")? {
        cfg.seed = Some(v);
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_value("FELT_HISTORY_PATH") {
        cfg.history_path = Some(PathBuf::from(v));
        sources.history_path = ValueSource::Env;
    }

    cfg.validate()?;
    Ok(SettingsResolved {
        settings: cfg,
        sources,
    })
}

/// Unset and empty variables are both treated as absent.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: FromStr>(key: &str) -> Result<Option<T>, SettingsError> {
    match env_value(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidValue(format!("{} is not valid: {}", key, raw))),
        None => Ok(None),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
