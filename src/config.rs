use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "TWOFA_CONFIG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub period: u64,                     // секунды, обычно 30
    pub accounts_file: Option<PathBuf>,
    pub biometrics_enabled: bool,        // читает только слой разблокировки
    pub log_level: String,               // "warn", "info", "debug", ...
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            period: twofa::DEFAULT_PERIOD.get(),
            accounts_file: None,
            biometrics_enabled: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;
        Self::load_from(&path)
    }

    /// Нет файла — значения по умолчанию.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&data)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        cfg.period()?;
        Ok(cfg)
    }

    pub fn period(&self) -> anyhow::Result<NonZeroU64> {
        NonZeroU64::new(self.period).ok_or_else(|| anyhow!("config period must be greater than zero"))
    }
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let mut dir = dirs::config_dir().ok_or_else(|| anyhow!("cannot get config dir"))?;
    dir.push("twofa");
    Ok(dir.join("config.json"))
}

pub fn save_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, s)
        .with_context(|| format!("cannot write config file {}", path.display()))?;
    Ok(())
}
