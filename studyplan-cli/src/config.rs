use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_studyplan_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSection {
    /// IANA zone used for local due dates, calendar days and hour-of-day stats.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Default number of tasks `list` prints.
    #[serde(default = "default_max_tasks_per_day")]
    pub max_tasks_per_day: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    /// tracing filter directive, overridden by RUST_LOG.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

fn default_max_tasks_per_day() -> usize {
    8
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            max_tasks_per_day: default_max_tasks_per_day(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        studyplan_core::parse_timezone(&self.planner.timezone)
            .context("config.toml [planner] timezone")
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
