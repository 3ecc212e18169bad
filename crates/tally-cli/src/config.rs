// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_table::{
    DEFAULT_BASELINE, DEFAULT_INCREMENT, DEFAULT_REVEAL_DELAY, DEFAULT_SCROLL_THRESHOLD_PX,
    TableOptions, WindowConfig,
};
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "tally";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub table: TableSection,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            table: TableSection::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSection {
    pub baseline: Option<usize>,
    pub increment: Option<usize>,
    pub scroll_threshold_px: Option<f64>,
    pub reveal_delay: Option<String>,
    pub search_debounce: Option<String>,
}

impl Default for TableSection {
    fn default() -> Self {
        Self {
            baseline: Some(DEFAULT_BASELINE),
            increment: Some(DEFAULT_INCREMENT),
            scroll_threshold_px: Some(DEFAULT_SCROLL_THRESHOLD_PX),
            reveal_delay: Some("150ms".to_owned()),
            search_debounce: Some("0ms".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            filter: Some(DEFAULT_LOG_FILTER.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TALLY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TALLY_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [table] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(baseline) = self.table.baseline
            && baseline == 0
        {
            bail!("table.baseline in {} must be positive, got 0", path.display());
        }

        if let Some(increment) = self.table.increment
            && increment == 0
        {
            bail!("table.increment in {} must be positive, got 0", path.display());
        }

        if let Some(threshold) = self.table.scroll_threshold_px
            && (!threshold.is_finite() || threshold < 0.0)
        {
            bail!(
                "table.scroll_threshold_px in {} must be non-negative, got {}",
                path.display(),
                threshold
            );
        }

        if let Some(delay) = &self.table.reveal_delay {
            parse_duration(delay)
                .with_context(|| format!("table.reveal_delay in {}", path.display()))?;
        }

        if let Some(debounce) = &self.table.search_debounce {
            parse_duration(debounce)
                .with_context(|| format!("table.search_debounce in {}", path.display()))?;
        }

        if let Some(filter) = &self.log.filter {
            EnvFilter::try_new(filter)
                .with_context(|| format!("log.filter {filter:?} in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn table_options(&self) -> Result<TableOptions> {
        let window = WindowConfig {
            baseline: self.table.baseline.unwrap_or(DEFAULT_BASELINE),
            increment: self.table.increment.unwrap_or(DEFAULT_INCREMENT),
            scroll_threshold_px: self
                .table
                .scroll_threshold_px
                .unwrap_or(DEFAULT_SCROLL_THRESHOLD_PX),
            reveal_delay: match &self.table.reveal_delay {
                Some(raw) => parse_duration(raw)?,
                None => DEFAULT_REVEAL_DELAY,
            },
        };
        window.validate()?;

        let search_debounce = match &self.table.search_debounce {
            Some(raw) => parse_duration(raw)?,
            None => Duration::ZERO,
        };
        Ok(TableOptions {
            window,
            search_debounce,
        })
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tally config\n# Place this file at: {}\n\nversion = 1\n\n[table]\n# Rows shown before any reveal, and rows added per reveal.\nbaseline = {}\nincrement = {}\n# Reveal when the list is scrolled within this many pixels of the end.\nscroll_threshold_px = {:.1}\nreveal_delay = \"150ms\"\n# 0ms filters on every keystroke.\nsearch_debounce = \"0ms\"\n\n[log]\n# Overridden by the TALLY_LOG environment variable.\nfilter = \"{}\"\n",
            path.display(),
            DEFAULT_BASELINE,
            DEFAULT_INCREMENT,
            DEFAULT_SCROLL_THRESHOLD_PX,
            DEFAULT_LOG_FILTER,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let Some(secs) = mins.checked_mul(60) else {
            bail!("duration {raw:?} is too large");
        };
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 150ms or 1s)")
}
