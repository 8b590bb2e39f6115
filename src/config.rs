/*
 *  config.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Layered configuration: built-in defaults, then a YAML file, then CLI
 *  overrides. Everything resolves into a plain `Settings` the rest of
 *  the program reads.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::cache::CacheTtls;
use crate::display::drivers::DriverKind;

const DEFAULT_NEXT_BUSES_URL: &str = "https://api.tfl.gov.uk/Line/141/Arrivals/490008766S";
const DEFAULT_LINE_STATUS_URL: &str = "https://api.tfl.gov.uk/Line/piccadilly/Status";
const DEFAULT_CUSTOM_MESSAGE_URL: &str =
    "https://gist.githubusercontent.com/Pharkie/c0b0a9f6ed1ac6ecc633d1f13cad8b48/raw";
const DEFAULT_CUSTOM_MESSAGE: &str = "Next stop: Penmaenmawr";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration as read from YAML. All fields optional so
/// layers can be merged Option-by-Option.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,
    pub driver: Option<DriverKind>,
    /// Apply the UK BST shift to the displayed time.
    pub bst: Option<bool>,
    /// Dwell on each attract-mode task for this long.
    pub change_interval_secs: Option<u64>,
    /// Per-pixel delay of the message scroller.
    pub scroll_step_ms: Option<u64>,
    /// How often the background refresh loop wakes up.
    pub cache_refresh_secs: Option<u64>,
    pub transit: Option<TransitConfig>,
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransitConfig {
    pub next_buses_url: Option<String>,
    pub line_status_url: Option<String>,
    pub custom_message_url: Option<String>,
    /// Bus line to filter arrivals to, e.g. "141".
    pub bus_line: Option<String>,
    /// Tube line id in the status feed, e.g. "piccadilly".
    pub line_id: Option<String>,
    /// Human label for the scrolled status message.
    pub line_label: Option<String>,
    /// Shown when the remote custom message cannot be fetched.
    pub default_custom_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    pub next_buses_secs: Option<i64>,
    pub line_status_secs: Option<i64>,
    pub custom_message_secs: Option<i64>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "panelclock", about = "Rolling-digit clock for an 11x53 LED matrix", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shortcut for --log-level debug
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Output driver: mock | terminal
    #[arg(long)]
    pub driver: Option<DriverKind>,
    #[arg(long, action = ArgAction::Set)]
    pub bst: Option<bool>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    load_with_cli(cli)
}

pub fn load_with_cli(cli: Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/panelclock/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/panelclock/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/panelclock.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["panelclock.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()            { dst.log_level = src.log_level; }
    if src.driver.is_some()               { dst.driver = src.driver; }
    if src.bst.is_some()                  { dst.bst = src.bst; }
    if src.change_interval_secs.is_some() { dst.change_interval_secs = src.change_interval_secs; }
    if src.scroll_step_ms.is_some()       { dst.scroll_step_ms = src.scroll_step_ms; }
    if src.cache_refresh_secs.is_some()   { dst.cache_refresh_secs = src.cache_refresh_secs; }
    match (&mut dst.transit, src.transit) {
        (None, Some(c)) => dst.transit = Some(c),
        (Some(d), Some(s)) => merge_transit(d, s),
        _ => {}
    }
    match (&mut dst.cache, src.cache) {
        (None, Some(c)) => dst.cache = Some(c),
        (Some(d), Some(s)) => merge_cache(d, s),
        _ => {}
    }
}

fn merge_transit(dst: &mut TransitConfig, src: TransitConfig) {
    if src.next_buses_url.is_some()         { dst.next_buses_url = src.next_buses_url; }
    if src.line_status_url.is_some()        { dst.line_status_url = src.line_status_url; }
    if src.custom_message_url.is_some()     { dst.custom_message_url = src.custom_message_url; }
    if src.bus_line.is_some()               { dst.bus_line = src.bus_line; }
    if src.line_id.is_some()                { dst.line_id = src.line_id; }
    if src.line_label.is_some()             { dst.line_label = src.line_label; }
    if src.default_custom_message.is_some() { dst.default_custom_message = src.default_custom_message; }
}

fn merge_cache(dst: &mut CacheConfig, src: CacheConfig) {
    if src.next_buses_secs.is_some()     { dst.next_buses_secs = src.next_buses_secs; }
    if src.line_status_secs.is_some()    { dst.line_status_secs = src.line_status_secs; }
    if src.custom_message_secs.is_some() { dst.custom_message_secs = src.custom_message_secs; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".into()); }
    if cli.driver.is_some()    { cfg.driver = cli.driver; }
    if cli.bst.is_some()       { cfg.bst = cli.bst; }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(secs) = cfg.change_interval_secs {
        if secs == 0 {
            return Err(ConfigError::Validation("change_interval_secs must be > 0".into()));
        }
    }
    if let Some(ms) = cfg.scroll_step_ms {
        if ms == 0 {
            return Err(ConfigError::Validation("scroll_step_ms must be > 0".into()));
        }
    }
    if let Some(secs) = cfg.cache_refresh_secs {
        if secs == 0 {
            return Err(ConfigError::Validation("cache_refresh_secs must be > 0".into()));
        }
    }
    if let Some(transit) = cfg.transit.as_ref() {
        for (field, url) in [
            ("next_buses_url", &transit.next_buses_url),
            ("line_status_url", &transit.line_status_url),
            ("custom_message_url", &transit.custom_message_url),
        ] {
            if let Some(u) = url {
                if !u.starts_with("http://") && !u.starts_with("https://") {
                    return Err(ConfigError::Validation(format!(
                        "transit.{} must be an http(s) URL",
                        field
                    )));
                }
            }
        }
    }
    if let Some(cache) = cfg.cache.as_ref() {
        for (field, secs) in [
            ("next_buses_secs", cache.next_buses_secs),
            ("line_status_secs", cache.line_status_secs),
            ("custom_message_secs", cache.custom_message_secs),
        ] {
            if let Some(s) = secs {
                if s <= 0 {
                    return Err(ConfigError::Validation(format!(
                        "cache.{} must be > 0",
                        field
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Resolved transit endpoints and identifiers.
#[derive(Debug, Clone)]
pub struct TransitSettings {
    pub next_buses_url: String,
    pub line_status_url: String,
    pub custom_message_url: String,
    pub bus_line: String,
    pub line_id: String,
    pub line_label: String,
}

impl Default for TransitSettings {
    fn default() -> Self {
        TransitSettings {
            next_buses_url: DEFAULT_NEXT_BUSES_URL.into(),
            line_status_url: DEFAULT_LINE_STATUS_URL.into(),
            custom_message_url: DEFAULT_CUSTOM_MESSAGE_URL.into(),
            bus_line: "141".into(),
            line_id: "piccadilly".into(),
            line_label: "Piccadilly".into(),
        }
    }
}

/// Fully-resolved runtime settings, defaults applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: String,
    pub driver: DriverKind,
    pub bst: bool,
    pub change_interval: Duration,
    pub scroll_step: Duration,
    pub cache_refresh: Duration,
    pub transit: TransitSettings,
    pub ttls: CacheTtls,
    pub default_custom_message: String,
}

impl Config {
    /// Collapse the layered Options into concrete settings.
    pub fn resolve(&self) -> Settings {
        let defaults = TransitSettings::default();
        let transit = self.transit.clone().unwrap_or_default();
        let cache = self.cache.clone().unwrap_or_default();
        let default_ttls = CacheTtls::default();
        Settings {
            log_level: self.log_level.clone().unwrap_or_else(|| "info".into()),
            driver: self.driver.unwrap_or(DriverKind::Terminal),
            bst: self.bst.unwrap_or(true),
            change_interval: Duration::from_secs(self.change_interval_secs.unwrap_or(6)),
            scroll_step: Duration::from_millis(self.scroll_step_ms.unwrap_or(30)),
            cache_refresh: Duration::from_secs(self.cache_refresh_secs.unwrap_or(60)),
            transit: TransitSettings {
                next_buses_url: transit.next_buses_url.unwrap_or(defaults.next_buses_url),
                line_status_url: transit.line_status_url.unwrap_or(defaults.line_status_url),
                custom_message_url: transit
                    .custom_message_url
                    .unwrap_or(defaults.custom_message_url),
                bus_line: transit.bus_line.unwrap_or(defaults.bus_line),
                line_id: transit.line_id.unwrap_or(defaults.line_id),
                line_label: transit.line_label.unwrap_or(defaults.line_label),
            },
            ttls: CacheTtls {
                next_buses_secs: cache.next_buses_secs.unwrap_or(default_ttls.next_buses_secs),
                line_status_secs: cache
                    .line_status_secs
                    .unwrap_or(default_ttls.line_status_secs),
                custom_message_secs: cache
                    .custom_message_secs
                    .unwrap_or(default_ttls.custom_message_secs),
            },
            default_custom_message: self
                .transit
                .as_ref()
                .and_then(|t| t.default_custom_message.clone())
                .unwrap_or_else(|| DEFAULT_CUSTOM_MESSAGE.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_original_endpoints() {
        let settings = Config::default().resolve();
        assert_eq!(settings.transit.bus_line, "141");
        assert_eq!(settings.transit.line_id, "piccadilly");
        assert!(settings.transit.next_buses_url.contains("api.tfl.gov.uk"));
        assert_eq!(settings.change_interval, Duration::from_secs(6));
        assert_eq!(settings.ttls.next_buses_secs, 60);
        assert_eq!(settings.default_custom_message, "Next stop: Penmaenmawr");
        assert!(settings.bst);
    }

    #[test]
    fn yaml_layer_overrides_defaults() {
        let yaml: Config = serde_yaml::from_str(
            r#"
            bst: false
            change_interval_secs: 10
            transit:
              bus_line: "29"
            cache:
              next_buses_secs: 90
            "#,
        )
        .unwrap();
        let mut cfg = Config::default();
        merge(&mut cfg, yaml);
        let settings = cfg.resolve();
        assert!(!settings.bst);
        assert_eq!(settings.change_interval, Duration::from_secs(10));
        assert_eq!(settings.transit.bus_line, "29");
        assert_eq!(settings.ttls.next_buses_secs, 90);
        // untouched fields keep their defaults
        assert_eq!(settings.transit.line_id, "piccadilly");
        assert_eq!(settings.ttls.line_status_secs, 300);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cfg = Config {
            change_interval_secs: Some(0),
            ..Config::default()
        };
        assert!(validate(&cfg).is_err());

        let cfg = Config {
            transit: Some(TransitConfig {
                next_buses_url: Some("ftp://nope".into()),
                ..TransitConfig::default()
            }),
            ..Config::default()
        };
        assert!(validate(&cfg).is_err());

        assert!(validate(&Config::default()).is_ok());
    }
}
