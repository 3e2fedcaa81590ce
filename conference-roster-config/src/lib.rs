use core::fmt::{Debug, Display};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "roster.toml";
pub const ENV_PREFIX: &str = "ROSTER_";

/// Thresholds that protect the store from truncated feeds.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ImportConfig {
    /// A participant feed with fewer rows than this is rejected before any
    /// mutation is staged.
    pub min_participants: usize,
    pub min_classes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            min_participants: 20,
            min_classes: 10,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    /// Districts are only kept for participants registered with this council.
    #[serde(default = "default_home_council")]
    pub home_council: String,
    #[serde(default)]
    pub import: ImportConfig,
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Config {
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }
}

fn default_home_council() -> String {
    "Pacific Skyline".to_owned()
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// `roster.toml` in the working directory, overridden by `ROSTER_*` variables.
/// Nested keys use a double underscore, e.g. `ROSTER_IMPORT__MIN_CLASSES`.
#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Config::from_figment(&figment())
}
