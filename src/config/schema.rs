use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::compare::{ComparableField, MAX_COMPARE};

pub const DEFAULT_CACHE_TTL: &str = "10m";
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub theme: ThemeSetting,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            compare: CompareConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            theme: ThemeSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// In-memory store seeded from a JSON fixture
    #[default]
    Local,
    /// HTTP API
    Remote,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Fixture for the local store; the bundled seed data is used when unset
    #[serde(default)]
    pub fixture: Option<PathBuf>,
    /// Base URL of the API, e.g. http://localhost:5000/api
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
}

fn default_cache_ttl() -> String {
    DEFAULT_CACHE_TTL.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Local,
            fixture: None,
            api_url: None,
            cache_ttl: default_cache_ttl(),
        }
    }
}

impl SourceConfig {
    /// Parsed `cache_ttl`, falling back to the default when unparseable
    pub fn cache_ttl(&self) -> Duration {
        humantime::parse_duration(&self.cache_ttl)
            .unwrap_or_else(|_| Duration::from_secs(600))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    #[serde(default = "default_max_colleges")]
    pub max_colleges: usize,
    #[serde(default = "default_compare_fields")]
    pub fields: Vec<ComparableField>,
}

fn default_max_colleges() -> usize {
    MAX_COMPARE
}

fn default_compare_fields() -> Vec<ComparableField> {
    ComparableField::ALL.to_vec()
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_colleges: default_max_colleges(),
            fields: default_compare_fields(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    /// Detect from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}
