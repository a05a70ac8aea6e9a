//! Tag engine settings, read from `~/.tagspace/config.toml`.
//!
//! ```toml
//! revisable_realms = ["wiki"]
//! fast_permission_check = false
//!
//! [realms.wiki]
//! exclude_prefixes = ["PageTemplates/"]
//! ```

mod loader;

pub use loader::{load_config, load_config_from};

use crate::tag::ResourceFilter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML {path}: {message}")]
    Toml { path: PathBuf, message: String },
}

fn default_revisable_realms() -> Vec<String> {
    vec!["wiki".to_owned()]
}

fn default_realms() -> BTreeMap<String, RealmConfig> {
    let mut realms = BTreeMap::new();
    realms.insert(
        "wiki".to_owned(),
        RealmConfig {
            exclude_prefixes: vec!["PageTemplates/".to_owned()],
        },
    );
    realms.insert("ticket".to_owned(), RealmConfig::default());
    realms
}

/// Per-realm settings (`[realms.<name>]` tables).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RealmConfig {
    /// Resource ids starting with any of these are never reported.
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TagsConfig {
    /// Realms whose tag changes are written to the change log.
    #[serde(default = "default_revisable_realms")]
    pub revisable_realms: Vec<String>,
    /// Check permissions once per realm instead of once per resource, when
    /// the host policy has no per-resource rules.
    #[serde(default)]
    pub fast_permission_check: bool,
    #[serde(default = "default_realms")]
    pub realms: BTreeMap<String, RealmConfig>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            revisable_realms: default_revisable_realms(),
            fast_permission_check: false,
            realms: default_realms(),
        }
    }
}

impl TagsConfig {
    #[must_use]
    pub fn is_revisable(&self, realm: &str) -> bool {
        self.revisable_realms.iter().any(|r| r == realm)
    }

    /// Every realm the configuration mentions.
    #[must_use]
    pub fn realm_names(&self) -> BTreeSet<String> {
        self.realms
            .keys()
            .chain(self.revisable_realms.iter())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn filter_for(&self, realm: &str) -> ResourceFilter {
        self.realms
            .get(realm)
            .map(|settings| ResourceFilter::excluding(settings.exclude_prefixes.iter().cloned()))
            .unwrap_or_default()
    }
}

/// Resolve the canonical path for the config file.
#[must_use]
pub fn config_path() -> PathBuf {
    crate::utils::tagspace_home().join("config.toml")
}

#[cfg(test)]
#[path = "../config_tests.rs"]
mod config_tests;
