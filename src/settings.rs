//! Store configuration.
//!
//! A [`StoreConfig`] is owned by each [`crate::construct::Database`], so two
//! stores in the same process never share a connection or a policy. Configs
//! are usually built in code, but [`Settings`] can also read them from a
//! settings file (any format the `config` crate understands) with
//! `EAVCLAD_*` environment variables layered on top.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where facts live.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// Process-lifetime only.
    #[default]
    InMemory,
    /// SQLite file, every write is flushed before the call returns.
    File(PathBuf),
}

/// What `set_attribute` does when the entity does not exist yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEntityPolicy {
    #[default]
    AutoCreate,
    Strict,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub persistence: PersistenceMode,
    pub missing_entity: MissingEntityPolicy,
}

impl StoreConfig {
    pub fn new(persistence: PersistenceMode) -> Self {
        Self {
            persistence,
            missing_entity: MissingEntityPolicy::default(),
        }
    }
    pub fn in_memory() -> Self {
        Self::new(PersistenceMode::InMemory)
    }
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(PersistenceMode::File(path.into()))
    }
    pub fn strict(mut self) -> Self {
        self.missing_entity = MissingEntityPolicy::Strict;
        self
    }
}

/// Everything the driver binary reads at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub persistence: PersistenceMode,
    pub missing_entity: MissingEntityPolicy,
    /// JSON file of entity records applied right after the store opens.
    pub bulk_load_file: Option<PathBuf>,
}

impl Settings {
    /// Reads `<name>.{toml,json,yaml,...}` from the working directory if it
    /// exists, then applies `EAVCLAD_*` overrides
    /// (e.g. `EAVCLAD_PERSISTENCE__FILE=eav.db`).
    pub fn load(name: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("EAVCLAD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
    /// Reads one specific settings file, no environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            persistence: self.persistence.clone(),
            missing_entity: self.missing_entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_to_in_memory_auto_create() {
        let config = StoreConfig::default();
        assert_eq!(config.persistence, PersistenceMode::InMemory);
        assert_eq!(config.missing_entity, MissingEntityPolicy::AutoCreate);
        assert_eq!(StoreConfig::in_memory().strict().missing_entity, MissingEntityPolicy::Strict);
    }

    #[test]
    fn reads_a_toml_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eavclad.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "missing_entity = \"strict\"\nbulk_load_file = \"seed.json\"\n\n[persistence]\nfile = \"eav.db\""
        )
        .unwrap();
        drop(file);

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.persistence, PersistenceMode::File(PathBuf::from("eav.db")));
        assert_eq!(settings.missing_entity, MissingEntityPolicy::Strict);
        assert_eq!(settings.bulk_load_file, Some(PathBuf::from("seed.json")));
        assert_eq!(settings.store_config(), StoreConfig::file("eav.db").strict());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
