//! Optional JSON configuration with named lookup tables.
//!
//! The configuration carries site-specific dictionaries (province prefixes,
//! MME/AMF address pools, per-version SPU tables). Template descriptors can
//! reference it through `config:<dot.path>` default values.

use crate::error::ResultMessage;
use crate::error::SpuMapperError;
use log::info;
use serde_json::Value as Json;
use std::fs;
use std::path::Path;

/// Loaded configuration. An absent configuration file behaves like `{}`:
/// every lookup resolves to the empty string.
#[derive(Clone, Debug)]
pub struct Config {
    value: Json,
}

impl Default for Config {
    fn default() -> Self {
        Self { value: Json::Null }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SpuMapperError> {
        let content = fs::read_to_string(path)
            .map_err(SpuMapperError::from)
            .with_prefix(&format!("Failed to load config '{}'", path.display()))?;
        let value: Json = serde_json::from_str(&content)
            .map_err(SpuMapperError::from)
            .with_prefix(&format!("Failed to parse config '{}'", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(Self { value })
    }

    pub fn from_value(value: Json) -> Self {
        Self { value }
    }

    /// Walks a dot-separated key path through nested objects.
    pub fn lookup(&self, key_path: &str) -> Option<&Json> {
        let mut value = &self.value;
        for key in key_path.split('.') {
            value = value.as_object()?.get(key)?;
        }
        Some(value)
    }

    /// Dot-path lookup rendered as a string; empty string when the path is
    /// absent or the value is null.
    pub fn lookup_string(&self, key_path: &str) -> String {
        self.lookup(key_path).map(render).unwrap_or_default()
    }

    /// Looks up `key` in the lookup table at `table_path`, rendered as a
    /// string. `None` when the table or the key is absent.
    pub fn table_lookup(&self, table_path: &str, key: &str) -> Option<String> {
        let value = self.lookup(table_path)?.as_object()?.get(key)?;
        Some(render(value))
    }

    /// The address list registered under `name` in the table at `table_path`.
    /// Absent tables and names yield an empty list.
    pub fn pool(&self, table_path: &str, name: &str) -> Vec<String> {
        self.lookup(table_path)
            .and_then(|value| value.as_object()?.get(name)?.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn render(value: &Json) -> String {
    match value {
        Json::String(string) => string.to_owned(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}
