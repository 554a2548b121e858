//! Persisted local credentials, the lowest non-default layer of [`crate::config`].

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

const CREDENTIAL_KEYS: [&str; 3] = ["google_api_key", "google_search_engine_id", "bing_api_key"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search_engine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bing_api_key: Option<String>,
}

pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// A missing file reads as empty settings.
    pub fn load(&self) -> Result<PersistedSettings> {
        if !self.path.exists() {
            return Ok(PersistedSettings::default());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&text)?)
    }

    fn read_table(&self) -> Result<Table> {
        if !self.path.exists() {
            return Ok(Table::new());
        }
        Ok(fs::read_to_string(&self.path)?.parse::<Table>()?)
    }

    /// Edits the file as a raw table so keys owned by other layers survive.
    fn update(&self, f: impl FnOnce(&mut Table)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut table = self.read_table()?;
        f(&mut table);
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.path, toml::to_string_pretty(&table)?)?;
        tracing::info!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    pub fn set_google_credentials(&self, api_key: &str, search_engine_id: &str) -> Result<()> {
        self.update(|t| {
            t.insert("google_api_key".into(), Value::String(api_key.to_string()));
            t.insert("google_search_engine_id".into(), Value::String(search_engine_id.to_string()));
        })
    }

    pub fn set_bing_api_key(&self, api_key: &str) -> Result<()> {
        self.update(|t| {
            t.insert("bing_api_key".into(), Value::String(api_key.to_string()));
        })
    }

    /// Removes the credential keys only.
    pub fn clear_credentials(&self) -> Result<()> {
        self.update(|t| {
            for key in CREDENTIAL_KEYS {
                t.remove(key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, LayeredConfig};
    use tempfile::tempdir;

    #[test]
    fn saved_credentials_feed_layered_config() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested/settings.toml"));
        assert_eq!(store.load().unwrap(), PersistedSettings::default());

        store.set_google_credentials("gkey", "cx-1").unwrap();
        store.set_bing_api_key("bkey").unwrap();
        let config = LayeredConfig::new().with_settings_file(store.path()).with_env_prefix("AFRI_STORE_TEST_");
        let s = config.resolve();
        assert_eq!(s.google_credentials(), Some(("gkey", "cx-1")));
        assert_eq!(s.bing_api_key(), Some("bkey"));

        store.clear_credentials().unwrap();
        let s = config.resolve();
        assert!(s.google_credentials().is_none());
        assert!(s.bing_api_key().is_none());
    }

    #[test]
    fn credential_writes_keep_other_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "timeout_secs = 3\nduckduckgo_enabled = false\n").unwrap();
        let store = SettingsStore::new(&path);
        let config = LayeredConfig::new().with_settings_file(&path).with_env_prefix("AFRI_STORE_KEEP_TEST_");

        store.set_bing_api_key("b").unwrap();
        let s = config.resolve();
        assert_eq!(s.bing_api_key(), Some("b"));
        assert_eq!(s.timeout_secs, 3);
        assert!(!s.duckduckgo_enabled);

        store.clear_credentials().unwrap();
        let s = config.resolve();
        assert!(s.bing_api_key().is_none());
        assert_eq!(s.timeout_secs, 3);
        assert!(!s.duckduckgo_enabled);
    }
}
