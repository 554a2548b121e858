//! Layered settings resolution.
//!
//! Precedence, lowest to highest: built-in defaults, the persisted settings
//! TOML file, `AFRISEARCH_*` environment variables, explicit overrides.
//! Settings are re-resolved on every search so credential changes take
//! effect without a restart.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENV_PREFIX: &str = "AFRISEARCH_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub bing_api_key: Option<String>,
    pub duckduckgo_enabled: bool,
    pub google_endpoint: String,
    pub bing_endpoint: String,
    pub duckduckgo_endpoint: String,
    pub timeout_secs: u64,
    pub results_per_provider: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_search_engine_id: None,
            bing_api_key: None,
            duckduckgo_enabled: true,
            google_endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            bing_endpoint: "https://api.bing.microsoft.com/v7.0/search".to_string(),
            duckduckgo_endpoint: "https://api.duckduckgo.com/".to_string(),
            timeout_secs: 10,
            results_per_provider: 10,
        }
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Settings {
    /// API key and search engine id, only when both are present.
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.google_api_key)?, non_empty(&self.google_search_engine_id)?))
    }

    pub fn bing_api_key(&self) -> Option<&str> {
        non_empty(&self.bing_api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

pub trait ConfigSource: Send + Sync {
    fn resolve(&self) -> Settings;
}

/// Fixed settings, for tests and embedding.
pub struct StaticConfig(pub Settings);

impl ConfigSource for StaticConfig {
    fn resolve(&self) -> Settings { self.0.clone() }
}

/// Values set in code. `None` fields leave lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search_engine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bing_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duckduckgo_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bing_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duckduckgo_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_per_provider: Option<u32>,
}

pub struct LayeredConfig {
    settings_path: Option<PathBuf>,
    env_prefix: String,
    overrides: Overrides,
}

impl Default for LayeredConfig {
    fn default() -> Self { Self::new() }
}

impl LayeredConfig {
    pub fn new() -> Self {
        Self { settings_path: None, env_prefix: DEFAULT_ENV_PREFIX.to_string(), overrides: Overrides::default() }
    }

    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn settings_path(&self) -> Option<&PathBuf> { self.settings_path.as_ref() }

    pub fn figment(&self) -> Figment {
        self.layers(true)
    }

    fn layers(&self, with_file: bool) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let (true, Some(path)) = (with_file, &self.settings_path) {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(&self.env_prefix))
            .merge(Serialized::defaults(&self.overrides))
    }
}

impl ConfigSource for LayeredConfig {
    /// Never fails. A malformed settings file is skipped so env and explicit
    /// values still apply; defaults are used only when those are broken too.
    fn resolve(&self) -> Settings {
        let err = match self.figment().extract::<Settings>() {
            Ok(settings) => return settings,
            Err(e) => e,
        };
        if self.settings_path.is_some() {
            tracing::warn!(error = %err, "invalid settings file, ignoring it");
            match self.layers(false).extract::<Settings>() {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!(error = %e, "invalid settings, using defaults"),
            }
        } else {
            tracing::warn!(error = %err, "invalid settings, using defaults");
        }
        Settings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_credentials_count_as_absent() {
        let s = Settings { google_api_key: Some("k".into()), google_search_engine_id: Some("  ".into()), ..Settings::default() };
        assert!(s.google_credentials().is_none());
        assert!(s.bing_api_key().is_none());
    }

    #[test]
    fn explicit_beats_env_beats_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "bing_api_key = \"from-file\"\ngoogle_api_key = \"file-google\"\ntimeout_secs = 4\n").unwrap();
        std::env::set_var("AFRI_LAYER_TEST_GOOGLE_API_KEY", "env-google");
        std::env::set_var("AFRI_LAYER_TEST_BING_API_KEY", "env-bing");

        let config = LayeredConfig::new()
            .with_settings_file(&path)
            .with_env_prefix("AFRI_LAYER_TEST_")
            .with_overrides(Overrides { bing_api_key: Some("explicit".into()), ..Overrides::default() });
        let s = config.resolve();
        assert_eq!(s.bing_api_key(), Some("explicit"));
        assert_eq!(s.google_api_key.as_deref(), Some("env-google"));
        assert_eq!(s.timeout_secs, 4);
        assert!(s.duckduckgo_enabled);
    }

    #[test]
    fn malformed_file_is_skipped_but_overrides_survive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();
        let overrides = Overrides { bing_api_key: Some("explicit".into()), duckduckgo_enabled: Some(false), ..Overrides::default() };
        let s = LayeredConfig::new()
            .with_settings_file(&path)
            .with_env_prefix("AFRI_BROKEN_TEST_")
            .with_overrides(overrides)
            .resolve();
        assert_eq!(s.bing_api_key(), Some("explicit"));
        assert!(!s.duckduckgo_enabled);
        assert_eq!(s.timeout_secs, Settings::default().timeout_secs);
    }

    #[test]
    fn malformed_env_falls_back_to_defaults() {
        std::env::set_var("AFRI_BAD_ENV_TEST_TIMEOUT_SECS", "soon");
        let s = LayeredConfig::new().with_env_prefix("AFRI_BAD_ENV_TEST_").resolve();
        assert_eq!(s, Settings::default());
    }
}
