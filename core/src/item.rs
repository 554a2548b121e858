use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::Country;

/// Backend a result came from. Ordering doubles as engine preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Google,
    Bing,
    #[serde(rename = "duckduckgo")]
    DuckDuckGo,
    Unknown,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Google => "google",
            Engine::Bing => "bing",
            Engine::DuckDuckGo => "duckduckgo",
            Engine::Unknown => "unknown",
        }
    }

    /// Additive ranking bonus for results from this engine.
    pub fn preference_bonus(&self) -> i64 {
        match self {
            Engine::Google => 5,
            Engine::Bing => 3,
            Engine::DuckDuckGo | Engine::Unknown => 0,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub url: String,
    pub description: String,
    pub engine: Engine,
}

impl SearchItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, description: impl Into<String>, engine: Engine) -> Self {
        Self { title: title.into(), url: url.into(), description: description.into(), engine }
    }

    /// Build an item from optional provider fields, filling the usual placeholders.
    pub fn from_parts(title: Option<String>, url: Option<String>, description: Option<String>, engine: Engine) -> Self {
        Self {
            title: title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Untitled".to_string()),
            url: url.filter(|u| !u.is_empty()).unwrap_or_else(|| "#".to_string()),
            description: description.unwrap_or_default(),
            engine,
        }
    }

    /// Lowercased `title + " " + description`, the text every matcher looks at.
    pub fn combined_lower(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: SearchItem,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryWithLinks {
    #[serde(flatten)]
    pub country: Country,
    pub links: Vec<SearchItem>, // at most 3 from search, static links otherwise
}

impl CountryWithLinks {
    pub fn name(&self) -> &str { &self.country.name }
}
