use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::planner::QueryType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub capital: String,
    pub population: String,
    pub gdp: String,
    pub key_sectors: Vec<String>,
    pub positive_affirmation: String,
    pub flag: String,
}

/// Topic keyword and the countries it points at, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub countries: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("duplicate country name: {0}")]
    DuplicateCountry(String),
    #[error("keyword '{keyword}' references unknown country '{country}'")]
    UnknownCountry { keyword: String, country: String },
}

/// Immutable reference table of countries plus the keyword index over it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    countries: Vec<Country>,
    keywords: Vec<KeywordEntry>,
}

const TOP_GENERAL: [&str; 5] = ["Nigeria", "South Africa", "Kenya", "Egypt", "Ghana"];

impl Dataset {
    pub fn new(countries: Vec<Country>, keywords: Vec<KeywordEntry>) -> Result<Self, DatasetError> {
        let mut names = HashSet::new();
        for c in &countries {
            if !names.insert(c.name.as_str()) {
                return Err(DatasetError::DuplicateCountry(c.name.clone()));
            }
        }
        let mut normalized = Vec::with_capacity(keywords.len());
        for entry in keywords {
            if let Some(missing) = entry.countries.iter().find(|n| !names.contains(n.as_str())) {
                return Err(DatasetError::UnknownCountry { keyword: entry.keyword, country: missing.clone() });
            }
            normalized.push(KeywordEntry { keyword: entry.keyword.to_lowercase(), countries: entry.countries });
        }
        Ok(Self { countries, keywords: normalized })
    }

    pub fn countries(&self) -> &[Country] { &self.countries }

    pub fn keywords(&self) -> &[KeywordEntry] { &self.keywords }

    pub fn country(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name == name)
    }

    /// Countries whose names appear in `names`, in table order.
    pub fn select(&self, names: &[&str]) -> Vec<Country> {
        self.countries.iter().filter(|c| names.contains(&c.name.as_str())).cloned().collect()
    }

    pub fn top_general(&self) -> Vec<Country> {
        self.select(&TOP_GENERAL)
    }

    /// Fixed top-5 list used when a query names no country or keyword.
    pub fn top_for(&self, query_type: QueryType) -> Vec<Country> {
        let names: [&str; 5] = match query_type {
            QueryType::Business => ["Nigeria", "South Africa", "Kenya", "Ghana", "Egypt"],
            QueryType::Technology => ["Nigeria", "Kenya", "South Africa", "Rwanda", "Ghana"],
            QueryType::Agriculture => ["Ghana", "Ivory Coast", "Ethiopia", "Tanzania", "Nigeria"],
            QueryType::Energy => ["Nigeria", "Egypt", "Algeria", "Angola", "Morocco"],
            QueryType::Infrastructure => ["Ethiopia", "Rwanda", "Kenya", "Nigeria", "Ghana"],
            QueryType::General => TOP_GENERAL,
        };
        self.select(&names)
    }

    /// The table shipped with the binary.
    pub fn builtin() -> Self {
        let countries = vec![
            country("Nigeria", "Abuja", "218 million", "$1.1 trillion (PPP)",
                &["Technology", "Energy", "Agriculture", "Creative Industries"],
                "Africa's largest economy and tech hub, driving innovation across the continent with a vibrant youth population and entrepreneurial spirit.",
                "🇳🇬"),
            country("South Africa", "Pretoria", "60 million", "$861 billion (PPP)",
                &["Mining", "Finance", "Manufacturing", "Tourism"],
                "A diversified economy and financial powerhouse, leading in infrastructure development and renewable energy initiatives.",
                "🇿🇦"),
            country("Kenya", "Nairobi", "55 million", "$338 billion (PPP)",
                &["Technology", "Agriculture", "Tourism", "Finance"],
                "The Silicon Savannah of Africa, pioneering mobile technology and innovation with a thriving startup ecosystem.",
                "🇰🇪"),
            country("Egypt", "Cairo", "109 million", "$1.4 trillion (PPP)",
                &["Tourism", "Manufacturing", "ICT", "Energy"],
                "A bridge between continents with ancient wisdom and modern ambition, leading in renewable energy and digital transformation.",
                "🇪🇬"),
            country("Ghana", "Accra", "32 million", "$227 billion (PPP)",
                &["Gold", "Cocoa", "Oil & Gas", "Services"],
                "A beacon of stability and democracy in West Africa, with rapid economic growth and innovation in fintech.",
                "🇬🇭"),
            country("Ethiopia", "Addis Ababa", "123 million", "$336 billion (PPP)",
                &["Agriculture", "Manufacturing", "Infrastructure", "Airlines"],
                "The African lion awakening with massive infrastructure development and becoming a manufacturing hub for East Africa.",
                "🇪🇹"),
            country("Rwanda", "Kigali", "13.5 million", "$112 billion (PPP)",
                &["Technology", "Tourism", "Services", "Manufacturing"],
                "The Singapore of Africa, showcasing remarkable transformation with world-class governance and tech innovation.",
                "🇷🇼"),
            country("Morocco", "Rabat", "37 million", "$333 billion (PPP)",
                &["Agriculture", "Automotive", "Renewable Energy", "Tourism"],
                "A gateway to Africa with advanced infrastructure and leadership in renewable energy and automotive manufacturing.",
                "🇲🇦"),
            country("Tanzania", "Dodoma", "63 million", "$193 billion (PPP)",
                &["Mining", "Tourism", "Agriculture", "Natural Gas"],
                "Rich in natural resources and cultural heritage, emerging as an economic powerhouse in East Africa.",
                "🇹🇿"),
            country("Ivory Coast", "Yamoussoukro", "27 million", "$173 billion (PPP)",
                &["Cocoa", "Agriculture", "Services", "Infrastructure"],
                "West Africa's rising star with robust economic growth and leadership in agricultural innovation.",
                "🇨🇮"),
            country("Algeria", "Algiers", "45 million", "$629 billion (PPP)",
                &["Energy", "Natural Gas", "Agriculture", "Manufacturing"],
                "Africa's largest country by area and an energy giant, investing boldly in solar power and industrial diversification.",
                "🇩🇿"),
            country("Angola", "Luanda", "36 million", "$250 billion (PPP)",
                &["Oil & Gas", "Mining", "Agriculture", "Infrastructure"],
                "A resource-rich economy on the move, channelling energy wealth into new infrastructure and agricultural growth.",
                "🇦🇴"),
            country("Democratic Republic of the Congo", "Kinshasa", "102 million", "$150 billion (PPP)",
                &["Mining", "Hydropower", "Agriculture", "Forestry"],
                "Home to vast mineral wealth and hydropower potential, powering the global transition to clean technology.",
                "🇨🇩"),
            country("Uganda", "Kampala", "47 million", "$140 billion (PPP)",
                &["Agriculture", "Education", "Tourism", "Energy"],
                "The Pearl of Africa, combining a youthful, educated workforce with fertile land and a fast-growing services sector.",
                "🇺🇬"),
        ];
        let keywords = vec![
            keyword("technology", &["Nigeria", "Kenya", "Rwanda", "South Africa", "Egypt"]),
            keyword("agriculture", &["Ghana", "Ivory Coast", "Ethiopia", "Tanzania", "Nigeria"]),
            keyword("mining", &["South Africa", "Tanzania", "Ghana", "Democratic Republic of the Congo"]),
            keyword("tourism", &["Egypt", "South Africa", "Kenya", "Tanzania", "Morocco"]),
            keyword("energy", &["Nigeria", "Egypt", "Algeria", "Morocco", "Angola"]),
            keyword("finance", &["South Africa", "Nigeria", "Kenya", "Ghana"]),
            keyword("manufacturing", &["Egypt", "South Africa", "Morocco", "Ethiopia"]),
            keyword("infrastructure", &["Ethiopia", "Rwanda", "Kenya", "Nigeria"]),
            keyword("renewable energy", &["Morocco", "Egypt", "South Africa", "Kenya"]),
            keyword("fintech", &["Nigeria", "Kenya", "South Africa", "Ghana"]),
            keyword("creative industries", &["Nigeria", "South Africa", "Kenya", "Ghana"]),
            keyword("healthcare", &["South Africa", "Kenya", "Nigeria", "Ghana"]),
            keyword("education", &["South Africa", "Kenya", "Ghana", "Uganda"]),
            keyword("startups", &["Nigeria", "Kenya", "South Africa", "Egypt", "Rwanda"]),
        ];
        Self { countries, keywords }
    }
}

fn country(name: &str, capital: &str, population: &str, gdp: &str, sectors: &[&str], affirmation: &str, flag: &str) -> Country {
    Country {
        name: name.to_string(),
        capital: capital.to_string(),
        population: population.to_string(),
        gdp: gdp.to_string(),
        key_sectors: sectors.iter().map(|s| s.to_string()).collect(),
        positive_affirmation: affirmation.to_string(),
        flag: flag.to_string(),
    }
}

fn keyword(keyword: &str, countries: &[&str]) -> KeywordEntry {
    KeywordEntry { keyword: keyword.to_string(), countries: countries.iter().map(|s| s.to_string()).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_passes_validation() {
        let builtin = Dataset::builtin();
        let rebuilt = Dataset::new(builtin.countries().to_vec(), builtin.keywords().to_vec()).unwrap();
        assert_eq!(rebuilt, builtin);
    }

    #[test]
    fn rejects_dangling_keyword_reference() {
        let builtin = Dataset::builtin();
        let err = Dataset::new(builtin.countries().to_vec(), vec![keyword("mining", &["DRC"])]).unwrap_err();
        assert_eq!(err, DatasetError::UnknownCountry { keyword: "mining".into(), country: "DRC".into() });
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut countries = Dataset::builtin().countries().to_vec();
        countries.push(countries[0].clone());
        let err = Dataset::new(countries, vec![]).unwrap_err();
        assert_eq!(err, DatasetError::DuplicateCountry("Nigeria".into()));
    }

    #[test]
    fn top_lists_follow_table_order() {
        let ds = Dataset::builtin();
        let names: Vec<String> = ds.top_for(QueryType::Energy).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Nigeria", "Egypt", "Morocco", "Algeria", "Angola"]);
        let general: Vec<String> = ds.top_general().into_iter().map(|c| c.name).collect();
        assert_eq!(general, vec!["Nigeria", "South Africa", "Kenya", "Egypt", "Ghana"]);
    }
}
