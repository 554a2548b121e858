use crate::dataset::{Country, Dataset, KeywordEntry};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

/// On-disk shape of a reference dataset.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetFile {
    pub countries: Vec<Country>,
    pub keywords: Vec<KeywordEntry>,
}

pub fn save_dataset<P: AsRef<Path>>(path: P, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(dataset)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Load and validate a dataset; dangling keyword references are rejected.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut f = File::open(path.as_ref())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let file: DatasetFile = serde_json::from_str(&buf)?;
    let dataset = Dataset::new(file.countries, file.keywords)?;
    tracing::info!(countries = dataset.countries().len(), keywords = dataset.keywords().len(), "loaded dataset");
    Ok(dataset)
}
