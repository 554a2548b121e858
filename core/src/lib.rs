pub mod dataset;
pub mod item;
pub mod narrative;
pub mod persist;
pub mod planner;
pub mod rank;
pub mod tokenizer;

pub use dataset::{Country, Dataset, DatasetError, KeywordEntry};
pub use item::{CountryWithLinks, Engine, ScoredItem, SearchItem};
