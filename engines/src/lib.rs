//! Networked half of the pipeline: settings, search backends, fan-out and the response fallback chain.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod settings;
pub mod thinking;

pub use aggregator::{Aggregated, Aggregator};
pub use config::{ConfigSource, LayeredConfig, Overrides, Settings, StaticConfig};
pub use error::PipelineError;
pub use orchestrator::{Orchestrator, Response, ResponsePath};
pub use providers::{ActiveProviders, CallErrorKind, HttpRegistry, ProviderError, ProviderRegistry, SearchProvider, StaticRegistry};
pub use settings::SettingsStore;
pub use thinking::{DeepThinker, ReasoningStep, Thinking};
