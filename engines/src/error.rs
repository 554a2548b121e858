use thiserror::Error;

/// Failures that make the orchestrator step down to its next path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no search providers are active")]
    NoActiveProviders,
    #[error("every sub-query search failed")]
    AllSubQueriesFailed,
}
