//! Engine error taxonomy

/// Everything that can go wrong below the orchestrator
///
/// Only `Validation` reaches HTTP callers as an error and only
/// `ExhaustedVocabulary` reaches them as a null choice; the rest are
/// absorbed into a fallback tier.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed caller input, rejected before the pipeline runs
    #[error("invalid request: {0}")]
    Validation(String),

    /// Backend not configured or not loaded yet
    #[error("{provider} provider unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// Backend reachable but the call failed
    #[error("{provider} provider error: {reason}")]
    ProviderError {
        provider: &'static str,
        reason: String,
    },

    /// Word bank embeddings are still loading
    #[error("word bank embeddings not ready")]
    NotReady,

    /// Every known word is excluded at every tier
    #[error("every known word is excluded")]
    ExhaustedVocabulary,

    /// Backing store I/O
    #[error("word bank store: {0}")]
    Store(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub(crate) fn provider(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderError {
            provider,
            reason: reason.into(),
        }
    }
}
