//! Core types for Synergy

mod error;
mod reason;
mod scoring;
mod selection;
mod word;

pub use error::EngineError;
pub use reason::SelectionReason;
pub use scoring::{ScoredWord, ScoringWeights};
pub use selection::{SelectionRequest, SelectionResult, Strategy, Tier};
pub use word::{is_no_guess, normalize_previous, ExclusionSet, Word};
