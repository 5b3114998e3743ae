//! Selection requests, results and the tier vocabulary

use serde::Serialize;

use crate::types::{EngineError, ExclusionSet, ScoredWord, ScoringWeights, SelectionReason, Word};
use crate::{DEFAULT_TOP_K, MAX_TOP_K};

/// Which tier the deployment tries first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Generative model, then similarity, then seed
    Generative,
    /// Similarity, then seed
    Similarity,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Generative => "generative",
            Strategy::Similarity => "similarity",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generative" => Ok(Strategy::Generative),
            "similarity" => Ok(Strategy::Similarity),
            other => Err(EngineError::Validation(format!("unknown strategy '{}'", other))),
        }
    }
}

/// Tier that produced a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Generative,
    Similarity,
    Seed,
    None,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Generative => "generative",
            Tier::Similarity => "similarity",
            Tier::Seed => "seed",
            Tier::None => "none",
        }
    }
}

/// A validated selection request
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub prev_human: Option<String>,
    pub prev_bot: Option<String>,
    pub exclude: ExclusionSet,
    pub top_k: usize,
    pub weights: ScoringWeights,
}

impl SelectionRequest {
    /// Validate raw caller values
    pub fn new(
        prev_human: Option<String>,
        prev_bot: Option<String>,
        exclude: &[String],
        top_k: Option<usize>,
        beta: Option<f32>,
        gamma: Option<f32>,
    ) -> Result<Self, EngineError> {
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(EngineError::Validation(format!(
                "top_k must be within [1, {}], got {}",
                MAX_TOP_K, top_k
            )));
        }

        Ok(Self {
            prev_human,
            prev_bot,
            exclude: ExclusionSet::normalize_list(exclude),
            top_k,
            weights: ScoringWeights::from_request(beta, gamma)?,
        })
    }

    /// First-round request with defaults
    pub fn first_round(exclude: &[String]) -> Self {
        Self {
            prev_human: None,
            prev_bot: None,
            exclude: ExclusionSet::normalize_list(exclude),
            top_k: DEFAULT_TOP_K,
            weights: ScoringWeights::default(),
        }
    }

    /// Request for a previous pair with default weights
    pub fn for_pair(prev_human: &str, prev_bot: &str, exclude: &[String]) -> Self {
        Self {
            prev_human: Some(prev_human.to_string()),
            prev_bot: Some(prev_bot.to_string()),
            ..Self::first_round(exclude)
        }
    }
}

/// Outcome of one selection
#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub choice: Option<Word>,
    /// Top-K ranking, only filled when the similarity tier chose
    pub scores: Vec<ScoredWord>,
    pub tier: Tier,
    pub reason: SelectionReason,
}

impl SelectionResult {
    pub fn chosen(word: Word, tier: Tier, reason: SelectionReason) -> Self {
        Self {
            choice: Some(word),
            scores: Vec::new(),
            tier,
            reason,
        }
    }

    pub fn ranked(word: Word, scores: Vec<ScoredWord>) -> Self {
        Self {
            choice: Some(word),
            scores,
            tier: Tier::Similarity,
            reason: SelectionReason::S003_RANKED,
        }
    }

    pub fn exhausted() -> Self {
        Self {
            choice: None,
            scores: Vec::new(),
            tier: Tier::None,
            reason: SelectionReason::S006_EXHAUSTED,
        }
    }

    /// Format for parseable output
    pub fn to_parseable_string(&self) -> String {
        format!(
            "choice={} | tier={} | reason={}",
            self.choice.as_ref().map(Word::as_str).unwrap_or("null"),
            self.tier.as_str(),
            self.reason.code()
        )
    }
}
