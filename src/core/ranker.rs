//! Similarity ranker: weighted cosine against the previous pair
//!
//! score = beta * cos(w, human) + gamma * cos(w, bot); a missing previous
//! word contributes nothing. Stable sort keeps bank order on ties.

use crate::core::embedding::cosine;
use crate::core::word_bank::WordBank;
use crate::types::{EngineError, ExclusionSet, ScoredWord, ScoringWeights};

/// Similarity ranker
#[derive(Debug, Default)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    /// Create new ranker
    pub fn new() -> Self {
        Self
    }

    /// Score every non-excluded bank word, best first
    ///
    /// An empty ranking (everything excluded) is a valid result.
    pub fn rank(
        &self,
        bank: &WordBank,
        exclude: &ExclusionSet,
        human: Option<&[f32]>,
        bot: Option<&[f32]>,
        weights: ScoringWeights,
    ) -> Result<Vec<ScoredWord>, EngineError> {
        let matrix = bank.matrix().ok_or(EngineError::NotReady)?;

        let mut scored: Vec<ScoredWord> = bank
            .words()
            .iter()
            .enumerate()
            .filter(|(_, word)| !exclude.contains(word.as_str()))
            .map(|(i, word)| {
                let row = matrix.row(i);
                let mut score = 0.0;
                if let Some(h) = human {
                    score += weights.beta * cosine(row, h);
                }
                if let Some(b) = bot {
                    score += weights.gamma * cosine(row, b);
                }
                ScoredWord {
                    word: word.clone(),
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(scored)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embedding::{Embedding, EmbeddingProvider};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Hand-placed 3d vectors
    struct TableEmbedder(HashMap<&'static str, Embedding>);

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding, EngineError> {
            Ok(self.0.get(text).cloned().unwrap_or_else(|| vec![0.0, 0.0, 1.0]))
        }

        fn model_name(&self) -> &str {
            "table"
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    async fn bank() -> WordBank {
        let table = HashMap::from([
            ("highway", vec![1.0, 1.0, 0.0]),
            ("street", vec![1.0, 0.8, 0.0]),
            ("car", vec![1.0, 0.0, 0.0]),
            ("road", vec![0.0, 1.0, 0.0]),
            ("cloud", vec![0.0, 0.0, 1.0]),
            ("mist", vec![0.0, 0.0, 1.0]),
        ]);
        let bank = WordBank::from_words(
            ["highway", "street", "car", "road", "cloud", "mist"],
            Arc::new(TableEmbedder(table)),
        );
        bank.ensure_loaded().await.unwrap();
        bank
    }

    fn names(ranking: &[ScoredWord]) -> Vec<&str> {
        ranking.iter().map(|s| s.word.as_str()).collect()
    }

    #[tokio::test]
    async fn test_connector_ranks_first() {
        let bank = bank().await;
        let human = bank.embed_one("car").await.unwrap();
        let bot = bank.embed_one("road").await.unwrap();
        let exclude = ExclusionSet::normalize_list(["car", "road"]);

        let ranking = SimilarityRanker::new()
            .rank(&bank, &exclude, Some(&human), Some(&bot), ScoringWeights::default())
            .unwrap();

        assert_eq!(names(&ranking)[0], "highway");
        assert!(!names(&ranking).contains(&"car"));
        assert!(!names(&ranking).contains(&"road"));
    }

    #[tokio::test]
    async fn test_exclusion_moves_to_next_best() {
        let bank = bank().await;
        let human = bank.embed_one("car").await.unwrap();
        let bot = bank.embed_one("road").await.unwrap();
        let exclude = ExclusionSet::normalize_list(["car", "road", "highway"]);

        let ranking = SimilarityRanker::new()
            .rank(&bank, &exclude, Some(&human), Some(&bot), ScoringWeights::default())
            .unwrap();

        assert_eq!(names(&ranking)[0], "street");
    }

    #[tokio::test]
    async fn test_ties_keep_bank_order() {
        let bank = bank().await;
        let exclude = ExclusionSet::new();
        let ranker = SimilarityRanker::new();

        // No vectors: every score is zero, order is bank order
        let ranking = ranker
            .rank(&bank, &exclude, None, None, ScoringWeights::default())
            .unwrap();
        assert_eq!(names(&ranking), vec!["highway", "street", "car", "road", "cloud", "mist"]);

        let again = ranker
            .rank(&bank, &exclude, None, None, ScoringWeights::default())
            .unwrap();
        assert_eq!(ranking, again);
    }

    #[tokio::test]
    async fn test_absent_human_word_contributes_nothing() {
        let bank = bank().await;
        let bot = bank.embed_one("cloud").await.unwrap();
        let exclude = ExclusionSet::normalize_list(["cloud"]);

        let ranking = SimilarityRanker::new()
            .rank(&bank, &exclude, None, Some(&bot), ScoringWeights::default())
            .unwrap();

        assert_eq!(ranking[0].word, "mist");
        assert!((ranking[0].score - 0.5).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_all_excluded_is_empty_not_error() {
        let bank = bank().await;
        let exclude =
            ExclusionSet::normalize_list(["highway", "street", "car", "road", "cloud", "mist"]);
        let ranking = SimilarityRanker::new()
            .rank(&bank, &exclude, None, None, ScoringWeights::default())
            .unwrap();
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_not_ready() {
        let bank = WordBank::from_words(["car"], Arc::new(TableEmbedder(HashMap::new())));
        let result = SimilarityRanker::new().rank(
            &bank,
            &ExclusionSet::new(),
            None,
            None,
            ScoringWeights::default(),
        );
        assert!(matches!(result, Err(EngineError::NotReady)));
    }
}
