//! Word bank with lazily computed embeddings
//!
//! Publish order: catalogue → embedding matrix → `ready` flag (Release).
//! Readers check `is_ready()` (Acquire) before touching the matrix; the
//! catalogue alone is readable as soon as it is loaded.

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::embedding::{normalize, Embedding, EmbeddingProvider};
use crate::core::sanitizer::sanitize_strict;
use crate::types::{EngineError, Word};
use crate::{EMBED_BATCH_SIZE, EMBED_CONCURRENCY};

const PROVIDER: &str = "embedding";

/// Catalogue written to the backing store when none exists
pub const DEFAULT_CATALOGUE: &[&str] = &[
    // neutral seeds
    "bridge", "link", "common", "middle", "center", "focus", "union", "merge",
    "pair", "match", "signal", "theme", "point", "route", "path",
    // travel
    "car", "road", "highway", "street", "traffic", "journey", "travel", "map",
    "train", "station", "airport", "plane", "ticket", "wheel", "engine", "driver",
    "bicycle", "boat", "harbor", "tunnel",
    // nature
    "tree", "forest", "river", "ocean", "mountain", "valley", "desert", "island",
    "flower", "garden", "leaf", "root", "seed", "stone", "sand", "wave",
    "cloud", "rain", "storm", "thunder", "snow", "ice", "wind", "sun", "moon",
    "star", "sky", "earth", "fire", "water",
    // home
    "house", "home", "door", "window", "roof", "wall", "kitchen", "table",
    "chair", "bed", "lamp", "light", "key", "lock", "clock", "mirror",
    // food
    "bread", "butter", "cheese", "apple", "orange", "banana", "coffee", "tea",
    "milk", "sugar", "salt", "pepper", "soup", "cake", "honey", "feast",
    // people and feelings
    "family", "friend", "child", "parent", "teacher", "doctor", "artist", "king",
    "queen", "love", "fear", "hope", "dream", "memory", "anger", "joy",
    "trust", "peace", "war", "heart",
    // work and things
    "money", "bank", "market", "trade", "office", "paper", "book", "letter",
    "story", "song", "music", "dance", "movie", "camera", "phone", "computer",
    "screen", "network", "code", "machine", "tool", "hammer", "nail", "rope",
    "chain", "glass", "metal", "gold", "silver", "iron", "coin",
    // abstract
    "time", "space", "energy", "power", "speed", "balance", "change", "growth",
    "future", "past", "history", "science", "nature", "culture", "language", "idea",
    "question", "answer", "secret", "mystery", "game", "team", "goal", "victory",
    "winter", "summer", "spring", "autumn", "night", "morning", "shadow", "color",
    "sound", "silence", "voice", "word",
];

/// Where the catalogue comes from
#[derive(Debug, Clone)]
pub enum BankSource {
    /// Newline-delimited file, created from `DEFAULT_CATALOGUE` if absent
    File(PathBuf),
    /// In-memory list
    Inline(Vec<String>),
}

/// Row-major matrix of unit-normalized embeddings, one row per bank word
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    dimension: usize,
    rows: Vec<f32>,
}

impl EmbeddingMatrix {
    fn from_rows(dimension: usize, vectors: Vec<Embedding>) -> Result<Self, EngineError> {
        let mut rows = Vec::with_capacity(dimension * vectors.len());
        for mut vector in vectors {
            if vector.len() != dimension {
                return Err(EngineError::provider(
                    PROVIDER,
                    format!("expected dimension {}, got {}", dimension, vector.len()),
                ));
            }
            normalize(&mut vector);
            rows.extend_from_slice(&vector);
        }
        Ok(Self { dimension, rows })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.rows.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.rows[start..start + self.dimension]
    }
}

#[derive(Debug)]
struct Catalogue {
    words: Vec<Word>,
    positions: HashMap<String, usize>,
}

impl Catalogue {
    fn new(words: Vec<Word>) -> Self {
        let positions = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str().to_string(), i))
            .collect();
        Self { words, positions }
    }
}

/// Ordered, deduplicated candidate words plus their embeddings
pub struct WordBank {
    source: BankSource,
    embedder: Arc<dyn EmbeddingProvider>,
    catalogue: OnceLock<Catalogue>,
    matrix: OnceLock<EmbeddingMatrix>,
    ready: AtomicBool,
    load_guard: Mutex<()>,
    loaded_at: OnceLock<DateTime<Utc>>,
}

impl WordBank {
    /// Create an unloaded bank
    pub fn new(source: BankSource, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            source,
            embedder,
            catalogue: OnceLock::new(),
            matrix: OnceLock::new(),
            ready: AtomicBool::new(false),
            load_guard: Mutex::new(()),
            loaded_at: OnceLock::new(),
        }
    }

    /// Bank backed by a file
    pub fn from_file(path: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(BankSource::File(path.into()), embedder)
    }

    /// Bank backed by an in-memory list
    pub fn from_words<I, S>(words: I, embedder: Arc<dyn EmbeddingProvider>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            BankSource::Inline(words.into_iter().map(Into::into).collect()),
            embedder,
        )
    }

    /// Start `ensure_loaded` on a background task
    pub fn spawn_loader(self: &Arc<Self>) -> JoinHandle<()> {
        let bank = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = bank.ensure_loaded().await {
                error!(error = %e, "word bank load failed");
            }
        })
    }

    /// Load catalogue and embeddings; no-op once ready
    ///
    /// Concurrent callers wait for the one in flight. A failed load leaves
    /// the bank not ready and can be retried.
    pub async fn ensure_loaded(&self) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }
        let _guard = self.load_guard.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        let catalogue = match self.catalogue.get() {
            Some(catalogue) => catalogue,
            None => {
                let words = self.read_source().await?;
                info!(words = words.len(), "word bank catalogue loaded");
                self.catalogue.get_or_init(|| Catalogue::new(words))
            }
        };

        let matrix = self.compute_matrix(&catalogue.words).await?;
        debug!(rows = matrix.len(), dimension = matrix.dimension(), "embedding matrix computed");
        if matrix.is_empty() {
            warn!("word bank has no words; similarity tier will never answer");
        }

        // Matrix before flag: a reader seeing `ready` sees the full matrix.
        let _ = self.matrix.set(matrix);
        let _ = self.loaded_at.set(Utc::now());
        self.ready.store(true, Ordering::Release);

        info!(
            words = catalogue.words.len(),
            model = self.embedder.model_name(),
            "word bank ready"
        );
        Ok(())
    }

    async fn read_source(&self) -> Result<Vec<Word>, EngineError> {
        let lines: Vec<String> = match &self.source {
            BankSource::Inline(words) => words.clone(),
            BankSource::File(path) => read_or_bootstrap(path)
                .await?
                .lines()
                .map(str::to_string)
                .collect(),
        };
        Ok(dedupe_words(lines.iter().map(String::as_str)))
    }

    async fn compute_matrix(&self, words: &[Word]) -> Result<EmbeddingMatrix, EngineError> {
        let chunks: Vec<Vec<String>> = words
            .chunks(EMBED_BATCH_SIZE)
            .map(|chunk| chunk.iter().map(|w| w.as_str().to_string()).collect())
            .collect();

        let embedder = Arc::clone(&self.embedder);
        let batches: Vec<Vec<Embedding>> = stream::iter(chunks)
            .map(move |chunk| {
                let embedder = Arc::clone(&embedder);
                async move { embedder.embed_batch(&chunk).await }
            })
            .buffered(EMBED_CONCURRENCY)
            .try_collect()
            .await?;

        let vectors: Vec<Embedding> = batches.into_iter().flatten().collect();
        if vectors.len() != words.len() {
            return Err(EngineError::provider(
                PROVIDER,
                format!("expected {} embeddings, got {}", words.len(), vectors.len()),
            ));
        }
        let dimension = vectors
            .first()
            .map(Vec::len)
            .unwrap_or_else(|| self.embedder.dimension());
        EmbeddingMatrix::from_rows(dimension, vectors)
    }

    /// Lock-free readiness check
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Loaded words (empty until the catalogue is read)
    pub fn words(&self) -> &[Word] {
        self.catalogue
            .get()
            .map(|c| c.words.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.words().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words().is_empty()
    }

    /// Bank position of a word, if present
    pub fn position(&self, word: &str) -> Option<usize> {
        self.catalogue
            .get()?
            .positions
            .get(&word.trim().to_lowercase())
            .copied()
    }

    /// Embedding matrix, only once ready
    pub fn matrix(&self) -> Option<&EmbeddingMatrix> {
        if self.is_ready() {
            self.matrix.get()
        } else {
            None
        }
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at.get().copied()
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Unit-normalized embedding of arbitrary text
    ///
    /// Bank words reuse their precomputed row.
    pub async fn embed_one(&self, text: &str) -> Result<Embedding, EngineError> {
        let matrix = self
            .matrix()
            .ok_or_else(|| EngineError::unavailable(PROVIDER, "word bank still loading"))?;

        if let Some(index) = self.position(text) {
            return Ok(matrix.row(index).to_vec());
        }

        let mut vector = self
            .embedder
            .embed(text.trim())
            .await
            .map_err(|e| match e {
                EngineError::ProviderUnavailable { .. } | EngineError::ProviderError { .. } => e,
                other => EngineError::provider(PROVIDER, other.to_string()),
            })?;
        if vector.len() != matrix.dimension() {
            return Err(EngineError::provider(
                PROVIDER,
                format!("expected dimension {}, got {}", matrix.dimension(), vector.len()),
            ));
        }
        normalize(&mut vector);
        Ok(vector)
    }
}

/// Strict-sanitize and dedupe, keeping first-seen order
fn dedupe_words<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<Word> {
    let mut seen = std::collections::HashSet::new();
    lines
        .filter_map(sanitize_strict)
        .filter(|w| seen.insert(w.as_str().to_string()))
        .collect()
}

/// Read the store, writing the default catalogue first if it does not exist
async fn read_or_bootstrap(path: &Path) -> Result<String, EngineError> {
    if !tokio::fs::try_exists(path).await? {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut contents = DEFAULT_CATALOGUE.join("\n");
        contents.push('\n');
        tokio::fs::write(path, contents).await?;
        info!(path = %path.display(), words = DEFAULT_CATALOGUE.len(), "wrote default word bank");
    }
    Ok(tokio::fs::read_to_string(path).await?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embedding::HashingEmbedder;

    fn embedder() -> Arc<dyn EmbeddingProvider> {
        Arc::new(HashingEmbedder::default())
    }

    #[tokio::test]
    async fn test_inline_bank_dedupes_and_sanitizes() {
        let bank = WordBank::from_words(["Car", "car", "road!", "x", "two words"], embedder());
        bank.ensure_loaded().await.unwrap();
        let words: Vec<&str> = bank.words().iter().map(Word::as_str).collect();
        assert_eq!(words, vec!["car", "road", "two"]);
    }

    #[tokio::test]
    async fn test_not_ready_before_load() {
        let bank = WordBank::from_words(["car"], embedder());
        assert!(!bank.is_ready());
        assert!(bank.words().is_empty());
        assert!(bank.matrix().is_none());
        let err = bank.embed_one("car").await.unwrap_err();
        assert!(matches!(err, EngineError::ProviderUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_ensure_loaded_is_idempotent() {
        let bank = WordBank::from_words(["car", "road"], embedder());
        bank.ensure_loaded().await.unwrap();
        let first = bank.loaded_at();
        bank.ensure_loaded().await.unwrap();
        assert_eq!(bank.loaded_at(), first);
        assert_eq!(bank.matrix().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bootstraps_default_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bank.txt");
        let bank = WordBank::from_file(&path, embedder());
        bank.ensure_loaded().await.unwrap();

        assert!(path.exists());
        assert!(bank.position("highway").is_some());
        assert!(bank.position("bridge").is_some());
        assert_eq!(bank.len(), DEFAULT_CATALOGUE.len());
    }

    #[tokio::test]
    async fn test_existing_store_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.txt");
        std::fs::write(&path, "apple\n\nPear\napple\n").unwrap();
        let bank = WordBank::from_file(&path, embedder());
        bank.ensure_loaded().await.unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "apple\n\nPear\napple\n");
    }

    #[tokio::test]
    async fn test_embed_one_reuses_bank_row() {
        let bank = WordBank::from_words(["car", "road"], embedder());
        bank.ensure_loaded().await.unwrap();
        let row = bank.embed_one("Car").await.unwrap();
        assert_eq!(row.as_slice(), bank.matrix().unwrap().row(0));
        let other = bank.embed_one("meadow").await.unwrap();
        assert_eq!(other.len(), bank.matrix().unwrap().dimension());
    }

    #[tokio::test]
    async fn test_spawned_load_spans_several_batches() {
        let letters: Vec<char> = ('a'..='z').collect();
        let words: Vec<String> = (0..EMBED_BATCH_SIZE * 3)
            .map(|i| {
                let (a, b, c) = (letters[i / 676 % 26], letters[i / 26 % 26], letters[i % 26]);
                format!("w{}{}{}", a, b, c)
            })
            .collect();
        let hashing = HashingEmbedder::default();
        let bank = Arc::new(WordBank::from_words(words.clone(), embedder()));

        bank.spawn_loader().await.unwrap();

        assert!(bank.is_ready());
        let matrix = bank.matrix().unwrap();
        assert_eq!(matrix.len(), words.len());
        for i in [0, EMBED_BATCH_SIZE, words.len() - 1] {
            let expected = hashing.embed_text(&words[i]);
            let drift: f32 = matrix.row(i).iter().zip(&expected).map(|(a, b)| (a - b).abs()).sum();
            assert!(drift < 1e-4, "row {} out of order", i);
        }
    }

    #[tokio::test]
    async fn test_spawn_loader_publishes_ready() {
        let bank = Arc::new(WordBank::from_words(["car"], embedder()));
        bank.spawn_loader().await.unwrap();
        assert!(bank.is_ready());
    }
}
