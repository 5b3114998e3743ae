//! Embedding providers
//!
//! The engine only sees `EmbeddingProvider`. Two implementations ship:
//! a local character-trigram hashing embedder (default, no network) and
//! an OpenAI embeddings client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::types::EngineError;
use crate::{DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL, HASHING_DIMENSION};

/// Embedding vector
pub type Embedding = Vec<f32>;

const PROVIDER: &str = "embedding";

/// Text → vector capability
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str) -> Result<Embedding, EngineError>;

    /// Embed many texts, order preserved
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EngineError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Model identifier for health reporting
    fn model_name(&self) -> &str;

    /// Vector length
    fn dimension(&self) -> usize;
}

/// Scale to unit length in place; zero vectors stay zero
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Cosine of two unit vectors (plain dot product); 0.0 on length mismatch
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// =============================================================================
// LOCAL HASHING EMBEDDER
// =============================================================================

/// Deterministic character-trigram embedder
///
/// Words sharing spelling fragments land close together. Cheap enough to
/// run on the request path.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(HASHING_DIMENSION)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Synchronous embedding
    pub fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        let padded: Vec<char> = format!("^{}$", text.trim().to_lowercase()).chars().collect();

        for gram in padded.windows(3) {
            let hash = fnv1a(gram);
            let index = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        normalize(&mut vector);
        vector
    }
}

fn fnv1a(chars: &[char]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for c in chars {
        let mut buf = [0u8; 4];
        for byte in c.encode_utf8(&mut buf).bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EngineError> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EngineError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashing-trigram"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// =============================================================================
// OPENAI EMBEDDER
// =============================================================================

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// OpenAI `/v1/embeddings` client
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    /// Create embedder with the default model (text-embedding-3-small, 1536d)
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_model(api_key, DEFAULT_EMBEDDING_MODEL.to_string(), 1536)
    }

    /// Create embedder with a specific model
    pub fn with_model(api_key: Option<String>, model: String, dimension: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model,
            dimension,
        }
    }

    /// Point at a different API base (proxies, tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn request(&self, input: serde_json::Value) -> Result<Vec<Embedding>, EngineError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EngineError::unavailable(PROVIDER, "no API key configured"))?;

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": input,
            }))
            .send()
            .await
            .map_err(|e| EngineError::provider(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::provider(PROVIDER, format!("status {}", status.as_u16())));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EngineError::provider(PROVIDER, format!("malformed body: {}", e)))?;

        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        Ok(data
            .into_iter()
            .map(|d| {
                let mut v = d.embedding;
                normalize(&mut v);
                v
            })
            .collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EngineError> {
        self.request(serde_json::json!(text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::provider(PROVIDER, "no embedding in response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EngineError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.request(serde_json::json!(texts)).await?;
        if vectors.len() != texts.len() {
            return Err(EngineError::provider(
                PROVIDER,
                format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
            ));
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
