//! Synergy: next-word selection engine for a cooperative word-connection game
//!
//! Each round picks one connector word for the previous (human, AI) pair:
//! generative model → embedding similarity → neutral seed, never repeating
//! an excluded word and never echoing the previous pair.

pub mod core;
pub mod types;

// =============================================================================
// WORDS
// =============================================================================

/// Literal sent by the game server when a round had no valid guess
pub const NO_GUESS: &str = "(no guess)";

/// Strict word length bounds (bank and seed words)
pub const STRICT_MIN_LEN: usize = 2;
pub const STRICT_MAX_LEN: usize = 20;

/// Lenient word length bound (generated words)
pub const LENIENT_MAX_LEN: usize = 25;

// =============================================================================
// SEEDS
// =============================================================================

/// Neutral bridge words used for the first round and as the last fallback
pub const SEED_POOL: [&str; 15] = [
    "bridge", "link", "common", "middle", "center", "focus", "union", "merge",
    "pair", "match", "signal", "theme", "point", "route", "path",
];

/// Floor of the fallback chain
pub const DEFAULT_SEED: &str = "bridge";

// =============================================================================
// SCORING
// =============================================================================

/// Default weight of the previous human word
pub const DEFAULT_BETA: f32 = 0.5;

/// Default weight of the previous AI word
pub const DEFAULT_GAMMA: f32 = 0.5;

/// Default number of scored words returned
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound accepted for top_k
pub const MAX_TOP_K: usize = 100;

// =============================================================================
// PROVIDERS
// =============================================================================

/// Generative call budget (seconds)
pub const GENERATION_TIMEOUT_SECS: u64 = 20;

/// Token cap for one generated word
pub const GENERATION_MAX_OUTPUT_TOKENS: u32 = 32;

/// Default generative model
pub const DEFAULT_GENERATIVE_MODEL: &str = "gpt-5-nano";

/// Default OpenAI API base
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default remote embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Words per embedding request during the background load
pub const EMBED_BATCH_SIZE: usize = 128;

/// Embedding requests in flight during the background load
pub const EMBED_CONCURRENCY: usize = 4;

/// Dimension of the local hashing embedder
pub const HASHING_DIMENSION: usize = 256;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
