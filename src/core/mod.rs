//! Core modules for Synergy

pub mod sanitizer;
pub mod embedding;
pub mod word_bank;
pub mod ranker;
pub mod seed;
pub mod llm;
pub mod generation;
pub mod orchestrator;
pub mod api;

pub use sanitizer::{sanitize, sanitize_strict, sanitized_forms, SanitizePolicy};
pub use embedding::{cosine, Embedding, EmbeddingProvider, HashingEmbedder, OpenAiEmbedder};
pub use word_bank::{BankSource, EmbeddingMatrix, WordBank, DEFAULT_CATALOGUE};
pub use ranker::SimilarityRanker;
pub use seed::{RandomSource, SeedPicker};
pub use llm::{GenerativeProvider, OpenAiResponsesClient, ProviderResponse};
pub use generation::{build_user_prompt, propose_via_generation, SYSTEM_INSTRUCTIONS};
pub use orchestrator::SelectionOrchestrator;
pub use api::{create_router, run_server};
