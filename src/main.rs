//! Synergy CLI
//!
//! Usage:
//!   synergy --serve                                # HTTP API server
//!   synergy --prev-human car --prev-bot road       # Single selection
//!   synergy --prev-human car --prev-bot road --json

use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synergy::core::{
    run_server, EmbeddingProvider, HashingEmbedder, OpenAiEmbedder, OpenAiResponsesClient,
    SelectionOrchestrator, WordBank,
};
use synergy::types::{SelectionRequest, Strategy};
use synergy::{DEFAULT_GENERATIVE_MODEL, DEFAULT_OPENAI_BASE_URL, GENERATION_TIMEOUT_SECS, VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmbedderArg {
    Hashing,
    Openai,
}

#[derive(Parser, Debug)]
#[command(
    name = "synergy",
    version = VERSION,
    about = "Synergy - pick the connector word for a word-association round",
    long_about = "Synergy picks one word that bridges the previous round's human and AI words.\n\n\
                  Tiers, tried in order:\n  \
                  generative  - ask a language model (needs OPENAI_API_KEY)\n  \
                  similarity  - rank the word bank by embedding similarity\n  \
                  seed        - neutral bridge word\n\n\
                  Modes:\n  \
                  --serve     HTTP API server\n  \
                  (default)   single selection from --prev-human / --prev-bot"
)]
struct Args {
    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address
    #[arg(long, env = "SYNERGY_ADDR", default_value = "0.0.0.0:8000")]
    addr: String,

    /// OpenAI API key (enables the generative tier)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Generative model
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_GENERATIVE_MODEL)]
    model: String,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    base_url: String,

    /// Primary strategy: generative | similarity (default: generative when a key is set)
    #[arg(long, env = "SYNERGY_STRATEGY")]
    strategy: Option<Strategy>,

    /// Embedding backend for the word bank
    #[arg(long, env = "SYNERGY_EMBEDDER", value_enum, default_value = "hashing")]
    embedder: EmbedderArg,

    /// Word bank file (created with the default catalogue if missing)
    #[arg(long, env = "SYNERGY_WORD_BANK", default_value = "word_bank.txt")]
    word_bank: String,

    /// Generative call timeout in seconds
    #[arg(long, default_value_t = GENERATION_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Previous human word (single mode)
    #[arg(long)]
    prev_human: Option<String>,

    /// Previous AI word (single mode)
    #[arg(long)]
    prev_bot: Option<String>,

    /// Words to exclude, comma separated (single mode)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Number of scored words to report
    #[arg(long)]
    top_k: Option<usize>,

    /// Weight of the previous human word
    #[arg(long)]
    beta: Option<f32>,

    /// Weight of the previous AI word
    #[arg(long)]
    gamma: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let engine = Arc::new(build_engine(&args));

    if args.serve {
        let _loader = engine.bank().spawn_loader();
        run_server(&args.addr, engine).await
    } else {
        run_single(&args, &engine).await
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "synergy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_engine(args: &Args) -> SelectionOrchestrator {
    let api_key = args.api_key.clone().filter(|k| !k.trim().is_empty());

    let embedder: Arc<dyn EmbeddingProvider> = match args.embedder {
        EmbedderArg::Hashing => Arc::new(HashingEmbedder::default()),
        EmbedderArg::Openai => {
            Arc::new(OpenAiEmbedder::new(api_key.clone()).with_base_url(&args.base_url))
        }
    };
    let bank = Arc::new(WordBank::from_file(&args.word_bank, embedder));

    let strategy = args.strategy.unwrap_or(if api_key.is_some() {
        Strategy::Generative
    } else {
        Strategy::Similarity
    });
    if strategy == Strategy::Generative && api_key.is_none() {
        warn!("generative strategy without OPENAI_API_KEY; every round will fall back");
    }

    let generator = OpenAiResponsesClient::with_model(
        api_key,
        &args.model,
        Duration::from_secs(args.timeout_secs),
    )
    .with_base_url(&args.base_url);

    info!(
        strategy = %strategy,
        model = %args.model,
        word_bank = %args.word_bank,
        "engine configured"
    );

    SelectionOrchestrator::new(bank, strategy)
        .with_generator(Arc::new(generator))
        .with_generation_timeout(Duration::from_secs(args.timeout_secs))
}

/// Run one selection and print it
async fn run_single(
    args: &Args,
    engine: &SelectionOrchestrator,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = engine.bank().ensure_loaded().await {
        warn!(error = %e, "word bank unavailable, continuing without similarity tier");
    }

    let request = SelectionRequest::new(
        args.prev_human.clone(),
        args.prev_bot.clone(),
        &args.exclude,
        args.top_k,
        args.beta,
        args.gamma,
    )?;
    let result = engine.select(&request).await;

    if args.json {
        let output = serde_json::json!({
            "choice": result.choice,
            "scores": result.scores,
            "tier": result.tier,
            "reason": result.reason.code(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", result.to_parseable_string());
        for scored in &result.scores {
            println!("  {:<20} {:.4}", scored.word, scored.score);
        }
    }
    Ok(())
}
