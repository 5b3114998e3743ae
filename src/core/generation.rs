//! Generative path: prompt → provider → extractors → sanitized word
//!
//! Any provider fault ends here as `None`; the orchestrator only ever sees
//! "got a word" or "got nothing".

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::llm::GenerativeProvider;
use crate::core::sanitizer::{sanitize, sanitized_forms, SanitizePolicy};
use crate::types::{ExclusionSet, Word};

lazy_static! {
    static ref RE_WORD_SHAPED: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9\-]{0,24}$").unwrap();
}

/// System instructions sent with every generation
pub const SYSTEM_INSTRUCTIONS: &str = "You are the AI teammate in a word-connection game \
called Synergy. Each round you must output exactly one lowercase English word that best \
connects the two words from the previous round. \
Rules: output one token only, no spaces, no punctuation, no quotes. \
Never output either of the previous words. Do not repeat any banned words.";

/// Subtrees that carry model output; the body scan never leaves them
const ANSWER_ROOTS: &[&str] = &["output", "choices"];

/// Keys inside output items whose values describe the item, not the answer
const STRUCTURAL_KEYS: &[&str] = &[
    "id", "object", "model", "status", "role", "type", "summary", "format", "reason",
    "finish_reason", "logprobs", "annotations",
];

/// Response text extractor: parsed body → candidate text
pub type Extractor = fn(&Value) -> Option<String>;

/// Extractors in the order they are tried; the body scan is the last resort
pub const EXTRACTORS: [(&str, Extractor); 5] = [
    ("output_text", extract_output_text),
    ("output_segments", extract_output_segments),
    ("legacy_message", extract_legacy_message),
    ("word_key", extract_word_key),
    ("body_scan", extract_body_scan),
];

/// Build the user prompt for a previous pair
///
/// Previous words are already normalized (placeholder → empty).
pub fn build_user_prompt(prev_human: &str, prev_bot: &str, exclude: &ExclusionSet) -> String {
    let banned = if exclude.is_empty() {
        "(none)".to_string()
    } else {
        exclude.iter().collect::<Vec<_>>().join(", ")
    };
    format!(
        "Previous round words:\n\
         - human: {}\n\
         - ai: {}\n\
         Banned words (do not output any of these):\n{}\n\n\
         Your task: return a single lowercase connector word that relates strongly to \
         BOTH previous words. \
         It must not be either previous word and must not be any banned word. \
         Return only the word, nothing else.",
        prev_human, prev_bot, banned
    )
}

/// Ask the provider for a connector; `None` on any failure or rejection
pub async fn propose_via_generation(
    provider: &dyn GenerativeProvider,
    prev_human: &str,
    prev_bot: &str,
    exclude: &ExclusionSet,
) -> Option<Word> {
    let prompt = build_user_prompt(prev_human, prev_bot, exclude);

    let response = match provider.generate(SYSTEM_INSTRUCTIONS, &prompt).await {
        Ok(response) => response,
        Err(e) => {
            warn!(tier = "generative", error = %e, "generation failed");
            return None;
        }
    };

    if !response.is_success() {
        warn!(
            tier = "generative",
            status = response.status,
            body_len = response.body.len(),
            "provider returned non-success status"
        );
        return None;
    }

    let body: Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(e) => {
            warn!(
                tier = "generative",
                error = %e,
                body_len = response.body.len(),
                "unparseable provider body"
            );
            return None;
        }
    };

    for (name, extractor) in EXTRACTORS {
        let Some(text) = extractor(&body) else {
            continue;
        };
        match accept(&text, prev_human, prev_bot, exclude) {
            Some(word) => {
                debug!(extractor = name, word = %word, "generated candidate accepted");
                return Some(word);
            }
            None => debug!(extractor = name, "generated candidate rejected"),
        }
    }

    warn!(tier = "generative", "no usable word in provider response");
    None
}

/// Lenient sanitize plus no-echo and no-repeat checks
fn accept(text: &str, prev_human: &str, prev_bot: &str, exclude: &ExclusionSet) -> Option<Word> {
    let word = sanitize(Some(text), SanitizePolicy::Lenient)?;
    let echo = is_echo(&word, prev_human) || is_echo(&word, prev_bot);
    (!echo && !exclude.contains(word.as_str())).then_some(word)
}

/// Same word as a previous one, raw or in any sanitized form
fn is_echo(word: &Word, previous: &str) -> bool {
    let previous = previous.trim();
    if previous.is_empty() {
        return false;
    }
    word.as_str().eq_ignore_ascii_case(previous) || sanitized_forms(previous).contains(word)
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Convenience `output_text` field
fn extract_output_text(body: &Value) -> Option<String> {
    non_empty(body.get("output_text")?.as_str()?)
}

/// Structured `output[].content[].text` segments
fn extract_output_segments(body: &Value) -> Option<String> {
    body.get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content")?.as_array())
        .flatten()
        .filter_map(|segment| segment.get("text")?.as_str())
        .find_map(non_empty)
}

/// Chat-style `choices[0].message.content` or bare `message`
fn extract_legacy_message(body: &Value) -> Option<String> {
    ["/choices/0/message/content", "/message/content", "/message"]
        .iter()
        .filter_map(|pointer| body.pointer(pointer)?.as_str())
        .find_map(non_empty)
}

/// A `"word": "..."` pair anywhere in the body
fn extract_word_key(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => map
            .get("word")
            .and_then(Value::as_str)
            .and_then(non_empty)
            .or_else(|| map.values().find_map(extract_word_key)),
        Value::Array(items) => items.iter().find_map(extract_word_key),
        _ => None,
    }
}

/// Last resort: first word-shaped string inside the output subtrees
fn extract_body_scan(body: &Value) -> Option<String> {
    ANSWER_ROOTS
        .iter()
        .filter_map(|root| body.get(*root))
        .find_map(scan_output)
}

fn scan_output(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| !STRUCTURAL_KEYS.contains(&key.as_str()))
            .find_map(|(_, value)| scan_output(value)),
        Value::Array(items) => items.iter().find_map(scan_output),
        Value::String(text) => {
            let text = text.trim();
            RE_WORD_SHAPED.is_match(text).then(|| text.to_string())
        }
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
