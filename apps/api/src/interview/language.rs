//! Language-consistency guard.
//!
//! Replies must stay in `INTERVIEW_LANGUAGE`. A small marker list catches the
//! common Hinglish code-mixing; a hit triggers one corrective rewrite call.
//! The rewrite is best-effort and can never fail the turn.

use tracing::{debug, warn};

use crate::interview::normalizer::parse_json_object;
use crate::llm_client::prompts::REWRITE_SYSTEM;
use crate::llm_client::{ChatMessage, ChatRole, CompletionRequest, ModelGateway, ResponseFormat};

const REWRITE_TEMPERATURE: f32 = 0.2;
const REWRITE_MAX_TOKENS: u32 = 180;

#[derive(Debug, Clone, Copy)]
enum Marker {
    /// Matches a whole token.
    Word(&'static str),
    /// Matches any token starting with it ("bata" → "batao", "nahi" → "nahin").
    Prefix(&'static str),
}

// Tunable heuristic, not a language detector.
const CODE_MIXED_MARKERS: &[Marker] = &[
    Marker::Word("kya"),
    Marker::Word("kaise"),
    Marker::Word("aap"),
    Marker::Prefix("haan"),
    Marker::Prefix("nahi"),
    Marker::Word("yahaan"),
    Marker::Word("sahayta"),
    Marker::Prefix("bata"),
];

impl Marker {
    fn matches(&self, token: &str) -> bool {
        match self {
            Marker::Word(word) => token == *word,
            Marker::Prefix(prefix) => token.starts_with(prefix),
        }
    }
}

/// True if any token of `text` hits the marker list.
pub fn contains_code_mixing(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| CODE_MIXED_MARKERS.iter().any(|m| m.matches(token)))
}

/// Returns `reply` unchanged unless it is code-mixed and the rewrite call
/// produces a non-empty replacement.
pub async fn enforce_language(gateway: &dyn ModelGateway, reply: String) -> String {
    if !contains_code_mixing(&reply) {
        return reply;
    }

    debug!("Reply contains code-mixed markers, requesting rewrite");
    match request_rewrite(gateway, &reply).await {
        Ok(Some(rewritten)) => rewritten,
        Ok(None) => {
            warn!("Language rewrite returned no usable reply; keeping original");
            reply
        }
        Err(e) => {
            warn!("Language rewrite failed, keeping original reply: {e}");
            reply
        }
    }
}

async fn request_rewrite(
    gateway: &dyn ModelGateway,
    reply: &str,
) -> Result<Option<String>, crate::llm_client::LlmError> {
    let messages = [ChatMessage::new(ChatRole::User, reply)];
    let text = gateway
        .complete(CompletionRequest {
            system: REWRITE_SYSTEM,
            messages: &messages,
            response_format: ResponseFormat::Json,
            temperature: REWRITE_TEMPERATURE,
            max_tokens: REWRITE_MAX_TOKENS,
        })
        .await?;

    Ok(parse_json_object(&text)
        .and_then(|payload| {
            payload
                .get("reply")
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty()))
}
