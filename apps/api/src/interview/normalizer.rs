//! Response Normalizer: pulls a JSON object out of model output that was asked
//! for JSON but may be wrapped in prose or code fences.
//!
//! Order, first success wins: strict parse → fenced block → first `{` to last `}`.
//! Only JSON objects count as success. Never errors.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

/// ```json { ... } ``` with an optional language tag. The body is
/// non-greedy, so it stops at the first `}` that is followed by a closing fence.
static FENCED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(\{.*?\})\s*```").expect("valid regex"));

pub fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(object) = as_object(text) {
        return Some(object);
    }

    if let Some(object) = FENCED_OBJECT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|body| as_object(body.as_str()))
    {
        return Some(object);
    }

    if let Some(object) = brace_span(text).and_then(as_object) {
        return Some(object);
    }

    warn!("No JSON object recoverable from model output ({} chars)", text.len());
    None
}

fn as_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// The substring from the first `{` to the last `}`, inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
