//! Interview data model: turns, caller-supplied session context, turn results.
//!
//! Nothing here is persisted. The client reconstructs the context and history
//! on every call and threads the returned counters back in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm_client::{ChatMessage, ChatRole};

/// User input that opens a session instead of answering a question.
pub const SESSION_START: &str = "START_SESSION";

const DEFAULT_COMPANY: &str = "Tech Company";
const DEFAULT_ROLE_NAME: &str = "Software Engineer";
const DEFAULT_TOPICS: &str = "General";
const DEFAULT_RESUME_SUMMARY: &str = "No resume provided";

// ────────────────────────────────────────────────────────────────────────────
// Turns
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message of the interview transcript, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            TurnRole::User => ChatRole::User,
            TurnRole::Assistant => ChatRole::Assistant,
        };
        ChatMessage::new(role, turn.content.clone())
    }
}

/// Normalizes the client's history snapshot.
///
/// - non-object entries are skipped
/// - any role other than `user` becomes `assistant`
/// - non-string content is stringified; blank content is dropped
pub fn normalize_history(raw: &[Value]) -> Vec<Turn> {
    raw.iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let role = match entry.get("role").and_then(Value::as_str) {
                Some("user") => TurnRole::User,
                _ => TurnRole::Assistant,
            };
            let content = match entry.get("content") {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            (!content.is_empty()).then_some(Turn { role, content })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Session context
// ────────────────────────────────────────────────────────────────────────────

/// Interviewer difficulty. Unknown labels fall back to `Moderate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    #[default]
    Moderate,
    Tough,
}

impl Difficulty {
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("basic") => Difficulty::Basic,
            Some("tough") => Difficulty::Tough,
            _ => Difficulty::Moderate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Moderate => "moderate",
            Difficulty::Tough => "tough",
        }
    }
}

/// Topics arrive either as one string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Topics {
    Single(String),
    List(Vec<String>),
}

impl Topics {
    /// Comma-joined, with blank items removed.
    pub fn flatten(&self) -> String {
        match self {
            Topics::Single(s) => s.trim().to_string(),
            Topics::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Raw interview profile fields as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub company: Option<String>,
    pub role_name: Option<String>,
    pub topics: Option<Topics>,
    pub resume_summary: Option<String>,
    pub difficulty: Option<String>,
}

/// Profile with defaults applied. Every field is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewProfile {
    pub company: String,
    pub role_name: String,
    pub topics: String,
    pub resume_summary: String,
    pub difficulty: Difficulty,
}

impl From<ProfileInput> for InterviewProfile {
    fn from(input: ProfileInput) -> Self {
        InterviewProfile {
            company: or_default(input.company, DEFAULT_COMPANY),
            role_name: or_default(input.role_name, DEFAULT_ROLE_NAME),
            topics: or_default(input.topics.map(|t| t.flatten()), DEFAULT_TOPICS),
            resume_summary: or_default(input.resume_summary, DEFAULT_RESUME_SUMMARY),
            difficulty: Difficulty::from_label(input.difficulty.as_deref()),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Per-call session state, all of it caller-supplied.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub profile: InterviewProfile,
    pub interview_duration_sec: u64,
    pub end_call_prompt_count: u32,
    /// Active timeout guard, if any. Zero is treated as disabled.
    pub max_interview_duration_sec: Option<u64>,
    /// Pre-generated system prompt that replaces the synthesized one.
    pub interview_prompt: Option<String>,
}

impl SessionContext {
    /// The override prompt, trimmed, when it carries any text.
    pub fn prompt_override(&self) -> Option<&str> {
        self.interview_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
impl SessionContext {
    /// A fresh session with no elapsed time, counters or overrides.
    pub fn new(profile: InterviewProfile) -> Self {
        SessionContext {
            profile,
            interview_duration_sec: 0,
            end_call_prompt_count: 0,
            max_interview_duration_sec: None,
            interview_prompt: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Turn result
// ────────────────────────────────────────────────────────────────────────────

/// What one `advance` call hands back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    pub reply: String,
    /// Seconds the client should wait for the candidate. Within [20, 90],
    /// except 0 when the session timed out.
    pub allotted_time_sec: u32,
    pub interview_ended: bool,
    pub end_call_prompted: bool,
    pub end_call_prompt_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_history_coerces_unknown_roles() {
        let raw = vec![
            json!({"role": "system", "content": "hello"}),
            json!({"role": "user", "content": "hi"}),
            json!({"content": "no role"}),
        ];
        let turns = normalize_history(&raw);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, TurnRole::Assistant);
        assert_eq!(turns[1].role, TurnRole::User);
        assert_eq!(turns[2].role, TurnRole::Assistant);
    }

    #[test]
    fn test_normalize_history_drops_blank_and_non_object_entries() {
        let raw = vec![
            json!({"role": "user", "content": "   "}),
            json!("just a string"),
            json!({"role": "user"}),
            json!({"role": "assistant", "content": null}),
            json!({"role": "user", "content": "  answer  "}),
        ];
        let turns = normalize_history(&raw);
        assert_eq!(
            turns,
            vec![Turn {
                role: TurnRole::User,
                content: "answer".to_string()
            }]
        );
    }

    #[test]
    fn test_normalize_history_stringifies_non_string_content() {
        let raw = vec![json!({"role": "user", "content": 42})];
        assert_eq!(normalize_history(&raw)[0].content, "42");
    }

    #[test]
    fn test_difficulty_from_label() {
        assert_eq!(Difficulty::from_label(Some("tough")), Difficulty::Tough);
        assert_eq!(Difficulty::from_label(Some("  BASIC ")), Difficulty::Basic);
        assert_eq!(Difficulty::from_label(Some("insane")), Difficulty::Moderate);
        assert_eq!(Difficulty::from_label(None), Difficulty::Moderate);
    }

    #[test]
    fn test_topics_accepts_string_or_list() {
        let single: Topics = serde_json::from_value(json!("Rust, Tokio")).unwrap();
        assert_eq!(single.flatten(), "Rust, Tokio");

        let list: Topics = serde_json::from_value(json!(["DSA", " ", "System Design"])).unwrap();
        assert_eq!(list.flatten(), "DSA, System Design");
    }

    #[test]
    fn test_profile_defaults_fill_blank_fields() {
        let profile = InterviewProfile::from(ProfileInput {
            company: Some("  ".to_string()),
            role_name: None,
            topics: Some(Topics::List(vec![])),
            resume_summary: None,
            difficulty: Some("unknown".to_string()),
        });
        assert_eq!(profile.company, "Tech Company");
        assert_eq!(profile.role_name, "Software Engineer");
        assert_eq!(profile.topics, "General");
        assert_eq!(profile.resume_summary, "No resume provided");
        assert_eq!(profile.difficulty, Difficulty::Moderate);
    }

    #[test]
    fn test_prompt_override_ignores_whitespace() {
        let mut ctx = SessionContext::new(InterviewProfile::from(ProfileInput::default()));
        ctx.interview_prompt = Some("   \n".to_string());
        assert!(ctx.prompt_override().is_none());

        ctx.interview_prompt = Some("  You are Maya, an interviewer.  ".to_string());
        assert_eq!(ctx.prompt_override(), Some("You are Maya, an interviewer."));
    }

    #[test]
    fn test_turn_result_serializes_contract_fields() {
        let result = TurnResult {
            reply: "Tell me about yourself.".to_string(),
            allotted_time_sec: 45,
            interview_ended: false,
            end_call_prompted: false,
            end_call_prompt_count: 0,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "reply": "Tell me about yourself.",
                "allotted_time_sec": 45,
                "interview_ended": false,
                "end_call_prompted": false,
                "end_call_prompt_count": 0
            })
        );
    }
}
