//! Interview Session Controller: advances a voice interview by one turn.
//!
//! Flow: timeout guard → turn accounting → system prompt → model call →
//!       validate & clamp → language guard → end-call escalation.
//!
//! Stateless: every counter comes in through `SessionContext` and goes back out
//! in `TurnResult` for the client to resend on the next call.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::interview::language::enforce_language;
use crate::interview::models::{SessionContext, Turn, TurnResult, TurnRole, SESSION_START};
use crate::interview::normalizer::parse_json_object;
use crate::interview::prompts::{build_system_prompt, candidate_note};
use crate::llm_client::{
    ChatMessage, ChatRole, CompletionRequest, LlmError, ModelGateway, ResponseFormat,
};

pub const DEFAULT_REPLY: &str = "Could you explain your approach in more detail?";
pub const DEFAULT_ALLOTTED_TIME_SEC: i64 = 45;
pub const MIN_ALLOTTED_TIME_SEC: i64 = 20;
pub const MAX_ALLOTTED_TIME_SEC: i64 = 90;

/// End-call prompts after which the session is closed regardless of the model.
pub const END_CALL_PROMPT_LIMIT: u32 = 3;

pub const CLOSING_REPLY: &str =
    "Thank you for your time today. The interview is now complete. Please click End Call.";
pub const TIMEOUT_REPLY: &str = "Thank you for this comprehensive interview. \
    We've covered a lot of ground today. That's all the time we have. \
    You did great! I'll share feedback soon.";

const TURN_TEMPERATURE: f32 = 0.5;
const TURN_MAX_TOKENS: u32 = 240;

/// The model's turn after validation, before escalation.
#[derive(Debug, Clone, PartialEq)]
struct ModelTurn {
    reply: String,
    allotted_time_sec: u32,
    interview_ended: bool,
    end_call_prompted: bool,
}

pub struct InterviewController<'a> {
    gateway: &'a dyn ModelGateway,
    history_window: usize,
}

impl<'a> InterviewController<'a> {
    pub fn new(gateway: &'a dyn ModelGateway, history_window: usize) -> Self {
        Self {
            gateway,
            history_window,
        }
    }

    /// Runs one interview turn.
    ///
    /// Only a failure of the primary model call is returned as an error.
    /// Malformed output is replaced with defaults; a failed rewrite is ignored.
    pub async fn advance(
        &self,
        user_input: &str,
        history: &[Turn],
        context: &SessionContext,
    ) -> Result<TurnResult, LlmError> {
        if let Some(result) = timeout_result(context) {
            info!(
                "Interview time limit reached ({}s), closing session",
                context.interview_duration_sec
            );
            return Ok(result);
        }

        let turn_index = turn_index(history, user_input);

        let system_prompt = match context.prompt_override() {
            Some(prompt) => {
                debug!("Turn {turn_index}: using caller-supplied interview prompt");
                prompt.to_string()
            }
            None => {
                debug!(
                    "Turn {turn_index}: synthesizing prompt (difficulty={})",
                    context.profile.difficulty.as_str()
                );
                build_system_prompt(&context.profile, turn_index, context.end_call_prompt_count)
            }
        };

        let messages = self.build_messages(user_input, history, context);
        let raw = self
            .gateway
            .complete(CompletionRequest {
                system: &system_prompt,
                messages: &messages,
                response_format: ResponseFormat::Json,
                temperature: TURN_TEMPERATURE,
                max_tokens: TURN_MAX_TOKENS,
            })
            .await?;

        let mut turn = parse_model_turn(&raw);
        turn.reply = enforce_language(self.gateway, turn.reply).await;

        Ok(escalate(turn, context.end_call_prompt_count))
    }

    /// Recent history window, then the candidate note, then the user turn.
    fn build_messages(
        &self,
        user_input: &str,
        history: &[Turn],
        context: &SessionContext,
    ) -> Vec<ChatMessage> {
        let window_start = history.len().saturating_sub(self.history_window);
        let mut messages: Vec<ChatMessage> =
            history[window_start..].iter().map(ChatMessage::from).collect();
        messages.push(ChatMessage::new(
            ChatRole::System,
            candidate_note(&context.profile.resume_summary, context.interview_duration_sec),
        ));
        messages.push(ChatMessage::new(ChatRole::User, user_input));
        messages
    }
}

/// Prior user turns, plus one unless the input is the session-start marker.
pub fn turn_index(history: &[Turn], user_input: &str) -> usize {
    let user_turns = history.iter().filter(|t| t.role == TurnRole::User).count();
    if user_input == SESSION_START {
        user_turns
    } else {
        user_turns + 1
    }
}

/// The fixed closing result when the session has run out of time.
pub fn timeout_result(context: &SessionContext) -> Option<TurnResult> {
    let max = context.max_interview_duration_sec.filter(|&m| m > 0)?;
    (context.interview_duration_sec >= max).then(|| TurnResult {
        reply: TIMEOUT_REPLY.to_string(),
        allotted_time_sec: 0,
        interview_ended: true,
        end_call_prompted: false,
        end_call_prompt_count: context.end_call_prompt_count,
    })
}

fn parse_model_turn(raw: &str) -> ModelTurn {
    let payload = parse_json_object(raw).unwrap_or_else(|| {
        warn!("Interviewer reply was not valid JSON, using defaults");
        Map::new()
    });

    let reply = payload
        .get("reply")
        .and_then(coerce_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_REPLY.to_string());

    let seconds = payload
        .get("allotted_time_sec")
        .and_then(coerce_seconds)
        .unwrap_or(DEFAULT_ALLOTTED_TIME_SEC);

    ModelTurn {
        reply,
        allotted_time_sec: clamp_allotted_time(seconds),
        interview_ended: payload.get("interview_ended").is_some_and(coerce_flag),
        end_call_prompted: payload.get("end_call_prompted").is_some_and(coerce_flag),
    }
}

fn clamp_allotted_time(seconds: i64) -> u32 {
    // Bounds are small positive constants, so the cast cannot truncate.
    seconds.clamp(MIN_ALLOTTED_TIME_SEC, MAX_ALLOTTED_TIME_SEC) as u32
}

/// Strings are trimmed, numbers are stringified. Anything else has no text.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers pass through, floats truncate, numeric strings parse.
fn coerce_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Counts this turn's end-call prompt and closes the session at the limit.
fn escalate(turn: ModelTurn, prior_prompt_count: u32) -> TurnResult {
    let end_call_prompt_count = prior_prompt_count.saturating_add(u32::from(turn.end_call_prompted));

    if end_call_prompt_count >= END_CALL_PROMPT_LIMIT {
        warn!("End-call prompt limit reached ({end_call_prompt_count}), forcing interview end");
        return TurnResult {
            reply: CLOSING_REPLY.to_string(),
            allotted_time_sec: turn.allotted_time_sec,
            interview_ended: true,
            end_call_prompted: turn.end_call_prompted,
            end_call_prompt_count,
        };
    }

    TurnResult {
        reply: turn.reply,
        allotted_time_sec: turn.allotted_time_sec,
        interview_ended: turn.interview_ended,
        end_call_prompted: turn.end_call_prompted,
        end_call_prompt_count,
    }
}
