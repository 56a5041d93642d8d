// Shared prompt fragments used by more than one interview prompt.
// Each feature module keeps its own prompts.rs for everything else.

/// The only language the interviewer may speak.
pub const INTERVIEW_LANGUAGE: &str = "English";

/// Trailer enforcing the per-turn JSON contract.
pub const TURN_JSON_CONTRACT: &str = r#"Return STRICT JSON only with this shape:
{
  "reply": "string",
  "allotted_time_sec": 20-90,
  "interview_ended": true|false,
  "end_call_prompted": true|false
}
Do NOT include any text outside the JSON object. Do NOT use markdown code fences."#;

/// System prompt for the corrective language rewrite pass.
pub const REWRITE_SYSTEM: &str = "Rewrite the following into natural professional English. \
    Keep the meaning the same. \
    Output JSON with a single key 'reply'.";
