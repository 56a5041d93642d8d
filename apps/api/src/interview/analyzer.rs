//! Post-interview coaching analysis.
//!
//! Scores a finished transcript. The model is asked for a 0-10 scale but
//! sometimes answers out of 100, so scores are rescaled and clamped before
//! they reach the client.

use serde_json::{Map, Number, Value};
use tracing::info;

use crate::errors::AppError;
use crate::interview::models::InterviewProfile;
use crate::interview::normalizer::parse_json_object;
use crate::interview::prompts::{build_analysis_request, ANALYSIS_SYSTEM};
use crate::llm_client::{ChatMessage, ChatRole, CompletionRequest, ModelGateway, ResponseFormat};

const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 1200;
const MAX_SCORE: f64 = 10.0;
const PERCENT_SCALE: f64 = 100.0;

pub async fn analyze_interview(
    gateway: &dyn ModelGateway,
    profile: &InterviewProfile,
    interview_duration_sec: u64,
    transcript: &[Value],
) -> Result<Map<String, Value>, AppError> {
    let transcript_text = format_transcript(transcript);
    let messages = [ChatMessage::new(
        ChatRole::User,
        build_analysis_request(profile, interview_duration_sec, &transcript_text),
    )];

    let text = gateway
        .complete(CompletionRequest {
            system: ANALYSIS_SYSTEM,
            messages: &messages,
            response_format: ResponseFormat::Json,
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        })
        .await
        .map_err(|e| AppError::Llm(format!("Interview analysis failed: {e}")))?;

    let mut analysis = parse_json_object(&text)
        .ok_or_else(|| AppError::Llm("Interview analysis was not a JSON object".to_string()))?;
    normalize_scores(&mut analysis);

    info!(
        "Analyzed interview for {} / {} ({} transcript lines)",
        profile.company,
        profile.role_name,
        transcript.len()
    );
    Ok(analysis)
}

/// One `speaker: text` line per object entry; anything else is skipped.
fn format_transcript(transcript: &[Value]) -> String {
    transcript
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| {
            let speaker = entry.get("speaker").and_then(Value::as_str).unwrap_or("Unknown");
            let text = entry.get("text").and_then(Value::as_str).unwrap_or("");
            format!("{speaker}: {text}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_scores(analysis: &mut Map<String, Value>) {
    if let Some(score) = analysis.get_mut("overall_score") {
        *score = normalize_score(score);
    }
    if let Some(Value::Object(metrics)) = analysis.get_mut("metrics") {
        for value in metrics.values_mut() {
            *value = normalize_score(value);
        }
    }
}

/// Numbers and numeric strings in (10, 100] are read as percentages, then
/// everything is clamped to 0-10. Non-numeric values are returned as-is.
fn normalize_score(value: &Value) -> Value {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(mut score) = numeric.filter(|n| n.is_finite()) else {
        return value.clone();
    };

    if score > MAX_SCORE && score <= PERCENT_SCALE {
        score /= MAX_SCORE;
    }
    Number::from_f64(score.clamp(0.0, MAX_SCORE))
        .map(Value::Number)
        .unwrap_or_else(|| value.clone())
}
