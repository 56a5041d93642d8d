//! Axum route handlers for the Interviewer API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::interview::analyzer::analyze_interview;
use crate::interview::controller::InterviewController;
use crate::interview::models::{
    normalize_history, InterviewProfile, ProfileInput, SessionContext, TurnResult,
};
use crate::interview::prompt_generator::generate_interview_prompt;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InterviewerRequest {
    pub message: Option<String>,
    /// Raw client transcript; normalized before use.
    pub history: Option<Vec<Value>>,
    #[serde(flatten)]
    pub profile: ProfileInput,
    pub interview_duration_sec: Option<u64>,
    pub end_call_prompt_count: Option<u32>,
    pub interview_prompt: Option<String>,
    /// Overrides `MAX_INTERVIEW_DURATION_SEC` for this call.
    pub max_interview_duration_sec: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewPromptRequest {
    #[serde(flatten)]
    pub profile: ProfileInput,
}

#[derive(Debug, Serialize)]
pub struct InterviewPromptResponse {
    pub interview_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewAnalysisRequest {
    /// `{speaker, text}` entries; anything else is skipped.
    pub transcript: Option<Vec<Value>>,
    #[serde(flatten)]
    pub profile: ProfileInput,
    pub interview_duration_sec: Option<u64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviewer
///
/// Advances the interview by one candidate utterance. The client owns all
/// session state and resends it with every call.
pub async fn handle_interviewer_turn(
    State(state): State<AppState>,
    Json(request): Json<InterviewerRequest>,
) -> Result<Json<TurnResult>, AppError> {
    let message = request.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let history = normalize_history(&request.history.unwrap_or_default());
    let context = SessionContext {
        profile: InterviewProfile::from(request.profile),
        interview_duration_sec: request.interview_duration_sec.unwrap_or_default(),
        end_call_prompt_count: request.end_call_prompt_count.unwrap_or_default(),
        max_interview_duration_sec: request
            .max_interview_duration_sec
            .or(state.config.max_interview_duration_sec),
        interview_prompt: request.interview_prompt,
    };

    let controller = InterviewController::new(state.gateway.as_ref(), state.config.history_window);
    let result = controller
        .advance(message, &history, &context)
        .await
        .map_err(|e| AppError::Llm(format!("Interviewer turn failed: {e}")))?;

    Ok(Json(result))
}

/// POST /api/v1/interviewer/prompt
///
/// Generates a reusable interviewer system prompt for one session.
pub async fn handle_generate_prompt(
    State(state): State<AppState>,
    Json(request): Json<InterviewPromptRequest>,
) -> Result<Json<InterviewPromptResponse>, AppError> {
    let profile = InterviewProfile::from(request.profile);
    let interview_prompt = generate_interview_prompt(state.gateway.as_ref(), &profile).await?;
    Ok(Json(InterviewPromptResponse { interview_prompt }))
}

/// POST /api/v1/interviewer/analysis
///
/// Scores a finished interview and returns coaching feedback.
pub async fn handle_analyze_interview(
    State(state): State<AppState>,
    Json(request): Json<InterviewAnalysisRequest>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let transcript = request.transcript.unwrap_or_default();
    if !transcript.iter().any(Value::is_object) {
        return Err(AppError::Validation("transcript cannot be empty".to_string()));
    }

    let profile = InterviewProfile::from(request.profile);
    let analysis = analyze_interview(
        state.gateway.as_ref(),
        &profile,
        request.interview_duration_sec.unwrap_or_default(),
        &transcript,
    )
    .await?;
    Ok(Json(analysis))
}
