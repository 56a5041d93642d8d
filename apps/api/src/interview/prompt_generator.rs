//! One-time interview prompt generation.
//!
//! Produces a reusable interviewer system prompt for a session. The client
//! stores it and sends it back as `interview_prompt` on every turn.

use tracing::info;

use crate::errors::AppError;
use crate::interview::models::InterviewProfile;
use crate::interview::prompts::{build_prompt_generation_request, PROMPT_GENERATION_SYSTEM};
use crate::llm_client::{ChatMessage, ChatRole, CompletionRequest, ModelGateway, ResponseFormat};

const GENERATION_TEMPERATURE: f32 = 0.7;
const GENERATION_MAX_TOKENS: u32 = 1500;

pub async fn generate_interview_prompt(
    gateway: &dyn ModelGateway,
    profile: &InterviewProfile,
) -> Result<String, AppError> {
    let messages = [ChatMessage::new(
        ChatRole::User,
        build_prompt_generation_request(profile),
    )];

    let text = gateway
        .complete(CompletionRequest {
            system: PROMPT_GENERATION_SYSTEM,
            messages: &messages,
            response_format: ResponseFormat::Text,
            temperature: GENERATION_TEMPERATURE,
            max_tokens: GENERATION_MAX_TOKENS,
        })
        .await
        .map_err(|e| AppError::Llm(format!("Interview prompt generation failed: {e}")))?;

    let prompt = text.trim();
    if prompt.is_empty() {
        return Err(AppError::Llm(
            "Interview prompt generation returned empty text".to_string(),
        ));
    }

    info!(
        "Generated interview prompt for {} / {} ({} chars)",
        profile.company,
        profile.role_name,
        prompt.len()
    );
    Ok(prompt.to_string())
}
