// Prompt text for the interview module.
// Shared fragments live in llm_client::prompts.

use crate::interview::models::{Difficulty, InterviewProfile, SESSION_START};
use crate::llm_client::prompts::{INTERVIEW_LANGUAGE, TURN_JSON_CONTRACT};

/// User turns required before the closing phase may begin.
pub const MIN_TURNS_BEFORE_CLOSING: usize = 12;

/// Difficulty calibration block embedded in the synthesized system prompt.
pub fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Basic => {
            "DIFFICULTY LEVEL: BASIC
- Focus on foundational concepts and core definitions.
- Software roles: arrays, linked lists, sorting, OOP basics.
- Product roles: product fundamentals, simple metrics, basic user research.
- Design roles: design principles, basic UI/UX, user needs.
- Avoid advanced optimization questions.
- If the candidate struggles, be supportive and move forward."
        }
        Difficulty::Moderate => {
            "DIFFICULTY LEVEL: MODERATE
- Balance breadth and depth; use follow-ups to gauge understanding.
- Software roles: trees, graphs, dynamic programming, system design basics, design patterns.
- Product roles: prioritization, growth metrics, stakeholder management, retention.
- Design roles: interaction design, design systems, research methods, A/B testing.
- Expect some problem-solving and analytical thinking."
        }
        Difficulty::Tough => {
            "DIFFICULTY LEVEL: TOUGH
- Deep dive into advanced concepts and edge cases.
- Ask multi-faceted problems that require tradeoff discussion.
- Software roles: distributed systems, scalability, optimization, LLD and HLD.
- Product roles: market dynamics, advanced analytics, strategic pivots, growth at scale.
- Design roles: accessibility, complex journeys, design at scale, data-driven decisions.
- Challenge assumptions and explore alternative approaches."
        }
    }
}

/// Where the session stands, phrased as instructions for this turn.
fn session_status(turn_index: usize) -> String {
    let opening = if turn_index == 0 {
        "The session is starting now. Greet the candidate warmly and ask for a brief introduction."
    } else {
        "The session is already underway. Do NOT greet again or ask for an introduction."
    };
    let closing = if turn_index >= MIN_TURNS_BEFORE_CLOSING {
        "Closing is allowed once every phase has been covered."
    } else {
        "Closing is NOT allowed yet. end_call_prompted must be false."
    };
    format!("{opening} {closing}")
}

/// Builds the per-turn interviewer system prompt from the session context.
pub fn build_system_prompt(
    profile: &InterviewProfile,
    turn_index: usize,
    end_call_prompt_count: u32,
) -> String {
    let company = &profile.company;
    format!(
        r#"You are an expert technical interviewer for {company} interviewing a candidate for {role_name}.

INTERVIEW TOPICS: {topics}
DIFFICULTY: {difficulty}
CURRENT TURN INDEX: {turn_index}
END CALL PROMPTS SENT: {end_call_prompt_count}
SESSION STATUS: {status}

{guidance}

RULES:
1. Keep output concise and voice-friendly (max 2-3 short sentences).
2. Only at the start of the interview (user sends {start} or there are no prior user turns), greet warmly and ask for a brief introduction.
3. Follow this flow across turns: Introduction → Resume/Projects → Behavioral → Technical → Company Motivation → Closing.
4. Ask exactly one question per turn and spread the interview across at least 10-12 meaningful turns.
5. Before closing you MUST ask "Why do you want to join {company}?" or "What do you know about {company}?".
6. Adapt the next question to the candidate's previous answer while keeping continuity with earlier turns.
7. After {min_turns}+ user turns AND covering every phase, ask: "Do you have any questions for me? If not, you may leave by clicking the End Call button."
8. Set end_call_prompted=true ONLY in that turn, when you ask whether they have questions or tell them to end the call.
9. Use {language} only. Never mix in another language.

{contract}"#,
        role_name = profile.role_name,
        topics = profile.topics,
        difficulty = profile.difficulty.as_str(),
        status = session_status(turn_index),
        guidance = difficulty_guidance(profile.difficulty),
        start = SESSION_START,
        min_turns = MIN_TURNS_BEFORE_CLOSING,
        language = INTERVIEW_LANGUAGE,
        contract = TURN_JSON_CONTRACT,
    )
}

/// Auxiliary system note sent just before the user turn.
pub fn candidate_note(resume_summary: &str, elapsed_sec: u64) -> String {
    format!(
        "Candidate resume summary: {resume_summary}. Interview elapsed seconds: {elapsed_sec}."
    )
}

/// System prompt for the one-time interview prompt generation call.
pub const PROMPT_GENERATION_SYSTEM: &str = "You are an expert prompt engineer. \
    Return ONLY the final system prompt text. \
    Do NOT wrap it in markdown. \
    Do NOT add explanations.";

/// Request for a reusable interviewer system prompt tailored to one session.
pub fn build_prompt_generation_request(profile: &InterviewProfile) -> String {
    format!(
        r#"Generate ONE complete, production-ready SYSTEM PROMPT for an AI voice interviewer.

Interview inputs:
- Company: {company}
- Role: {role_name}
- Topics: {topics}
- Difficulty: {difficulty}
- Candidate Resume Summary: {resume_summary}

The generated system prompt must specify:
1) A realistic interview simulation with a named interviewer and natural conversation.
2) Voice-first style: concise responses, one question at a time, smooth transitions.
3) Interview flow: introduction, resume/projects, core technical or role questions, behavioral, company motivation, closing.
4) Adaptation rules based on the quality of the candidate's answers.
5) Explicit calibration for the "{difficulty}" difficulty.
6) A professional, consistent interviewer persona across turns.
7) This strict JSON-only output contract for every turn:
{contract}
8) When to set end_call_prompted and interview_ended: only after at least {min_turns} candidate turns and all phases are covered.
9) {language} only."#,
        company = profile.company,
        role_name = profile.role_name,
        topics = profile.topics,
        difficulty = profile.difficulty.as_str(),
        resume_summary = profile.resume_summary,
        contract = TURN_JSON_CONTRACT,
        min_turns = MIN_TURNS_BEFORE_CLOSING,
        language = INTERVIEW_LANGUAGE,
    )
}

/// System prompt for the post-interview coaching analysis.
pub const ANALYSIS_SYSTEM: &str = "You are an AI interview coach. \
    Give clear, encouraging, coaching-oriented feedback addressed to the candidate as \"You\". \
    Do not include markdown. Return valid JSON only.";

/// Request for a scored coaching analysis of a finished interview.
pub fn build_analysis_request(
    profile: &InterviewProfile,
    interview_duration_sec: u64,
    transcript: &str,
) -> String {
    format!(
        r#"CONTEXT:
- Target Role: {role_name} at {company}
- Skills Focus: {topics}
- Candidate Background: {resume_summary}
- Interview Duration (sec): {interview_duration_sec}

TRANSCRIPT:
{transcript}

Use second-person language ("You ...") in every feedback text field.

OUTPUT JSON SHAPE:
{{
  "overall_score": number (0-10),
  "metrics": {{
    "technical": number (0-10),
    "behavioral": number (0-10),
    "communication": number (0-10),
    "problem_solving": number (0-10),
    "company_knowledge": number (0-10)
  }},
  "topics_covered": ["topic1", "topic2"],
  "overall_assessment": "You ...",
  "key_strengths": ["You articulated ..."],
  "areas_for_improvement": ["Next time, consider ..."],
  "recommendation": "strong_yes | yes | maybe | no",
  "reasoning": "You ..."
}}"#,
        role_name = profile.role_name,
        company = profile.company,
        topics = profile.topics,
        resume_summary = profile.resume_summary,
    )
}
