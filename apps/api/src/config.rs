use anyhow::{Context, Result};

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub chat_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Session length cap applied when the request does not carry its own.
    /// `None` (or 0) disables the timeout guard.
    pub max_interview_duration_sec: Option<u64>,
    /// Number of most-recent history turns forwarded to the model.
    pub history_window: usize,
    pub llm_timeout_secs: u64,
    /// Total attempts per gateway call. 1 means no retry.
    pub llm_max_attempts: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            groq_base_url: std::env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            chat_model: std::env::var("GROQ_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_interview_duration_sec: optional_env("MAX_INTERVIEW_DURATION_SEC")?
                .filter(|&max| max > 0),
            history_window: parse_env("INTERVIEW_HISTORY_WINDOW", DEFAULT_HISTORY_WINDOW)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            llm_max_attempts: parse_env::<u32>("LLM_MAX_ATTEMPTS", 1)?.clamp(1, 5),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 60)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(optional_env(key)?.unwrap_or(default))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        _ => Ok(None),
    }
}

#[cfg(test)]
impl Config {
    /// Config used by unit tests; never touches the process environment.
    pub fn for_tests() -> Self {
        Config {
            groq_api_key: "test-key".to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            port: 8000,
            rust_log: "debug".to_string(),
            max_interview_duration_sec: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            llm_timeout_secs: 30,
            llm_max_attempts: 1,
            request_timeout_secs: 60,
        }
    }
}
