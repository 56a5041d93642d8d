use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds nothing mutable: every interview session lives entirely in the request.
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion backend. `LlmClient` in production, a scripted fake in tests.
    pub gateway: Arc<dyn ModelGateway>,
    pub config: Config,
}
