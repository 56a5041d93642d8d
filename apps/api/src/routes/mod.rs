pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interviewer API
        .route(
            "/api/v1/interviewer",
            post(handlers::handle_interviewer_turn),
        )
        .route(
            "/api/v1/interviewer/prompt",
            post(handlers::handle_generate_prompt),
        )
        .route(
            "/api/v1/interviewer/analysis",
            post(handlers::handle_analyze_interview),
        )
        .with_state(state)
}
