pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::quiz::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/quiz/start", post(handlers::handle_start_quiz))
        .route("/api/quiz/next", post(handlers::handle_next_question))
        .with_state(state)
}
