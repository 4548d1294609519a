pub mod health;
pub mod summarize;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/summarize", post(summarize::summarize))
        .route("/summarize", post(summarize::summarize))
        .with_state(state)
}
