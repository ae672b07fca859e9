pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/analyze", post(generation::handle_analyze))
        .route("/api/export-json", post(generation::handle_export_json))
        .route("/api/generate-pdf", post(render::handle_generate_pdf))
        .with_state(state)
}
