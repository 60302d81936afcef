pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tailoring::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/templates", get(handlers::handle_list_templates))
        .route("/tailor", post(handlers::handle_tailor))
        .route("/export/latex", post(handlers::handle_export_latex))
        .route("/export/pdf", post(handlers::handle_export_pdf))
        .with_state(state)
}
