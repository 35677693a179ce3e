pub mod health;
pub mod pages;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::questions::handlers as questions;
use crate::results::handlers as results;
use crate::state::AppState;
use crate::upload::handlers as upload;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(pages::index_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/upload_cv",
            get(upload::handle_upload_form).post(upload::handle_upload),
        )
        .route("/interview", get(questions::handle_interview))
        .route("/submit_interview", post(evaluation::handle_submit_interview))
        .route("/results", get(results::handle_results))
        .route("/view_result/:filename", get(results::handle_view_result))
        .route("/download/*filename", get(results::handle_download))
        .route("/api/questions/:filename", get(questions::handle_get_questions))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
