mod config;
mod errors;
mod evaluation;
mod files;
mod flash;
mod llm_client;
mod questions;
mod results;
mod routes;
mod state;
mod upload;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{init_data_dirs, Config};
use crate::evaluation::evaluator::LlmInterviewEvaluator;
use crate::files::JsonDir;
use crate::llm_client::LlmClient;
use crate::questions::generator::LlmQuestionGenerator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails on missing required env vars
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interviewer v{}", env!("CARGO_PKG_VERSION"));

    init_data_dirs(&config).await?;
    info!(
        "Data directories ready (uploads: {}, questions: {}, transcripts: {}, results: {})",
        config.upload_dir.display(),
        config.questions_dir.display(),
        config.interview_logs_dir.display(),
        config.results_dir.display()
    );

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let generator = Arc::new(LlmQuestionGenerator::new(llm.clone()));
    let evaluator = Arc::new(LlmInterviewEvaluator::new(
        llm,
        JsonDir::new(&config.results_dir),
    ));
    let cookie_key = flash::signing_key(config.secret_key.as_deref());

    let state = AppState::new(config.clone(), generator, evaluator, cookie_key);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
