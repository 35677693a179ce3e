use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::config::Config;
use crate::evaluation::evaluator::InterviewEvaluator;
use crate::files::JsonDir;
use crate::questions::generator::QuestionGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Generated question sets (`*.questions.json`).
    pub questions: JsonDir,
    /// Submitted interview transcripts.
    pub transcripts: JsonDir,
    /// Evaluation results produced from transcripts.
    pub results: JsonDir,
    pub generator: Arc<dyn QuestionGenerator>,
    pub evaluator: Arc<dyn InterviewEvaluator>,
    /// Signs the flash cookie.
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: Config,
        generator: Arc<dyn QuestionGenerator>,
        evaluator: Arc<dyn InterviewEvaluator>,
        cookie_key: Key,
    ) -> Self {
        Self {
            questions: JsonDir::new(&config.questions_dir),
            transcripts: JsonDir::new(&config.interview_logs_dir),
            results: JsonDir::new(&config.results_dir),
            config,
            generator,
            evaluator,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
