//! Axum route handler for interview submission.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Local;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::evaluation::transcript::{results_file_name, SubmitInterviewRequest, Transcript};
use crate::flash;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitInterviewResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_file: Option<String>,
}

/// POST /submit_interview
///
/// Persists the transcript, then runs the evaluator over it. An evaluation
/// failure is reported in the body; the transcript stays on disk either way.
pub async fn handle_submit_interview(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<SubmitInterviewRequest>,
) -> Result<(SignedCookieJar, Json<SubmitInterviewResponse>), AppError> {
    let now = Local::now();
    let transcript = Transcript::from_request(request, now);

    let transcript_file = state
        .transcripts
        .write_new(&transcript.file_base(now), &transcript)
        .await?;
    let transcript_path = state.transcripts.root().join(&transcript_file);
    info!(
        "Saved transcript {transcript_file} with {} responses",
        transcript.response_count()
    );

    match state.evaluator.evaluate(&transcript_path).await {
        Ok(outcome) => {
            info!("Evaluation written to {}", outcome.results_file);
            let jar = flash::success(jar, "Interview completed and evaluated");
            Ok((
                jar,
                Json(SubmitInterviewResponse {
                    success: true,
                    message: "Interview completed".to_string(),
                    results_file: Some(results_file_name(&transcript_file)),
                }),
            ))
        }
        Err(e) => {
            error!("Evaluation of {transcript_file} failed: {e}");
            let jar = flash::error(jar, format!("Evaluation failed: {e}"));
            Ok((
                jar,
                Json(SubmitInterviewResponse {
                    success: false,
                    message: e.to_string(),
                    results_file: None,
                }),
            ))
        }
    }
}
