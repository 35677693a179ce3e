//! Axum route handlers for question sets.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::files::StoreError;
use crate::flash;
use crate::state::AppState;
use crate::views::InterviewPage;

#[derive(Debug, Deserialize)]
pub struct InterviewQuery {
    pub questions_file: Option<String>,
}

/// GET /interview?questions_file=<name>
///
/// Renders the interview page for a stored question set. Any problem sends
/// the user home with a message instead of an error page.
pub async fn handle_interview(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<InterviewQuery>,
) -> Result<Response, AppError> {
    let Some(questions_file) = query.questions_file.filter(|f| !f.is_empty()) else {
        let jar = flash::error(jar, "No questions file specified");
        return Ok((jar, Redirect::to("/")).into_response());
    };

    let questions = match state.questions.read(&questions_file).await {
        Ok(questions) => questions,
        Err(StoreError::NotFound(_)) => {
            let jar = flash::error(jar, "Questions file not found");
            return Ok((jar, Redirect::to("/")).into_response());
        }
        Err(StoreError::InvalidJson { source, .. }) => {
            warn!("Question file {questions_file} is not valid JSON: {source}");
            let jar = flash::error(jar, "Questions file is invalid");
            return Ok((jar, Redirect::to("/")).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let (jar, flashes) = flash::take(jar);
    let page = InterviewPage::new(flashes, questions_file, &questions);
    Ok((jar, Html(page.render()?)).into_response())
}

/// GET /api/questions/:filename
///
/// Raw JSON of a question file. 404 when missing, 400 when malformed.
pub async fn handle_get_questions(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, AppError> {
    let questions = state.questions.read(&filename).await?;
    Ok(Json(questions))
}
