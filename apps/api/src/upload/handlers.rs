//! Axum route handlers for the résumé upload form.

use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::SignedCookieJar;
use reqwest::Url;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::flash;
use crate::questions::generator::{GenerationError, GenerationRequest, QUESTIONS_SUFFIX};
use crate::state::AppState;
use crate::upload::validation::{save_upload, validate, UploadError, UploadForm, UploadRecord};
use crate::views::UploadPage;

const UPLOAD_PAGE: &str = "/upload_cv";

/// Everything that can send the user back to the upload form.
#[derive(Debug, Error)]
enum UploadFlowError {
    #[error(transparent)]
    Rejected(#[from] UploadError),

    #[error("Could not save the uploaded file")]
    Save(#[source] std::io::Error),

    #[error("Error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Something went wrong while generating the interview questions")]
    QuestionsMissing,
}

/// GET /upload_cv
pub async fn handle_upload_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let (jar, flashes) = flash::take(jar);
    let page = UploadPage::new(flashes, state.config.max_upload_bytes);
    Ok((jar, Html(page.render()?)))
}

/// POST /upload_cv
///
/// Validates and stores the résumé, runs the question generator, then sends
/// the user to the interview page. Failures are flashed on the form.
pub async fn handle_upload(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> (SignedCookieJar, Redirect) {
    match upload_and_generate(&state, multipart).await {
        Ok((record, questions_file)) => {
            let jar = flash::success(
                jar,
                format!(
                    "Generated interview questions for {} - {}",
                    record.job_title, record.level
                ),
            );
            (jar, Redirect::to(&interview_location(&questions_file)))
        }
        Err(e) => {
            match &e {
                UploadFlowError::Rejected(reason) => info!("Upload rejected: {reason}"),
                UploadFlowError::Save(source) => error!("Failed to store upload: {source}"),
                UploadFlowError::Generation(source) => error!("Question generation failed: {source}"),
                UploadFlowError::QuestionsMissing => {
                    warn!("Generator finished but no question file was found")
                }
            }
            (flash::error(jar, e.to_string()), Redirect::to(UPLOAD_PAGE))
        }
    }
}

async fn upload_and_generate(
    state: &AppState,
    multipart: Multipart,
) -> Result<(UploadRecord, String), UploadFlowError> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let upload = validate(form)?;

    let record = save_upload(&state.config.upload_dir, upload)
        .await
        .map_err(UploadFlowError::Save)?;
    info!(
        "Stored upload {} for {} - {}",
        record.stored_filename, record.job_title, record.level
    );

    let request = GenerationRequest {
        upload: record.clone(),
        output_dir: state.questions.root().to_path_buf(),
    };
    let generated = state.generator.generate(&request).await?;

    if state.questions.exists(&generated.file_name) {
        return Ok((record, generated.file_name));
    }

    // Tolerate generators that name the file differently but keep the upload id.
    let fallback = match state
        .questions
        .find_by_prefix(&record.id.to_string(), QUESTIONS_SUFFIX)
        .await
    {
        Ok(found) => found,
        Err(e) => {
            warn!("Could not search question files for upload {}: {e}", record.id);
            None
        }
    };
    match fallback {
        Some(name) => {
            warn!(
                "Generator reported {} but wrote {name}",
                generated.file_name
            );
            Ok((record, name))
        }
        None => Err(UploadFlowError::QuestionsMissing),
    }
}

/// Collects the `cv_file`, `job_title` and `level` fields.
async fn read_form(mut multipart: Multipart, limit: usize) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        match field.name() {
            Some("cv_file") => {
                form.file_name = Some(field.file_name().unwrap_or_default().to_string());
                form.data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
            }
            Some("job_title") => {
                form.job_title = field.text().await.map_err(|e| multipart_error(e, limit))?;
            }
            Some("level") => {
                form.level = field.text().await.map_err(|e| multipart_error(e, limit))?;
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError, limit: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge {
            limit_mib: limit / (1024 * 1024),
        }
    } else {
        UploadError::Multipart(err.body_text())
    }
}

/// `/interview?questions_file=<name>` with the name query-encoded.
pub fn interview_location(questions_file: &str) -> String {
    match Url::parse_with_params(
        "http://localhost/interview",
        &[("questions_file", questions_file)],
    ) {
        Ok(url) => format!("/interview?{}", url.query().unwrap_or_default()),
        Err(_) => "/interview".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interview_location_encodes_name() {
        assert_eq!(
            interview_location("abc_cv.questions.json"),
            "/interview?questions_file=abc_cv.questions.json"
        );
        assert_eq!(
            interview_location("my cv&x.json"),
            "/interview?questions_file=my+cv%26x.json"
        );
    }
}
