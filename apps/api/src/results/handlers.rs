//! Axum route handlers for browsing evaluation results.

use askama::Template;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::errors::AppError;
use crate::files::StoreError;
use crate::flash;
use crate::state::AppState;
use crate::views::{ResultPage, ResultsPage};

const RESULTS_PAGE: &str = "/results";

/// GET /results
pub async fn handle_results(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let results_files = state.results.list_json().await?;
    let (jar, flashes) = flash::take(jar);
    let page = ResultsPage {
        flashes,
        results_files,
    };
    Ok((jar, Html(page.render()?)))
}

/// GET /view_result/:filename
pub async fn handle_view_result(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let result = match state.results.read(&filename).await {
        Ok(result) => result,
        Err(StoreError::NotFound(_)) => {
            let jar = flash::error(jar, "Result file not found");
            return Ok((jar, Redirect::to(RESULTS_PAGE)).into_response());
        }
        Err(StoreError::InvalidJson { source, .. }) => {
            warn!("Result file {filename} is not valid JSON: {source}");
            let jar = flash::error(jar, "Result file is invalid");
            return Ok((jar, Redirect::to(RESULTS_PAGE)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let (jar, flashes) = flash::take(jar);
    let page = ResultPage::new(flashes, filename, &result);
    Ok((jar, Html(page.render()?)).into_response())
}

/// GET /download/*filename
///
/// Streams a file from the results directory as an attachment.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let relative = filename.trim_start_matches('/');
    let (file, len) = state.results.open(relative).await?;

    let base_name = relative.rsplit('/').next().unwrap_or(relative);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        base_name.replace(['"', '\\', '\r', '\n'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(base_name).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

fn content_type_for(filename: &str) -> &'static str {
    match filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => "application/json",
        Some("txt") | Some("log") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a_results.json"), "application/json");
        assert_eq!(content_type_for("REPORT.PDF"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
