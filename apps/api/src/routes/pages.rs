use askama::Template;
use axum::response::Html;
use axum_extra::extract::cookie::SignedCookieJar;

use crate::errors::AppError;
use crate::flash;
use crate::views::IndexPage;

/// GET /
pub async fn index_handler(
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(IndexPage { flashes }.render()?)))
}
