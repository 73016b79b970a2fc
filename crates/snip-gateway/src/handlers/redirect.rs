use crate::error::{AppError, Result};
use crate::handlers::path_code;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Redirect;
use tracing::debug;

/// Resolves a short code and answers with a 307 to the long URL.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Redirect> {
    let code = path_code(short_code)?;
    let mapping = state
        .shortener()
        .read(&code)
        .await?
        .ok_or(AppError::NotFound)?;

    debug!(code = %code, url = %mapping.long_url, "redirecting");
    Ok(Redirect::temporary(mapping.long_url.as_str()))
}
