use crate::error::{AppError, Result};
use crate::handlers::path_code;
use crate::model::{CreateUrlRequest, UpdateUrlRequest, UrlDetailsResponse, UrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use snip_core::CreateParams;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlResponse>)> {
    let Json(request) = payload?;

    let mapping = state
        .shortener()
        .create(CreateParams {
            long_url: request.long_url,
            custom_code: request.custom_code,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(mapping.into())))
}

pub async fn get_url_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Json<UrlDetailsResponse>> {
    let code = path_code(short_code)?;

    state
        .shortener()
        .read(&code)
        .await?
        .map(|mapping| Json(mapping.into()))
        .ok_or(AppError::NotFound)
}

pub async fn update_url_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
    payload: std::result::Result<Json<UpdateUrlRequest>, JsonRejection>,
) -> Result<Json<UrlResponse>> {
    let code = path_code(short_code)?;
    let Json(request) = payload?;

    state
        .shortener()
        .update(&code, request.long_url)
        .await?
        .map(|mapping| Json(mapping.into()))
        .ok_or(AppError::NotFound)
}

pub async fn delete_url_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<StatusCode> {
    let code = path_code(short_code)?;

    if state.shortener().delete(&code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_urls_handler(State(state): State<AppState>) -> Result<Json<Vec<UrlResponse>>> {
    let mappings = state.shortener().list().await?;
    Ok(Json(mappings.into_iter().map(UrlResponse::from).collect()))
}
