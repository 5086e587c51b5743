use crate::{
    AppState,
    errors::AppError,
    models::{CreateMeme, UpdateMeme},
    query,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

/// Handler for GET /memes
pub async fn list_memes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("Listing all memes via handler");
    let memes = state.meme_repo.list_all().await?;
    tracing::info!("Handler successfully retrieved {} memes", memes.len());
    Ok(Json(memes))
}

/// Handler for GET /memes/archive: the front-page grouping, year then
/// month descending.
pub async fn archive_memes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("Building year/month archive via handler");
    let memes = state.meme_repo.list_all().await?;
    Ok(Json(query::group_by_bucket(&memes)))
}

/// Handler for GET /memes/{id}
pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let meme_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%meme_id, "Fetching meme details via handler");
    let maybe_meme = state.meme_repo.get_by_id(meme_id).await?;
    match maybe_meme {
        Some(meme) => Ok(Json(meme)),
        None => Err(AppError::MemeNotFound(meme_id)),
    }
}

/// Handler for POST /memes. The title is the only required field; the
/// store fills defaults for everything else.
pub async fn create_meme(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<CreateMeme>,
) -> Result<impl IntoResponse, AppError> {
    if draft.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }

    let meme = state.meme_repo.create(draft).await?;
    tracing::info!(meme_id = %meme.id, title = %meme.title, "Meme created successfully via handler");
    Ok((StatusCode::CREATED, Json(meme)))
}

/// Handler for PUT /memes/{id}. Accepts partial fields plus the
/// editor/changes metadata for the appended audit entry.
pub async fn update_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(update): Json<UpdateMeme>,
) -> Result<impl IntoResponse, AppError> {
    let meme_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%meme_id, "Updating meme via handler");
    match state.meme_repo.update(meme_id, update).await? {
        Some(meme) => {
            tracing::info!(%meme_id, "Meme updated successfully via handler");
            Ok(Json(meme))
        }
        None => Err(AppError::MemeNotFound(meme_id)),
    }
}

/// Handler for DELETE /memes/{id}. Removal is permanent; deleting an
/// unknown id is a 404, not an error.
pub async fn delete_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let meme_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%meme_id, "Deleting meme via handler");
    if !state.meme_repo.delete(meme_id).await? {
        return Err(AppError::MemeNotFound(meme_id));
    }
    tracing::info!(%meme_id, "Meme deleted successfully via handler");
    Ok(Json(serde_json::json!({ "message": "meme deleted" })))
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Handler for GET /memes/search?q=...
pub async fn search_memes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let search_query = params.q.unwrap_or_default();
    if search_query.trim().is_empty() {
        return Err(AppError::InvalidInput("query required".to_string()));
    }

    tracing::debug!(query = %search_query, "Searching memes via handler");
    let memes = state.meme_repo.search(&search_query).await?;
    tracing::info!(query = %search_query, "Search matched {} memes", memes.len());
    Ok(Json(memes))
}
