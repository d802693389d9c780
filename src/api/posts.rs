use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::db::models::{parse_object_id, PostPayload, PostResponse};
use crate::db::repository::PostRepository;
use crate::error::AppError;

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 1000;

/// Query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// Resolve a requested list size: default 100, capped at 1000.
pub fn resolve_limit(limit: Option<i64>) -> Result<i64, AppError> {
    match limit {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(n) if n < 1 => Err(AppError::BadRequest("limit must be at least 1".into())),
        Some(n) => Ok(n.min(MAX_LIST_LIMIT)),
    }
}

pub async fn process_create_post(
    repo: &dyn PostRepository,
    payload: PostPayload,
) -> Result<PostResponse, AppError> {
    payload.location.validate()?;

    let post = repo.insert(payload.into_post(None)).await?;
    tracing::info!(id = ?post.id, "Post created");

    Ok(post.into())
}

pub async fn process_get_post(
    repo: &dyn PostRepository,
    raw_id: &str,
) -> Result<PostResponse, AppError> {
    let id = parse_object_id(raw_id, "post")?;

    repo.find_by_id(id)
        .await?
        .map(PostResponse::from)
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

pub async fn process_list_posts(
    repo: &dyn PostRepository,
    limit: Option<i64>,
) -> Result<Vec<PostResponse>, AppError> {
    let limit = resolve_limit(limit)?;
    let posts = repo.list(limit).await?;
    Ok(posts.into_iter().map(PostResponse::from).collect())
}

/// Replace a post wholesale. Never creates a missing post.
pub async fn process_replace_post(
    repo: &dyn PostRepository,
    raw_id: &str,
    payload: PostPayload,
) -> Result<PostResponse, AppError> {
    let id = parse_object_id(raw_id, "post")?;
    payload.location.validate()?;

    let post = payload.into_post(Some(id));
    if !repo.replace(id, post.clone()).await? {
        return Err(AppError::NotFound("Post not found".into()));
    }

    Ok(post.into())
}

pub async fn process_delete_post(repo: &dyn PostRepository, raw_id: &str) -> Result<(), AppError> {
    let id = parse_object_id(raw_id, "post")?;

    if !repo.delete(id).await? {
        return Err(AppError::NotFound("Post not found".into()));
    }

    tracing::info!(%id, "Post deleted");
    Ok(())
}

/// Axum handler for `POST /posts`.
pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let response = process_create_post(state.post_repo.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Axum handler for `GET /posts`.
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = process_list_posts(state.post_repo.as_ref(), query.limit).await?;
    Ok(Json(posts))
}

/// Axum handler for `GET /posts/{id}`.
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let post = process_get_post(state.post_repo.as_ref(), &id).await?;
    Ok(Json(post))
}

/// Axum handler for `PUT /posts/{id}`.
pub async fn replace_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<PostResponse>, AppError> {
    let post = process_replace_post(state.post_repo.as_ref(), &id, payload).await?;
    Ok(Json(post))
}

/// Axum handler for `DELETE /posts/{id}`.
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    process_delete_post(state.post_repo.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
