use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::posts::{resolve_limit, ListQuery};
use crate::app::AppState;
use crate::db::models::{parse_object_id, TripPayload, TripResponse};
use crate::db::trip_repository::TripRepository;
use crate::error::AppError;

fn validate(payload: &TripPayload) -> Result<(), AppError> {
    if payload.destination.trim().is_empty() {
        return Err(AppError::BadRequest("Destination cannot be empty".into()));
    }
    Ok(())
}

pub async fn process_create_trip(
    repo: &dyn TripRepository,
    payload: TripPayload,
) -> Result<TripResponse, AppError> {
    validate(&payload)?;
    let trip = repo.insert(payload.into_trip(None)).await?;
    Ok(trip.into())
}

pub async fn process_get_trip(
    repo: &dyn TripRepository,
    raw_id: &str,
) -> Result<TripResponse, AppError> {
    let id = parse_object_id(raw_id, "trip")?;

    repo.find_by_id(id)
        .await?
        .map(TripResponse::from)
        .ok_or_else(|| AppError::NotFound("Trip not found".into()))
}

pub async fn process_replace_trip(
    repo: &dyn TripRepository,
    raw_id: &str,
    payload: TripPayload,
) -> Result<TripResponse, AppError> {
    let id = parse_object_id(raw_id, "trip")?;
    validate(&payload)?;

    let trip = payload.into_trip(Some(id));
    if !repo.replace(id, trip.clone()).await? {
        return Err(AppError::NotFound("Trip not found".into()));
    }

    Ok(trip.into())
}

pub async fn process_delete_trip(repo: &dyn TripRepository, raw_id: &str) -> Result<(), AppError> {
    let id = parse_object_id(raw_id, "trip")?;

    if !repo.delete(id).await? {
        return Err(AppError::NotFound("Trip not found".into()));
    }
    Ok(())
}

pub async fn create_trip_handler(
    State(state): State<AppState>,
    Json(payload): Json<TripPayload>,
) -> Result<(StatusCode, Json<TripResponse>), AppError> {
    let trip = process_create_trip(state.trip_repo.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn list_trips_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let limit = resolve_limit(query.limit)?;
    let trips = state.trip_repo.list(limit).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

pub async fn get_trip_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    Ok(Json(process_get_trip(state.trip_repo.as_ref(), &id).await?))
}

pub async fn replace_trip_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TripPayload>,
) -> Result<Json<TripResponse>, AppError> {
    Ok(Json(
        process_replace_trip(state.trip_repo.as_ref(), &id, payload).await?,
    ))
}

pub async fn delete_trip_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    process_delete_trip(state.trip_repo.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
