use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::db::models::{validate_lng_lat, NearbyPlace};
use crate::db::repository::PostRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    /// Search radius in metres.
    pub radius: Option<f64>,
}

/// Posts within `radius` metres of the query point, nearest first.
///
/// Store failures are logged and reported without their detail.
pub async fn process_nearby(
    repo: &dyn PostRepository,
    query: NearbyQuery,
    default_radius: f64,
) -> Result<Vec<NearbyPlace>, AppError> {
    validate_lng_lat(query.lng, query.lat)?;

    let radius = query.radius.unwrap_or(default_radius);
    if !radius.is_finite() || radius < 0.0 {
        return Err(AppError::BadRequest(
            "radius must be a non-negative number of metres".into(),
        ));
    }

    let posts = repo
        .find_nearby(query.lng, query.lat, radius)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                lat = query.lat,
                lng = query.lng,
                radius,
                "Nearby query failed"
            );
            AppError::Internal("Failed to query nearby places".into())
        })?;

    Ok(posts.into_iter().map(NearbyPlace::from).collect())
}

/// Axum handler for `GET /places/nearby`.
pub async fn nearby_handler(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyPlace>>, AppError> {
    let places = process_nearby(state.post_repo.as_ref(), query, state.default_radius).await?;
    Ok(Json(places))
}
