use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{nearby, posts, trips, tts};
use crate::db::repository::PostRepository;
use crate::db::trip_repository::TripRepository;
use crate::speech::pool::SynthesisPool;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub post_repo: Arc<dyn PostRepository>,
    pub trip_repo: Arc<dyn TripRepository>,
    pub synthesizer: SynthesisPool,
    /// Nearby-search radius in metres when the request gives none.
    pub default_radius: f64,
    /// Sentences per chunk for streamed synthesis when the request gives none.
    pub default_batch_size: usize,
}

/// Axum handler for `GET /`.
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Saathi API is running!" }))
}

/// Build the full HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route(
            "/posts",
            get(posts::list_posts_handler).post(posts::create_post_handler),
        )
        .route(
            "/posts/{id}",
            get(posts::get_post_handler)
                .put(posts::replace_post_handler)
                .delete(posts::delete_post_handler),
        )
        .route(
            "/trips",
            get(trips::list_trips_handler).post(trips::create_trip_handler),
        )
        .route(
            "/trips/{id}",
            get(trips::get_trip_handler)
                .put(trips::replace_trip_handler)
                .delete(trips::delete_trip_handler),
        )
        .route("/places/nearby", get(nearby::nearby_handler))
        .route("/tts/post/{post_id}", get(tts::tts_post_handler))
        .route(
            "/tts/post/{post_id}/stream",
            get(tts::tts_post_stream_handler),
        )
        .route("/tts/speak", get(tts::tts_speak_handler))
        // The mobile client is served from arbitrary origins
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
