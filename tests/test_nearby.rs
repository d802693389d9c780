mod common;

use std::sync::Arc;

use saathi::db::repository::{MongoPostRepository, PostRepository};
use saathi::db::trip_repository::MongoTripRepository;

async fn nearby(
    server: &axum_test::TestServer,
    lat: f64,
    lng: f64,
    radius: f64,
) -> Vec<serde_json::Value> {
    let response = server
        .get("/places/nearby")
        .add_query_param("lat", lat)
        .add_query_param("lng", lng)
        .add_query_param("radius", radius)
        .await;
    response.assert_status_ok();
    response.json()
}

fn ids(places: &[serde_json::Value]) -> Vec<String> {
    places
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn nearby_finds_post_at_query_point() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let created = env
        .create_post(&server, 76.89805, 8.51568, "Shanghumukham Beach", "Sunsets")
        .await;
    let id = created["id"].as_str().unwrap();

    let places = nearby(&server, 8.51568, 76.89805, 10.0).await;
    assert_eq!(ids(&places), vec![id.to_string()]);

    let place = &places[0];
    assert_eq!(place["latitude"], 8.51568);
    assert_eq!(place["longitude"], 76.89805);
    assert_eq!(place["description_brief"], "Shanghumukham Beach");
    assert_eq!(place["description_detail"], "Sunsets");
    assert!(place.get("distance").is_none());
    assert!(place.get("location").is_none());
}

#[tokio::test]
async fn tiny_radius_at_distant_point_excludes_post() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_post(&server, 76.89805, 8.51568, "Shanghumukham Beach", "")
        .await;

    // Kovalam, roughly 15 km away
    let places = nearby(&server, 8.40028, 76.97862, 0.001).await;
    assert!(places.is_empty());
}

#[tokio::test]
async fn results_are_nearest_first() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    // ~2.2 km, ~0 m and ~1.1 km north of the query point
    let far = env.create_post(&server, 76.9, 8.52, "Far", "").await;
    let here = env.create_post(&server, 76.9, 8.50, "Here", "").await;
    let near = env.create_post(&server, 76.9, 8.51, "Near", "").await;

    let places = nearby(&server, 8.50, 76.9, 5000.0).await;
    assert_eq!(
        ids(&places),
        vec![
            here["id"].as_str().unwrap().to_string(),
            near["id"].as_str().unwrap().to_string(),
            far["id"].as_str().unwrap().to_string(),
        ]
    );

    let within = nearby(&server, 8.50, 76.9, 1500.0).await;
    assert_eq!(within.len(), 2);
}

#[tokio::test]
async fn zero_radius_returns_only_exact_matches() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let exact = env.create_post(&server, 76.9, 8.5, "Exact", "").await;
    // ~55 m east
    env.create_post(&server, 76.9005, 8.5, "Neighbour", "").await;

    let places = nearby(&server, 8.5, 76.9, 0.0).await;
    assert_eq!(ids(&places), vec![exact["id"].as_str().unwrap().to_string()]);
}

#[tokio::test]
async fn default_radius_applies_when_omitted() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    // ~1.1 km away: outside the 500 m default
    env.create_post(&server, 76.9, 8.51, "Outside", "").await;
    let inside = env.create_post(&server, 76.9, 8.502, "Inside", "").await;

    let response = server
        .get("/places/nearby")
        .add_query_param("lat", 8.5)
        .add_query_param("lng", 76.9)
        .await;
    let places: Vec<serde_json::Value> = response.json();
    assert_eq!(ids(&places), vec![inside["id"].as_str().unwrap().to_string()]);
}

#[tokio::test]
async fn invalid_query_is_bad_request() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .get("/places/nearby")
        .add_query_param("lat", 95.0)
        .add_query_param("lng", 76.9)
        .await
        .assert_status_bad_request();

    server
        .get("/places/nearby")
        .add_query_param("lat", 8.5)
        .add_query_param("lng", 76.9)
        .add_query_param("radius", -5.0)
        .await
        .assert_status_bad_request();

    // lng missing
    server
        .get("/places/nearby")
        .add_query_param("lat", 8.5)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn missing_geo_index_is_generic_server_error() {
    let env = common::TestEnv::start().await;

    // Same server, different database: no 2dsphere index there
    let unindexed_db = env
        .db
        .client()
        .database(&format!("saathi_unindexed_{}", uuid::Uuid::new_v4().simple()));
    let post_repo: Arc<dyn PostRepository> = Arc::new(MongoPostRepository::new(&unindexed_db));
    post_repo
        .insert(saathi::db::models::Post {
            id: None,
            location: saathi::db::models::GeoPoint::new(76.9, 8.5),
            description_brief: "Unindexed".to_string(),
            description_detail: String::new(),
        })
        .await
        .unwrap();

    let state = common::app_state(
        post_repo,
        Arc::new(MongoTripRepository::new(&unindexed_db)),
        env.engine.clone(),
    );
    let server = axum_test::TestServer::builder()
        .try_build(saathi::app::router(state))
        .expect("Failed to build TestServer");

    let response = server
        .get("/places/nearby")
        .add_query_param("lat", 8.5)
        .add_query_param("lng", 76.9)
        .await;
    response.assert_status_internal_server_error();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Failed to query nearby places");
}
