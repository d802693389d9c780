#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use saathi::app::{router, AppState};
use saathi::db::repository::{MongoPostRepository, PostRepository};
use saathi::db::trip_repository::{MongoTripRepository, TripRepository};
use saathi::error::AppError;
use saathi::speech::engine::{SpeechEngine, SynthesizedAudio};
use saathi::speech::pool::SynthesisPool;

pub const SAMPLE_RATE: u32 = 16000;

/// Deterministic engine: one sample per byte of text, so output can be
/// predicted exactly from the input.
#[derive(Default)]
pub struct EchoEngine {
    pub calls: Mutex<Vec<String>>,
    fail: bool,
}

impl EchoEngine {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn echo_audio(text: &str) -> SynthesizedAudio {
    SynthesizedAudio {
        sample_rate: SAMPLE_RATE,
        channels: 1,
        samples: text.bytes().map(i16::from).collect(),
    }
}

impl SpeechEngine for EchoEngine {
    fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, AppError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(AppError::Synthesis("voice 'en' not installed".into()));
        }
        Ok(echo_audio(text))
    }
}

/// Holds a running MongoDB container and the router wired to it.
///
/// The container is stopped when this struct is dropped.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub db: mongodb::Database,
    pub router: Router,
    pub post_repo: Arc<dyn PostRepository>,
    pub trip_repo: Arc<dyn TripRepository>,
    pub engine: Arc<EchoEngine>,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::start_with_engine(EchoEngine::default()).await
    }

    /// Spin up MongoDB and build a router using the given speech engine.
    pub async fn start_with_engine(engine: EchoEngine) -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = mongo_client.database("saathi_test");

        let post_repo: Arc<dyn PostRepository> = Arc::new(MongoPostRepository::new(&db));
        post_repo
            .ensure_indexes()
            .await
            .expect("Failed to create geospatial index");
        let trip_repo: Arc<dyn TripRepository> = Arc::new(MongoTripRepository::new(&db));

        let engine = Arc::new(engine);
        let router = router(app_state(post_repo.clone(), trip_repo.clone(), engine.clone()));

        Self {
            _mongo: mongo_container,
            db,
            router,
            post_repo,
            trip_repo,
            engine,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Helper: create a post via the API and return the response body.
    pub async fn create_post(
        &self,
        server: &axum_test::TestServer,
        longitude: f64,
        latitude: f64,
        brief: &str,
        detail: &str,
    ) -> serde_json::Value {
        let response = server
            .post("/posts")
            .json(&serde_json::json!({
                "location": { "type": "Point", "coordinates": [longitude, latitude] },
                "description_brief": brief,
                "description_detail": detail
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

pub fn app_state(
    post_repo: Arc<dyn PostRepository>,
    trip_repo: Arc<dyn TripRepository>,
    engine: Arc<EchoEngine>,
) -> AppState {
    AppState {
        post_repo,
        trip_repo,
        synthesizer: SynthesisPool::new(engine, 4),
        default_radius: 500.0,
        default_batch_size: 2,
    }
}
