pub mod app;
pub mod config;
pub mod error;
pub mod seeder;
pub mod db {
    #[cfg(test)]
    pub mod memory;
    pub mod models;
    pub mod repository;
    pub mod trip_repository;
}
pub mod speech {
    pub mod engine;
    pub mod pool;
    pub mod text;
    pub mod wav;
}
pub mod api {
    pub mod errors;
    pub mod nearby;
    pub mod posts;
    pub mod trips;
    pub mod tts;
}
