//! In-memory repositories for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::models::{Post, Trip};
use crate::db::repository::PostRepository;
use crate::db::trip_repository::TripRepository;
use crate::error::AppError;

const EARTH_RADIUS_M: f64 = 6_371_008.8;

fn distance_m(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lng1, lat1) = (a[0].to_radians(), a[1].to_radians());
    let (lng2, lat2) = (b[0].to_radians(), b[1].to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lng2 - lng1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[derive(Default)]
pub struct MockPostRepo {
    pub posts: Mutex<Vec<Post>>,
    /// When set, `find_nearby` fails with this message (a missing geo index).
    pub nearby_error: Option<String>,
}

impl MockPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_nearby(message: &str) -> Self {
        Self {
            posts: Mutex::new(vec![]),
            nearby_error: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl PostRepository for MockPostRepo {
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert(&self, mut post: Post) -> Result<Post, AppError> {
        post.id = Some(ObjectId::new());
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .cloned())
    }

    async fn find_by_brief(&self, brief: &str) -> Result<Option<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.description_brief == brief)
            .cloned())
    }

    async fn list(&self, limit: i64) -> Result<Vec<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn replace(&self, id: ObjectId, mut post: Post) -> Result<bool, AppError> {
        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == Some(id)) {
            Some(existing) => {
                post.id = Some(id);
                *existing = post;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != Some(id));
        Ok(posts.len() < before)
    }

    async fn find_nearby(
        &self,
        longitude: f64,
        latitude: f64,
        radius_m: f64,
    ) -> Result<Vec<Post>, AppError> {
        if let Some(message) = &self.nearby_error {
            return Err(AppError::Database(message.clone()));
        }

        let origin = [longitude, latitude];
        let mut hits: Vec<(f64, Post)> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .map(|p| (distance_m(origin, p.location.coordinates), p.clone()))
            .filter(|(d, _)| *d <= radius_m)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(hits.into_iter().map(|(_, p)| p).collect())
    }
}

#[derive(Default)]
pub struct MockTripRepo {
    pub trips: Mutex<Vec<Trip>>,
}

#[async_trait]
impl TripRepository for MockTripRepo {
    async fn insert(&self, mut trip: Trip) -> Result<Trip, AppError> {
        trip.id = Some(ObjectId::new());
        self.trips.lock().unwrap().push(trip.clone());
        Ok(trip)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Trip>, AppError> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == Some(id))
            .cloned())
    }

    async fn list(&self, limit: i64) -> Result<Vec<Trip>, AppError> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn replace(&self, id: ObjectId, mut trip: Trip) -> Result<bool, AppError> {
        let mut trips = self.trips.lock().unwrap();
        match trips.iter_mut().find(|t| t.id == Some(id)) {
            Some(existing) => {
                trip.id = Some(id);
                *existing = trip;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut trips = self.trips.lock().unwrap();
        let before = trips.len();
        trips.retain(|t| t.id != Some(id));
        Ok(trips.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_known_pair() {
        // Roughly 1.1 km per 0.01 degree of latitude
        let d = distance_m([76.9, 8.50], [76.9, 8.51]);
        assert!((d - 1112.0).abs() < 5.0, "distance was {d}");
        assert_eq!(distance_m([76.9, 8.5], [76.9, 8.5]), 0.0);
    }
}
