use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::models::Trip;
use crate::db::repository::collect_cursor;
use crate::error::AppError;

/// Repository trait for trips.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Insert a new trip and return it with its generated id.
    async fn insert(&self, trip: Trip) -> Result<Trip, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Trip>, AppError>;

    async fn list(&self, limit: i64) -> Result<Vec<Trip>, AppError>;

    /// Replace the trip stored under `id`. Returns `false` if no such trip exists.
    async fn replace(&self, id: ObjectId, trip: Trip) -> Result<bool, AppError>;

    /// Delete a trip. Returns `false` if no such trip exists.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
}

/// MongoDB implementation of the TripRepository.
pub struct MongoTripRepository {
    collection: mongodb::Collection<Trip>,
}

impl MongoTripRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("trips"),
        }
    }
}

#[async_trait]
impl TripRepository for MongoTripRepository {
    async fn insert(&self, mut trip: Trip) -> Result<Trip, AppError> {
        trip.id = None;

        let result = self
            .collection
            .insert_one(&trip)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        trip.id = result.inserted_id.as_object_id();
        Ok(trip)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Trip>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list(&self, limit: i64) -> Result<Vec<Trip>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().limit(limit).build();

        let cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        collect_cursor(cursor).await
    }

    async fn replace(&self, id: ObjectId, mut trip: Trip) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        trip.id = Some(id);

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &trip)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}
