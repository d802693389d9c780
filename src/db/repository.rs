use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::models::Post;
use crate::error::AppError;

/// Repository trait for post operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create the indexes the queries rely on (the `2dsphere` index on `location`).
    async fn ensure_indexes(&self) -> Result<(), AppError>;

    /// Insert a new post and return it with its generated id.
    async fn insert(&self, post: Post) -> Result<Post, AppError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, AppError>;

    /// Find the first post with the given brief description.
    async fn find_by_brief(&self, brief: &str) -> Result<Option<Post>, AppError>;

    /// List up to `limit` posts in natural order.
    async fn list(&self, limit: i64) -> Result<Vec<Post>, AppError>;

    /// Replace the post stored under `id`. Returns `false` if no such post exists.
    async fn replace(&self, id: ObjectId, post: Post) -> Result<bool, AppError>;

    /// Delete a post. Returns `false` if no such post exists.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;

    /// All posts within `radius_m` metres of the point, nearest first.
    async fn find_nearby(
        &self,
        longitude: f64,
        latitude: f64,
        radius_m: f64,
    ) -> Result<Vec<Post>, AppError>;
}

/// MongoDB implementation of the PostRepository.
pub struct MongoPostRepository {
    collection: mongodb::Collection<Post>,
}

impl MongoPostRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("posts"),
        }
    }
}

/// Drain a cursor into a vector, mapping driver errors.
pub(crate) async fn collect_cursor<T>(
    mut cursor: mongodb::Cursor<T>,
) -> Result<Vec<T>, AppError>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    use futures::TryStreamExt;

    let mut items = Vec::new();
    while let Some(item) = cursor
        .try_next()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    {
        items.push(item);
    }

    Ok(items)
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        let index = IndexModel::builder()
            .keys(doc! { "location": "2dsphere" })
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn insert(&self, mut post: Post) -> Result<Post, AppError> {
        post.id = None;

        let result = self
            .collection
            .insert_one(&post)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::Database(format!(
                "Unexpected inserted id type: {}",
                result.inserted_id
            ))
        })?;

        post.id = Some(id);
        Ok(post)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_brief(&self, brief: &str) -> Result<Option<Post>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "description_brief": brief })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list(&self, limit: i64) -> Result<Vec<Post>, AppError> {
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

    async fn replace(&self, id: ObjectId, mut post: Post) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        // The replacement must not carry a different _id.
        post.id = Some(id);

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &post)
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

    async fn find_nearby(
        &self,
        longitude: f64,
        latitude: f64,
        radius_m: f64,
    ) -> Result<Vec<Post>, AppError> {
        use mongodb::bson::doc;

        // $near sorts by distance; GeoJSON order is [lng, lat]
        let filter = doc! {
            "location": {
                "$near": {
                    "$geometry": {
                        "type": "Point",
                        "coordinates": [longitude, latitude],
                    },
                    "$maxDistance": radius_m,
                }
            }
        };

        let cursor = self
            .collection
            .find(filter)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        collect_cursor(cursor).await
    }
}
