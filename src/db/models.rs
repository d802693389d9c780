use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// GeoJSON geometry type. Only points are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoType {
    Point,
}

/// A GeoJSON point, `coordinates` in `[longitude, latitude]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeoType,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeoType::Point,
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Reject coordinates outside the WGS84 ranges.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_lng_lat(self.longitude(), self.latitude())
    }
}

pub fn validate_lng_lat(longitude: f64, latitude: f64) -> Result<(), AppError> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest(format!(
            "Longitude {longitude} out of range [-180, 180]"
        )));
    }
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::BadRequest(format!(
            "Latitude {latitude} out of range [-90, 90]"
        )));
    }
    Ok(())
}

/// A geotagged post stored in the `posts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub location: GeoPoint,
    #[serde(default)]
    pub description_brief: String,
    #[serde(default)]
    pub description_detail: String,
}

/// Request body for creating or replacing a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub location: GeoPoint,
    #[serde(default)]
    pub description_brief: String,
    #[serde(default)]
    pub description_detail: String,
}

impl PostPayload {
    pub fn into_post(self, id: Option<ObjectId>) -> Post {
        Post {
            id,
            location: self.location,
            description_brief: self.description_brief,
            description_detail: self.description_detail,
        }
    }
}

/// Wire form of a post, with the identifier rendered as hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub location: GeoPoint,
    pub description_brief: String,
    pub description_detail: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            location: post.location,
            description_brief: post.description_brief,
            description_detail: post.description_detail,
        }
    }
}

/// A nearby-search hit, flattened for the mobile client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description_brief: String,
    pub description_detail: String,
}

impl From<Post> for NearbyPlace {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            latitude: post.location.latitude(),
            longitude: post.location.longitude(),
            description_brief: post.description_brief,
            description_detail: post.description_detail,
        }
    }
}

/// A trip stored in the `trips` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub destination: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPayload {
    pub destination: String,
    pub date: String,
}

impl TripPayload {
    pub fn into_trip(self, id: Option<ObjectId>) -> Trip {
        Trip {
            id,
            destination: self.destination,
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripResponse {
    pub id: String,
    pub destination: String,
    pub date: String,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id.map(|id| id.to_hex()).unwrap_or_default(),
            destination: trip.destination,
            date: trip.date,
        }
    }
}

/// Parse a hex identifier, mapping failure to a 400 naming the entity.
pub fn parse_object_id(raw: &str, entity: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {entity} ID")))
}
