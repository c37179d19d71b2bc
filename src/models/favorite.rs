use super::{ServiceId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-to-service bookmark as stored by the backend
///
/// At most one row exists per (user_id, service_id); the backend enforces it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Favorite {
    pub id: String,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub created_at: DateTime<Utc>,
}

/// Projection returned by `select service_id from favorites`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FavoriteRow {
    pub service_id: ServiceId,
}

/// Body sent when inserting a favorite
#[derive(Debug, Serialize)]
pub struct NewFavorite<'a> {
    pub user_id: &'a UserId,
    pub service_id: &'a ServiceId,
}
