//! Event model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Event together with its current registration count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub max_capacity: i32,
    pub user_id: Uuid,
    pub attendees_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New event creation payload
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub max_capacity: i32,
    pub user_id: Uuid,
}

/// Request body for creating or replacing an event
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub max_capacity: i32,
}

impl EventRequest {
    /// Attach an owner, producing a creation payload
    pub fn into_new_event(self, user_id: Uuid) -> NewEvent {
        NewEvent {
            title: self.title,
            description: self.description,
            location: self.location,
            date_time: self.date_time,
            max_capacity: self.max_capacity,
            user_id,
        }
    }
}
