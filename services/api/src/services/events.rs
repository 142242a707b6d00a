//! Event management with ownership checks

use common::error::DatabaseError;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    models::{EventRequest, EventView, Page, PageQuery},
    repositories::{EventRepository, UserRepository},
    validation::validate_event,
};

/// Page size used when an event listing does not ask for one
pub const DEFAULT_EVENT_PAGE_SIZE: i64 = 100;

/// Errors raised by the event use case
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Event not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("You are not allowed to modify this event")]
    Unauthorized,

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Creates, reads, updates and deletes events
#[derive(Clone)]
pub struct EventService<E, U> {
    events: E,
    users: U,
}

fn check_request(request: &EventRequest) -> Result<(), EventError> {
    validate_event(request).map_err(EventError::Validation)?;

    if request.max_capacity < 1 {
        return Err(EventError::Validation(
            "Max capacity must be at least 1".to_string(),
        ));
    }

    Ok(())
}

impl<E: EventRepository, U: UserRepository> EventService<E, U> {
    pub fn new(events: E, users: U) -> Self {
        Self { events, users }
    }

    /// Create an event owned by `owner_id`
    pub async fn create_event(
        &self,
        owner_id: Uuid,
        request: EventRequest,
    ) -> Result<EventView, EventError> {
        check_request(&request)?;

        if self.users.find_by_id(owner_id).await?.is_none() {
            warn!("Event creation by unknown user {}", owner_id);
            return Err(EventError::UserNotFound);
        }

        let event = self
            .events
            .create(&request.into_new_event(owner_id))
            .await?;
        info!("User {} created event {}", owner_id, event.id);

        Ok(event)
    }

    pub async fn list_events(&self, query: PageQuery) -> Result<Vec<EventView>, EventError> {
        let page = Page::resolve(query, DEFAULT_EVENT_PAGE_SIZE);
        Ok(self.events.list(page).await?)
    }

    pub async fn list_user_events(
        &self,
        user_id: Uuid,
        query: PageQuery,
    ) -> Result<Vec<EventView>, EventError> {
        let page = Page::resolve(query, DEFAULT_EVENT_PAGE_SIZE);
        Ok(self.events.list_by_owner(user_id, page).await?)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<EventView, EventError> {
        self.events.find_by_id(id).await?.ok_or(EventError::NotFound)
    }

    /// Replace an event's fields; only its owner may do so
    pub async fn update_event(
        &self,
        caller_id: Uuid,
        id: Uuid,
        request: EventRequest,
    ) -> Result<EventView, EventError> {
        check_request(&request)?;
        self.owned_event(caller_id, id).await?;

        let event = self
            .events
            .update(id, &request)
            .await?
            .ok_or(EventError::NotFound)?;
        info!("User {} updated event {}", caller_id, id);

        Ok(event)
    }

    /// Soft-delete an event; only its owner may do so
    pub async fn delete_event(&self, caller_id: Uuid, id: Uuid) -> Result<(), EventError> {
        self.owned_event(caller_id, id).await?;

        if !self.events.soft_delete(id).await? {
            return Err(EventError::NotFound);
        }
        info!("User {} deleted event {}", caller_id, id);

        Ok(())
    }

    async fn owned_event(&self, caller_id: Uuid, id: Uuid) -> Result<EventView, EventError> {
        let event = self.get_event(id).await?;

        if event.user_id != caller_id {
            warn!(
                "User {} attempted to modify event {} owned by {}",
                caller_id, id, event.user_id
            );
            return Err(EventError::Unauthorized);
        }

        Ok(event)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{models::NewUser, repositories::memory::MemoryStorage};
    use chrono::{Duration, Utc};

    pub(crate) async fn seed_user(storage: &MemoryStorage, email: &str) -> Uuid {
        let new_user = NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        UserRepository::create(storage, &new_user).await.unwrap().id
    }

    pub(crate) fn event_request(title: &str, max_capacity: i32) -> EventRequest {
        EventRequest {
            title: title.to_string(),
            description: "An evening of talks".to_string(),
            location: "Berlin".to_string(),
            date_time: Utc::now() + Duration::days(7),
            max_capacity,
        }
    }

    fn service(storage: &MemoryStorage) -> EventService<MemoryStorage, MemoryStorage> {
        EventService::new(storage.clone(), storage.clone())
    }

    #[tokio::test]
    async fn test_create_event() {
        let storage = MemoryStorage::new();
        let owner = seed_user(&storage, "owner@example.com").await;

        let event = service(&storage)
            .create_event(owner, event_request("Rust meetup", 5))
            .await
            .unwrap();

        assert_eq!(event.user_id, owner);
        assert_eq!(event.max_capacity, 5);
        assert_eq!(event.attendees_count, 0);
    }

    #[tokio::test]
    async fn test_create_event_validates_capacity_and_owner() {
        let storage = MemoryStorage::new();
        let events = service(&storage);
        let owner = seed_user(&storage, "owner@example.com").await;

        let err = events
            .create_event(owner, event_request("Rust meetup", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));

        let err = events
            .create_event(Uuid::new_v4(), event_request("Rust meetup", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::UserNotFound));

        let err = events
            .create_event(owner, event_request("", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Validation(message) if message == "Title is required"));
    }

    #[tokio::test]
    async fn test_listing_and_pagination() {
        let storage = MemoryStorage::new();
        let events = service(&storage);
        let alice = seed_user(&storage, "alice@example.com").await;
        let bob = seed_user(&storage, "bob@example.com").await;

        for title in ["one", "two", "three"] {
            events
                .create_event(alice, event_request(title, 5))
                .await
                .unwrap();
        }
        events
            .create_event(bob, event_request("four", 5))
            .await
            .unwrap();

        assert_eq!(events.list_events(PageQuery::default()).await.unwrap().len(), 4);

        let page = events
            .list_events(PageQuery {
                limit: Some(2),
                offset: Some(3),
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);

        let mine = events
            .list_user_events(alice, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.iter().all(|event| event.user_id == alice));
    }

    #[tokio::test]
    async fn test_get_missing_event() {
        let storage = MemoryStorage::new();

        let err = service(&storage).get_event(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound));
    }

    #[tokio::test]
    async fn test_only_owner_can_update() {
        let storage = MemoryStorage::new();
        let events = service(&storage);
        let owner = seed_user(&storage, "owner@example.com").await;
        let stranger = seed_user(&storage, "stranger@example.com").await;
        let event = events
            .create_event(owner, event_request("Rust meetup", 5))
            .await
            .unwrap();

        let err = events
            .update_event(stranger, event.id, event_request("Hijacked", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Unauthorized));

        let updated = events
            .update_event(owner, event.id, event_request("Rust meetup II", 8))
            .await
            .unwrap();
        assert_eq!(updated.title, "Rust meetup II");
        assert_eq!(updated.max_capacity, 8);

        let err = events
            .update_event(owner, event.id, event_request("Rust meetup II", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));

        let err = events
            .update_event(owner, Uuid::new_v4(), event_request("Ghost", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound));
    }

    #[tokio::test]
    async fn test_only_owner_can_delete() {
        let storage = MemoryStorage::new();
        let events = service(&storage);
        let owner = seed_user(&storage, "owner@example.com").await;
        let stranger = seed_user(&storage, "stranger@example.com").await;
        let event = events
            .create_event(owner, event_request("Rust meetup", 5))
            .await
            .unwrap();

        let err = events.delete_event(stranger, event.id).await.unwrap_err();
        assert!(matches!(err, EventError::Unauthorized));

        events.delete_event(owner, event.id).await.unwrap();

        let err = events.get_event(event.id).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound));
        let err = events.delete_event(owner, event.id).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound));
        assert!(events.list_events(PageQuery::default()).await.unwrap().is_empty());
    }
}
