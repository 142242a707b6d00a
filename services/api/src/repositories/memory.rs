//! In-memory storage for tests
//!
//! All tables live behind one async mutex. Every repository call holds the
//! lock for its whole duration, which gives registration the same
//! one-at-a-time guarantee the PostgreSQL row lock provides.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    ATTENDEE_PAIR_CONSTRAINT, Admission, AttendeeRepository, EventRepository, RegistrationOutcome,
    Rejection, SeatCheck, Storage, USER_EMAIL_CONSTRAINT, UserRepository,
};
use crate::models::{
    Attendee, EventAttendee, EventRequest, EventView, NewEvent, NewUser, Page, Registration, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<StoredEvent>,
    attendees: Vec<Attendee>,
}

/// Row of the events table, soft-deleted rows included
#[derive(Debug, Clone)]
struct StoredEvent {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    date_time: DateTime<Utc>,
    max_capacity: i32,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted: bool,
}

/// Apply a page window to an in-memory sequence
fn paginate<T>(page: Page, items: impl IntoIterator<Item = T>) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

impl Tables {
    fn live_event(&self, id: Uuid) -> Option<&StoredEvent> {
        self.events
            .iter()
            .find(|event| event.id == id && !event.deleted)
    }

    fn attendees_count(&self, event_id: Uuid) -> i64 {
        self.attendees
            .iter()
            .filter(|attendee| attendee.event_id == event_id)
            .count() as i64
    }

    fn view(&self, event: &StoredEvent) -> EventView {
        EventView {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            date_time: event.date_time,
            max_capacity: event.max_capacity,
            user_id: event.user_id,
            attendees_count: self.attendees_count(event.id),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }

    fn live_views(&self, keep: impl Fn(&StoredEvent) -> bool) -> Vec<EventView> {
        let mut views: Vec<EventView> = self
            .events
            .iter()
            .filter(|event| !event.deleted && keep(event))
            .map(|event| self.view(event))
            .collect();
        views.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.id.cmp(&b.id)));
        views
    }
}

/// Storage keeping every table in process memory
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations currently held for an event
    pub async fn attendees_count(&self, event_id: Uuid) -> i64 {
        self.tables.lock().await.attendees_count(event_id)
    }
}

impl Storage for MemoryStorage {
    type Users = Self;
    type Events = Self;
    type Attendees = Self;

    fn users(&self) -> Self::Users {
        self.clone()
    }

    fn events(&self) -> Self::Events {
        self.clone()
    }

    fn attendees(&self) -> Self::Attendees {
        self.clone()
    }
}

impl UserRepository for MemoryStorage {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|user| user.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation {
                constraint: USER_EMAIL_CONSTRAINT.to_string(),
            });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }
}

impl EventRepository for MemoryStorage {
    async fn create(&self, new_event: &NewEvent) -> DatabaseResult<EventView> {
        let mut tables = self.tables.lock().await;

        let now = Utc::now();
        let event = StoredEvent {
            id: Uuid::new_v4(),
            title: new_event.title.clone(),
            description: new_event.description.clone(),
            location: new_event.location.clone(),
            date_time: new_event.date_time,
            max_capacity: new_event.max_capacity,
            user_id: new_event.user_id,
            created_at: now,
            updated_at: now,
            deleted: false,
        };
        let view = tables.view(&event);
        tables.events.push(event);

        Ok(view)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<EventView>> {
        let tables = self.tables.lock().await;
        Ok(tables.live_event(id).map(|event| tables.view(event)))
    }

    async fn list(&self, page: Page) -> DatabaseResult<Vec<EventView>> {
        let tables = self.tables.lock().await;
        Ok(paginate(page, tables.live_views(|_| true)))
    }

    async fn list_by_owner(&self, user_id: Uuid, page: Page) -> DatabaseResult<Vec<EventView>> {
        let tables = self.tables.lock().await;
        Ok(paginate(
            page,
            tables.live_views(move |event| event.user_id == user_id),
        ))
    }

    async fn update(&self, id: Uuid, changes: &EventRequest) -> DatabaseResult<Option<EventView>> {
        let mut tables = self.tables.lock().await;

        let Some(stored) = tables
            .events
            .iter_mut()
            .find(|event| event.id == id && !event.deleted)
        else {
            return Ok(None);
        };

        stored.title = changes.title.clone();
        stored.description = changes.description.clone();
        stored.location = changes.location.clone();
        stored.date_time = changes.date_time;
        stored.max_capacity = changes.max_capacity;
        stored.updated_at = Utc::now();
        let event = stored.clone();

        Ok(Some(tables.view(&event)))
    }

    async fn soft_delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut tables = self.tables.lock().await;

        match tables
            .events
            .iter_mut()
            .find(|event| event.id == id && !event.deleted)
        {
            Some(event) => {
                event.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl AttendeeRepository for MemoryStorage {
    async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        admit: Admission,
    ) -> DatabaseResult<RegistrationOutcome> {
        let mut tables = self.tables.lock().await;

        let Some(event) = tables.live_event(event_id) else {
            return Ok(RegistrationOutcome::Rejected(Rejection::EventNotFound));
        };

        if !tables.users.iter().any(|user| user.id == user_id) {
            return Ok(RegistrationOutcome::Rejected(Rejection::UserNotFound));
        }

        let check = SeatCheck {
            max_capacity: event.max_capacity,
            attendees_count: tables.attendees_count(event_id),
            already_registered: tables
                .attendees
                .iter()
                .any(|attendee| attendee.event_id == event_id && attendee.user_id == user_id),
        };

        if let Err(rejection) = admit(&check) {
            return Ok(RegistrationOutcome::Rejected(rejection));
        }

        if check.already_registered {
            return Err(DatabaseError::UniqueViolation {
                constraint: ATTENDEE_PAIR_CONSTRAINT.to_string(),
            });
        }

        let attendee = Attendee {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            created_at: Utc::now(),
        };
        tables.attendees.push(attendee.clone());

        Ok(RegistrationOutcome::Registered(attendee))
    }

    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> DatabaseResult<bool> {
        let mut tables = self.tables.lock().await;

        let before = tables.attendees.len();
        tables
            .attendees
            .retain(|attendee| !(attendee.event_id == event_id && attendee.user_id == user_id));

        Ok(tables.attendees.len() < before)
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> DatabaseResult<Vec<Registration>> {
        let tables = self.tables.lock().await;

        let registrations = tables
            .attendees
            .iter()
            .filter(|attendee| attendee.user_id == user_id)
            .filter_map(|attendee| {
                tables.live_event(attendee.event_id).map(|event| Registration {
                    id: attendee.id,
                    event_id: attendee.event_id,
                    user_id: attendee.user_id,
                    title: event.title.clone(),
                    location: event.location.clone(),
                    date_time: event.date_time,
                    created_at: attendee.created_at,
                })
            });

        Ok(paginate(page, registrations))
    }

    async fn list_by_event(&self, event_id: Uuid, page: Page) -> DatabaseResult<Vec<EventAttendee>> {
        let tables = self.tables.lock().await;

        let attendees = tables
            .attendees
            .iter()
            .filter(|attendee| attendee.event_id == event_id)
            .filter_map(|attendee| {
                tables
                    .users
                    .iter()
                    .find(|user| user.id == attendee.user_id)
                    .map(|user| EventAttendee {
                        id: attendee.id,
                        event_id: attendee.event_id,
                        user_id: attendee.user_id,
                        email: user.email.clone(),
                        first_name: user.first_name.clone(),
                        last_name: user.last_name.clone(),
                        created_at: attendee.created_at,
                    })
            });

        Ok(paginate(page, attendees))
    }
}

mod tests {
    use super::*;

    #[test]
    fn paginate_applies_window() {
        let page = Page { limit: 2, offset: 1 };
        assert_eq!(paginate(page, vec![1, 2, 3, 4]), vec![2, 3]);
        assert!(paginate(Page { limit: 5, offset: 9 }, vec![1, 2]).is_empty());
    }
}
