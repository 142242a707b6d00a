//! Repositories for database operations
//!
//! Each entity has a repository trait describing the data access the use
//! cases need. [`Storage`] bundles one implementation of each so the HTTP
//! layer can be wired against PostgreSQL in production and against the
//! in-memory backend in tests.

use std::future::Future;

use common::error::DatabaseResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Attendee, EventAttendee, EventRequest, EventView, NewEvent, NewUser, Page, Registration, User,
};

pub mod attendee;
pub mod event;
#[cfg(test)]
pub mod memory;
pub mod user;

pub use attendee::PgAttendeeRepository;
pub use event::PgEventRepository;
pub use user::PgUserRepository;

/// Unique index guarding user emails
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Unique constraint guarding one registration per (event, user) pair
pub const ATTENDEE_PAIR_CONSTRAINT: &str = "attendees_event_user_key";

/// Seat availability observed while the event is locked for registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatCheck {
    pub max_capacity: i32,
    pub attendees_count: i64,
    pub already_registered: bool,
}

/// Why a registration was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EventNotFound,
    UserNotFound,
    CapacityExceeded,
    AlreadyRegistered,
}

/// Admission rule evaluated inside the registration transaction
pub type Admission = fn(&SeatCheck) -> Result<(), Rejection>;

/// Result of an atomic registration attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Registered(Attendee),
    Rejected(Rejection),
}

/// User data access
pub trait UserRepository: Clone + Send + Sync + 'static {
    /// Insert a user; a taken email surfaces as a unique violation of
    /// [`USER_EMAIL_CONSTRAINT`]
    fn create(&self, new_user: &NewUser) -> impl Future<Output = DatabaseResult<User>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = DatabaseResult<Option<User>>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = DatabaseResult<Option<User>>> + Send;
}

/// Event data access; soft-deleted events are invisible to every method
pub trait EventRepository: Clone + Send + Sync + 'static {
    fn create(&self, new_event: &NewEvent)
    -> impl Future<Output = DatabaseResult<EventView>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = DatabaseResult<Option<EventView>>> + Send;

    fn list(&self, page: Page) -> impl Future<Output = DatabaseResult<Vec<EventView>>> + Send;

    fn list_by_owner(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DatabaseResult<Vec<EventView>>> + Send;

    /// Replace the mutable fields of an event, returning `None` if it is gone
    fn update(
        &self,
        id: Uuid,
        changes: &EventRequest,
    ) -> impl Future<Output = DatabaseResult<Option<EventView>>> + Send;

    /// Mark an event deleted, returning whether a live event was found
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = DatabaseResult<bool>> + Send;
}

/// Registration data access
pub trait AttendeeRepository: Clone + Send + Sync + 'static {
    /// Atomically check `admit` against the event's seats and insert the
    /// registration if it passes.
    ///
    /// A missing event is rejected first, then a missing user, before
    /// `admit` sees the seats.
    ///
    /// Concurrent calls for the same event are serialized, so the snapshot
    /// handed to `admit` is still current when the row is inserted.
    fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        admit: Admission,
    ) -> impl Future<Output = DatabaseResult<RegistrationOutcome>> + Send;

    /// Remove the registration, returning whether one existed
    fn unregister(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<bool>> + Send;

    fn list_by_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DatabaseResult<Vec<Registration>>> + Send;

    fn list_by_event(
        &self,
        event_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DatabaseResult<Vec<EventAttendee>>> + Send;
}

/// A storage backend providing every repository
pub trait Storage: Clone + Send + Sync + 'static {
    type Users: UserRepository;
    type Events: EventRepository;
    type Attendees: AttendeeRepository;

    fn users(&self) -> Self::Users;
    fn events(&self) -> Self::Events;
    fn attendees(&self) -> Self::Attendees;
}

/// PostgreSQL-backed storage
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Create a new storage over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Storage for PgStorage {
    type Users = PgUserRepository;
    type Events = PgEventRepository;
    type Attendees = PgAttendeeRepository;

    fn users(&self) -> Self::Users {
        PgUserRepository::new(self.pool.clone())
    }

    fn events(&self) -> Self::Events {
        PgEventRepository::new(self.pool.clone())
    }

    fn attendees(&self) -> Self::Attendees {
        PgAttendeeRepository::new(self.pool.clone())
    }
}
