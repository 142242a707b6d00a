//! Event registration
//!
//! The capacity rule lives in [`admit`]; repositories evaluate it while the
//! event is locked, so two registrations can never both take the last seat.

use common::error::DatabaseError;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    models::{Attendee, EventAttendee, Page, PageQuery, Registration},
    repositories::{AttendeeRepository, RegistrationOutcome, Rejection, SeatCheck},
};

/// Page size used when an attendee listing does not ask for one
pub const DEFAULT_ATTENDEE_PAGE_SIZE: i64 = 10;

/// Errors raised by the registration use case
#[derive(Error, Debug)]
pub enum AttendeeError {
    #[error("Event not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Event has reached maximum capacity")]
    CapacityExceeded,

    #[error("User is already registered for this event")]
    AlreadyRegistered,

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl From<Rejection> for AttendeeError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::EventNotFound => AttendeeError::NotFound,
            Rejection::UserNotFound => AttendeeError::UserNotFound,
            Rejection::CapacityExceeded => AttendeeError::CapacityExceeded,
            Rejection::AlreadyRegistered => AttendeeError::AlreadyRegistered,
        }
    }
}

/// Admission rule for an existing event: a full event is reported before a
/// duplicate registration.
pub fn admit(check: &SeatCheck) -> Result<(), Rejection> {
    if check.attendees_count >= i64::from(check.max_capacity) {
        return Err(Rejection::CapacityExceeded);
    }

    if check.already_registered {
        return Err(Rejection::AlreadyRegistered);
    }

    Ok(())
}

/// Registers users for events and lists registrations
#[derive(Clone)]
pub struct AttendeeService<A> {
    attendees: A,
}

impl<A: AttendeeRepository> AttendeeService<A> {
    pub fn new(attendees: A) -> Self {
        Self { attendees }
    }

    /// Take a seat at an event
    pub async fn register_for_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Attendee, AttendeeError> {
        match self.attendees.register(event_id, user_id, admit).await? {
            RegistrationOutcome::Registered(attendee) => {
                info!("User {} took a seat at event {}", user_id, event_id);
                Ok(attendee)
            }
            RegistrationOutcome::Rejected(rejection) => {
                warn!(
                    "Registration of user {} for event {} rejected: {:?}",
                    user_id, event_id, rejection
                );
                Err(rejection.into())
            }
        }
    }

    /// Give up a seat; a missing registration is not an error
    pub async fn unregister_from_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AttendeeError> {
        if self.attendees.unregister(event_id, user_id).await? {
            info!("User {} left event {}", user_id, event_id);
        }

        Ok(())
    }

    pub async fn my_registrations(
        &self,
        user_id: Uuid,
        query: PageQuery,
    ) -> Result<Vec<Registration>, AttendeeError> {
        let page = Page::resolve(query, DEFAULT_ATTENDEE_PAGE_SIZE);
        Ok(self.attendees.list_by_user(user_id, page).await?)
    }

    /// Attendees of an event; unknown events simply have none
    pub async fn event_attendees(
        &self,
        event_id: Uuid,
        query: PageQuery,
    ) -> Result<Vec<EventAttendee>, AttendeeError> {
        let page = Page::resolve(query, DEFAULT_ATTENDEE_PAGE_SIZE);
        Ok(self.attendees.list_by_event(event_id, page).await?)
    }
}
