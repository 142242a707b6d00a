//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    jwt::JwtService,
    password::PasswordService,
    repositories::Storage,
    services::{AttendeeService, AuthService, EventService},
};

/// Application state shared across handlers
pub struct AppState<S: Storage> {
    pub auth: Arc<AuthService<S::Users>>,
    pub events: Arc<EventService<S::Events, S::Users>>,
    pub attendees: Arc<AttendeeService<S::Attendees>>,
    pub jwt_service: JwtService,
}

impl<S: Storage> AppState<S> {
    /// Wire every use case against one storage backend
    pub fn new(storage: S, passwords: PasswordService, jwt_service: JwtService) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                storage.users(),
                passwords,
                jwt_service.clone(),
            )),
            events: Arc::new(EventService::new(storage.events(), storage.users())),
            attendees: Arc::new(AttendeeService::new(storage.attendees())),
            jwt_service,
        }
    }
}

impl<S: Storage> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            events: Arc::clone(&self.events),
            attendees: Arc::clone(&self.attendees),
            jwt_service: self.jwt_service.clone(),
        }
    }
}
