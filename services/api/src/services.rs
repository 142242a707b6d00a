//! Use cases sitting between the HTTP handlers and the repositories
//!
//! Each service owns its business rules and reports failures through its own
//! error enum; the delivery layer maps those onto HTTP statuses.

pub mod attendees;
pub mod auth;
pub mod events;

pub use attendees::{AttendeeError, AttendeeService};
pub use auth::{AuthError, AuthService};
pub use events::{EventError, EventService};
