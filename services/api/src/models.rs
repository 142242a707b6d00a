//! API models for entities, request and response payloads

use serde::Deserialize;

pub mod attendee;
pub mod event;
pub mod user;

pub use attendee::{Attendee, EventAttendee, Registration};
pub use event::{EventRequest, EventView, NewEvent};
pub use user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, User, UserResponse};

/// Upper bound applied to every caller-supplied page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for paginated listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Number of items per page
    pub limit: Option<i64>,
    /// Number of items to skip
    pub offset: Option<i64>,
}

/// A validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Resolve query parameters against a default page size.
    ///
    /// The limit is clamped to `1..=MAX_PAGE_SIZE` and negative offsets are
    /// treated as zero.
    pub fn resolve(query: PageQuery, default_limit: i64) -> Self {
        Self {
            limit: query.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.unwrap_or(0).max(0),
        }
    }
}
