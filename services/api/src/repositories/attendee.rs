//! Attendee repository for database operations
//!
//! Registration locks the event row with `SELECT ... FOR UPDATE` before
//! counting seats, so concurrent registrations for one event run one at a
//! time while other events are unaffected. The unique constraint on
//! `(event_id, user_id)` backs up the duplicate check.

use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    ATTENDEE_PAIR_CONSTRAINT, Admission, AttendeeRepository, RegistrationOutcome, Rejection,
    SeatCheck,
};
use crate::models::{Attendee, EventAttendee, Page, Registration};

/// PostgreSQL attendee repository
#[derive(Clone)]
pub struct PgAttendeeRepository {
    pool: PgPool,
}

impl PgAttendeeRepository {
    /// Create a new attendee repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AttendeeRepository for PgAttendeeRepository {
    async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        admit: Admission,
    ) -> DatabaseResult<RegistrationOutcome> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;

        let max_capacity: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT max_capacity
            FROM events
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let Some(max_capacity) = max_capacity else {
            return Ok(RegistrationOutcome::Rejected(Rejection::EventNotFound));
        };

        let user_exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        if !user_exists {
            return Ok(RegistrationOutcome::Rejected(Rejection::UserNotFound));
        }

        let (attendees_count, already_registered): (i64, bool) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), FALSE)
            FROM attendees
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let check = SeatCheck {
            max_capacity,
            attendees_count,
            already_registered,
        };

        if let Err(rejection) = admit(&check) {
            tx.rollback().await.map_err(DatabaseError::Query)?;
            return Ok(RegistrationOutcome::Rejected(rejection));
        }

        let inserted = sqlx::query_as::<_, Attendee>(
            r#"
            INSERT INTO attendees (event_id, user_id)
            VALUES ($1, $2)
            RETURNING id, event_id, user_id, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_query);

        match inserted {
            Ok(attendee) => {
                tx.commit().await.map_err(DatabaseError::Query)?;
                info!("User {} registered for event {}", user_id, event_id);
                Ok(RegistrationOutcome::Registered(attendee))
            }
            Err(e) if e.is_unique_violation_of(ATTENDEE_PAIR_CONSTRAINT) => {
                warn!(
                    "Duplicate registration of user {} for event {} caught by constraint",
                    user_id, event_id
                );
                Ok(RegistrationOutcome::Rejected(Rejection::AlreadyRegistered))
            }
            Err(e) => Err(e),
        }
    }

    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM attendees
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> DatabaseResult<Vec<Registration>> {
        sqlx::query_as::<_, Registration>(
            r#"
            SELECT a.id, a.event_id, a.user_id, e.title, e.location, e.date_time, a.created_at
            FROM attendees a
            JOIN events e ON e.id = a.event_id
            WHERE a.user_id = $1 AND e.deleted_at IS NULL
            ORDER BY a.created_at, a.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn list_by_event(&self, event_id: Uuid, page: Page) -> DatabaseResult<Vec<EventAttendee>> {
        sqlx::query_as::<_, EventAttendee>(
            r#"
            SELECT a.id, a.event_id, a.user_id, u.email, u.first_name, u.last_name, a.created_at
            FROM attendees a
            JOIN users u ON u.id = a.user_id
            WHERE a.event_id = $1
            ORDER BY a.created_at, a.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(event_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }
}
