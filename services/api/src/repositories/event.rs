//! Event repository for database operations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::EventRepository;
use crate::models::{EventRequest, EventView, NewEvent, Page};

/// Columns of an [`EventView`], counting registrations on the fly
const EVENT_VIEW_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.location, e.date_time, e.max_capacity, e.user_id,
    (SELECT COUNT(*) FROM attendees a WHERE a.event_id = e.id) AS attendees_count,
    e.created_at, e.updated_at
"#;

/// PostgreSQL event repository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl EventRepository for PgEventRepository {
    async fn create(&self, new_event: &NewEvent) -> DatabaseResult<EventView> {
        info!(
            "Creating event '{}' for user {}",
            new_event.title, new_event.user_id
        );

        sqlx::query_as::<_, EventView>(
            r#"
            INSERT INTO events (title, description, location, date_time, max_capacity, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, location, date_time, max_capacity, user_id,
                      0::BIGINT AS attendees_count, created_at, updated_at
            "#,
        )
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(&new_event.location)
        .bind(new_event.date_time)
        .bind(new_event.max_capacity)
        .bind(new_event.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<EventView>> {
        let sql = format!(
            "SELECT {EVENT_VIEW_COLUMNS} FROM events e WHERE e.id = $1 AND e.deleted_at IS NULL"
        );

        sqlx::query_as::<_, EventView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn list(&self, page: Page) -> DatabaseResult<Vec<EventView>> {
        let sql = format!(
            r#"
            SELECT {EVENT_VIEW_COLUMNS}
            FROM events e
            WHERE e.deleted_at IS NULL
            ORDER BY e.date_time, e.id
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, EventView>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn list_by_owner(&self, user_id: Uuid, page: Page) -> DatabaseResult<Vec<EventView>> {
        let sql = format!(
            r#"
            SELECT {EVENT_VIEW_COLUMNS}
            FROM events e
            WHERE e.user_id = $1 AND e.deleted_at IS NULL
            ORDER BY e.date_time, e.id
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, EventView>(&sql)
            .bind(user_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn update(&self, id: Uuid, changes: &EventRequest) -> DatabaseResult<Option<EventView>> {
        info!("Updating event {}", id);

        let sql = format!(
            r#"
            UPDATE events e
            SET title = $2, description = $3, location = $4, date_time = $5,
                max_capacity = $6, updated_at = now()
            WHERE e.id = $1 AND e.deleted_at IS NULL
            RETURNING {EVENT_VIEW_COLUMNS}
            "#
        );

        sqlx::query_as::<_, EventView>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.location)
            .bind(changes.date_time)
            .bind(changes.max_capacity)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn soft_delete(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting event {}", id);

        let result = sqlx::query(
            r#"
            UPDATE events
            SET deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
