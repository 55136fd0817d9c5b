use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::dto::event::CreateEventRequest;
use crate::error::{Result, StorageError};
use crate::models::{Event, EventStatus, concurrent};

const EVENT_COLUMNS: &str = r#"
    event_id, name, slug, location, start_date, end_date, registration_deadline,
    status, max_teams, scoring_rules, registration_rules, branding, created_at
"#;

/// Repository for Event database operations
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Most recent events first, with the total count for pagination.
    pub async fn list(&self, pagination: &PaginationParams) -> Result<(Vec<Event>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(self.pool)
            .await?;

        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date DESC, created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        Ok((events, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Event> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    pub async fn find_by_id_in(conn: &mut PgConnection, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &CreateEventRequest) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                name, slug, location, start_date, end_date, registration_deadline,
                max_teams, scoring_rules, registration_rules, branding
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&req.name)
        .bind(&req.slug)
        .bind(&req.location)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.registration_deadline)
        .bind(req.max_teams)
        .bind(Json(&req.scoring_rules))
        .bind(Json(&req.registration_rules))
        .bind(Json(&req.branding))
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).constraint("Slug already exists", "Invalid reference"))
    }

    /// Writes every editable field of `event`. Status has its own path.
    pub async fn update(&self, event: &Event) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET name = $2,
                slug = $3,
                location = $4,
                start_date = $5,
                end_date = $6,
                registration_deadline = $7,
                max_teams = $8,
                scoring_rules = $9,
                registration_rules = $10,
                branding = $11
            WHERE event_id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.event_id)
        .bind(&event.name)
        .bind(&event.slug)
        .bind(&event.location)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.registration_deadline)
        .bind(event.max_teams)
        .bind(&event.scoring_rules)
        .bind(&event.registration_rules)
        .bind(&event.branding)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::from(e).constraint("Slug already exists", "Invalid reference"))?
        .ok_or(StorageError::NotFound)
    }

    /// Moves the event from `from` to `to`. Fails if the stored status is no
    /// longer `from`.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        from: EventStatus,
        to: EventStatus,
    ) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET status = $3 WHERE event_id = $1 AND status = $2 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| concurrent("event", from).into())
    }

    /// Takes a row lock on the event for the rest of the transaction and
    /// returns it as stored under the lock.
    pub async fn lock(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Deletes the event with its teams and competitions. Refused once any
    /// result has been recorded for it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock(&mut tx, id).await?;

        let results: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM athlete_results r
            INNER JOIN competitions c ON c.competition_id = r.competition_id
            WHERE c.event_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if results > 0 {
            return Err(StorageError::ConstraintViolation(format!(
                "Event has {results} recorded result(s) and cannot be deleted"
            )));
        }

        sqlx::query("DELETE FROM teams WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM competitions WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
