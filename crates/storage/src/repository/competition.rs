use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::competition::CreateCompetitionRequest;
use crate::error::{Result, StorageError};
use crate::models::{Competition, CompetitionStatus, concurrent};

const COMPETITION_COLUMNS: &str = r#"
    competition_id, event_id, name, competition_type, scoring_type, ascending, zones,
    max_participants, max_value, status, allowed_genders, allowed_categories,
    display_order, created_at
"#;

/// Repository for Competition database operations
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Competitions of an event in display order
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Competition>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_by_event_in(&mut conn, event_id).await
    }

    pub async fn list_by_event_in(
        conn: &mut PgConnection,
        event_id: Uuid,
    ) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(&format!(
            r#"
            SELECT {COMPETITION_COLUMNS}
            FROM competitions
            WHERE event_id = $1
            ORDER BY display_order, name, competition_id
            "#
        ))
        .bind(event_id)
        .fetch_all(conn)
        .await?;

        Ok(competitions)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, event_id: Uuid, req: &CreateCompetitionRequest) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(&format!(
            r#"
            INSERT INTO competitions (
                event_id, name, competition_type, scoring_type, ascending, zones,
                max_participants, max_value, allowed_genders, allowed_categories, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(&req.name)
        .bind(req.competition_type)
        .bind(req.scoring_type)
        .bind(req.ascending)
        .bind(Json(&req.zones))
        .bind(req.max_participants)
        .bind(req.max_value)
        .bind(Json(&req.allowed_genders))
        .bind(Json(&req.allowed_categories))
        .bind(req.display_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).constraint(
                "A competition with this name already exists in the event",
                "Event does not exist",
            )
        })
    }

    pub async fn update(&self, competition: &Competition) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(&format!(
            r#"
            UPDATE competitions
            SET name = $2,
                competition_type = $3,
                scoring_type = $4,
                ascending = $5,
                zones = $6,
                max_participants = $7,
                max_value = $8,
                allowed_genders = $9,
                allowed_categories = $10,
                display_order = $11
            WHERE competition_id = $1
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(competition.competition_id)
        .bind(&competition.name)
        .bind(competition.competition_type)
        .bind(competition.scoring_type)
        .bind(competition.ascending)
        .bind(&competition.zones)
        .bind(competition.max_participants)
        .bind(competition.max_value)
        .bind(&competition.allowed_genders)
        .bind(&competition.allowed_categories)
        .bind(competition.display_order)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).constraint(
                "A competition with this name already exists in the event",
                "Invalid reference",
            )
        })?
        .ok_or(StorageError::NotFound)
    }

    /// Re-reads the competition under a row lock.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Moves the competition from `from` to `to`. Fails if the stored status
    /// is no longer `from`.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        from: CompetitionStatus,
        to: CompetitionStatus,
    ) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(&format!(
            r#"
            UPDATE competitions
            SET status = $3
            WHERE competition_id = $1 AND status = $2
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| concurrent("competition", from).into())
    }

    /// Moves a pending competition to in_progress. Does nothing if it has
    /// already left pending.
    pub async fn start(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool> {
        let started = sqlx::query(
            "UPDATE competitions SET status = 'in_progress' WHERE competition_id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(started.rows_affected() > 0)
    }

    /// Number of athletes entered, optionally ignoring one of them.
    pub async fn count_entries(&self, id: Uuid, excluding: Option<Uuid>) -> Result<i64> {
        let count = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM athlete_competitions
            WHERE competition_id = $1
              AND ($2::uuid IS NULL OR athlete_id <> $2)
            "#,
        )
        .bind(id)
        .bind(excluding)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Deletes a competition and its entries. Refused once results exist.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let results: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM athlete_results WHERE competition_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if results > 0 {
            return Err(StorageError::ConstraintViolation(format!(
                "Competition has {results} recorded result(s) and cannot be deleted"
            )));
        }

        sqlx::query("DELETE FROM athlete_competitions WHERE competition_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM competitions WHERE competition_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
