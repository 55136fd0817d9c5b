use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::StartListEntry;

const ENTRY_SELECT: &str = r#"
    SELECT s.competition_id, s.athlete_id, s.start_order, s.present, s.completed,
           a.first_name, a.last_name, t.team_id, t.name AS team_name, t.start_number
    FROM start_list_entries s
    INNER JOIN athletes a ON a.athlete_id = s.athlete_id
    INNER JOIN teams t ON t.team_id = a.team_id
"#;

pub struct StartListRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StartListRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, competition_id: Uuid) -> Result<Vec<StartListEntry>> {
        let entries = sqlx::query_as::<_, StartListEntry>(&format!(
            "{ENTRY_SELECT} WHERE s.competition_id = $1 ORDER BY s.start_order"
        ))
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Rebuilds the start list from the accepted teams' entries: by team
    /// start number, then athlete name. Refused once anyone has competed.
    pub async fn generate(&self, competition_id: Uuid) -> Result<Vec<StartListEntry>> {
        let mut tx = self.pool.begin().await?;

        let completed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM start_list_entries WHERE competition_id = $1 AND completed",
        )
        .bind(competition_id)
        .fetch_one(&mut *tx)
        .await?;

        if completed > 0 {
            return Err(StorageError::ConstraintViolation(format!(
                "{completed} athlete(s) have already competed; the start list is fixed"
            )));
        }

        sqlx::query("DELETE FROM start_list_entries WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO start_list_entries (competition_id, athlete_id, start_order)
            SELECT ac.competition_id,
                   a.athlete_id,
                   (ROW_NUMBER() OVER (
                       ORDER BY t.start_number NULLS LAST, a.last_name, a.first_name, a.athlete_id
                   ))::int
            FROM athlete_competitions ac
            INNER JOIN athletes a ON a.athlete_id = ac.athlete_id
            INNER JOIN teams t ON t.team_id = a.team_id
            WHERE ac.competition_id = $1 AND t.registration_status = 'accepted'
            "#,
        )
        .bind(competition_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::from(e).constraint("Start list clash", "Competition does not exist"))?;

        tx.commit().await?;

        self.list(competition_id).await
    }

    pub async fn set_presence(
        &self,
        competition_id: Uuid,
        athlete_id: Uuid,
        present: bool,
    ) -> Result<StartListEntry> {
        let updated = sqlx::query(
            "UPDATE start_list_entries SET present = $3 WHERE competition_id = $1 AND athlete_id = $2",
        )
        .bind(competition_id)
        .bind(athlete_id)
        .bind(present)
        .execute(self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        sqlx::query_as::<_, StartListEntry>(&format!(
            "{ENTRY_SELECT} WHERE s.competition_id = $1 AND s.athlete_id = $2"
        ))
        .bind(competition_id)
        .bind(athlete_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Ticks the athlete off. Athletes missing from the start list are ignored.
    pub async fn mark_completed(
        tx: &mut Transaction<'_, Postgres>,
        competition_id: Uuid,
        athlete_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE start_list_entries
            SET completed = TRUE, present = TRUE
            WHERE competition_id = $1 AND athlete_id = $2
            "#,
        )
        .bind(competition_id)
        .bind(athlete_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
