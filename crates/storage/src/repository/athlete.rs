use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::athlete::CreateAthleteRequest;
use crate::error::{Result, StorageError};
use crate::models::Athlete;

/// Athlete columns plus the sorted list of competitions they are entered in.
/// Needs `GROUP BY a.athlete_id` after the WHERE clause.
const ATHLETE_SELECT: &str = r#"
    SELECT a.athlete_id, a.team_id, a.first_name, a.last_name, a.birth_year,
           a.category, a.gender, a.created_at,
           COALESCE(
               array_agg(ac.competition_id ORDER BY ac.competition_id)
                   FILTER (WHERE ac.competition_id IS NOT NULL),
               '{}'
           ) AS competition_ids
    FROM athletes a
    LEFT JOIN athlete_competitions ac ON ac.athlete_id = a.athlete_id
"#;

pub struct AthleteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AthleteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<Athlete>> {
        let athletes = sqlx::query_as::<_, Athlete>(&format!(
            r#"
            {ATHLETE_SELECT}
            WHERE a.team_id = $1
            GROUP BY a.athlete_id
            ORDER BY a.last_name, a.first_name, a.athlete_id
            "#
        ))
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(athletes)
    }

    /// Athletes of all accepted teams of an event; the classified field.
    pub async fn list_accepted_by_event(&self, event_id: Uuid) -> Result<Vec<Athlete>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_accepted_by_event_in(&mut conn, event_id).await
    }

    /// Athletes of the event's accepted teams.
    pub async fn list_accepted_by_event_in(
        conn: &mut PgConnection,
        event_id: Uuid,
    ) -> Result<Vec<Athlete>> {
        let athletes = sqlx::query_as::<_, Athlete>(&format!(
            r#"
            {ATHLETE_SELECT}
            INNER JOIN teams t ON t.team_id = a.team_id
            WHERE t.event_id = $1 AND t.registration_status = 'accepted'
            GROUP BY a.athlete_id
            ORDER BY a.last_name, a.first_name, a.athlete_id
            "#
        ))
        .bind(event_id)
        .fetch_all(conn)
        .await?;

        Ok(athletes)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Athlete> {
        sqlx::query_as::<_, Athlete>(&format!(
            "{ATHLETE_SELECT} WHERE a.athlete_id = $1 GROUP BY a.athlete_id"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, team_id: Uuid, req: &CreateAthleteRequest) -> Result<Athlete> {
        let mut tx = self.pool.begin().await?;

        let athlete_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO athletes (team_id, first_name, last_name, birth_year, category, gender)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING athlete_id
            "#,
        )
        .bind(team_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(req.birth_year)
        .bind(req.category)
        .bind(req.gender)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StorageError::from(e).constraint("Athlete already exists", "Team does not exist"))?;

        Self::replace_entries(&mut tx, athlete_id, &req.competition_ids).await?;
        tx.commit().await?;

        self.find_by_id(athlete_id).await
    }

    /// Writes the athlete's fields and entry list.
    pub async fn update(&self, athlete: &Athlete) -> Result<Athlete> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE athletes
            SET first_name = $2,
                last_name = $3,
                birth_year = $4,
                category = $5,
                gender = $6
            WHERE athlete_id = $1
            "#,
        )
        .bind(athlete.athlete_id)
        .bind(&athlete.first_name)
        .bind(&athlete.last_name)
        .bind(athlete.birth_year)
        .bind(athlete.category)
        .bind(athlete.gender)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Self::replace_entries(&mut tx, athlete.athlete_id, &athlete.competition_ids).await?;
        tx.commit().await?;

        self.find_by_id(athlete.athlete_id).await
    }

    /// Sets the athlete's entries to exactly `competition_ids`. Dropping an
    /// entry that already has a result is refused.
    async fn replace_entries(
        tx: &mut Transaction<'_, Postgres>,
        athlete_id: Uuid,
        competition_ids: &[Uuid],
    ) -> Result<()> {
        let scored: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM athlete_results
            WHERE athlete_id = $1 AND NOT (competition_id = ANY($2))
            "#,
        )
        .bind(athlete_id)
        .bind(competition_ids)
        .fetch_one(&mut **tx)
        .await?;

        if scored > 0 {
            return Err(StorageError::ConstraintViolation(
                "Cannot withdraw an athlete from a competition with a recorded result".to_string(),
            ));
        }

        sqlx::query(
            "DELETE FROM athlete_competitions WHERE athlete_id = $1 AND NOT (competition_id = ANY($2))",
        )
        .bind(athlete_id)
        .bind(competition_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO athlete_competitions (athlete_id, competition_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(athlete_id)
        .bind(competition_ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            StorageError::from(e).constraint("Duplicate entry", "Competition does not exist")
        })?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM athletes WHERE athlete_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                StorageError::from(e).constraint(
                    "Athlete already exists",
                    "Athlete has recorded results and cannot be deleted",
                )
            })?;

        if deleted.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
