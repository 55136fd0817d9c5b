use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::dto::result::ResultFilter;
use crate::error::{Result, StorageError};
use crate::models::{AthleteResult, AthleteResultHistory, ResultStatus};

const RESULT_COLUMNS: &str = r#"
    r.result_id, r.client_id, r.athlete_id, r.competition_id, r.value, r.status,
    r.notes, r.judge_id, r.recorded_at
"#;

/// Everything needed to write a result row.
#[derive(Debug, Clone, Copy)]
pub struct NewResult<'a> {
    pub client_id: Uuid,
    pub athlete_id: Uuid,
    pub competition_id: Uuid,
    pub value: Decimal,
    pub status: ResultStatus,
    pub notes: Option<&'a str>,
    pub judge_id: Option<&'a str>,
}

pub struct ResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<AthleteResult> {
        sqlx::query_as::<_, AthleteResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM athlete_results r WHERE r.result_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// The result as this client id stored it. A superseded submission comes
    /// back from the history table, under the id of the result it belongs to.
    pub async fn find_by_client_id(&self, client_id: Uuid) -> Result<Option<AthleteResult>> {
        let result = sqlx::query_as::<_, AthleteResult>(&format!(
            r#"
            SELECT {RESULT_COLUMNS}
            FROM athlete_results r
            WHERE r.client_id = $1
            UNION ALL
            SELECT h.result_id, h.client_id, r.athlete_id, r.competition_id, h.value,
                   h.status, h.notes, h.judge_id, h.recorded_at
            FROM athlete_result_history h
            INNER JOIN athlete_results r ON r.result_id = h.result_id
            WHERE h.client_id = $1
            LIMIT 1
            "#
        ))
        .bind(client_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    pub async fn list(&self, filter: &ResultFilter) -> Result<Vec<AthleteResult>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_in(&mut conn, filter).await
    }

    pub async fn list_in(
        conn: &mut PgConnection,
        filter: &ResultFilter,
    ) -> Result<Vec<AthleteResult>> {
        let mut query = QueryBuilder::new(format!(
            r#"
            SELECT {RESULT_COLUMNS}
            FROM athlete_results r
            INNER JOIN competitions c ON c.competition_id = r.competition_id
            WHERE 1=1
            "#
        ));

        if let Some(event_id) = filter.event_id {
            query.push(" AND c.event_id = ");
            query.push_bind(event_id);
        }

        if let Some(competition_id) = filter.competition_id {
            query.push(" AND r.competition_id = ");
            query.push_bind(competition_id);
        }

        if let Some(athlete_id) = filter.athlete_id {
            query.push(" AND r.athlete_id = ");
            query.push_bind(athlete_id);
        }

        query.push(" ORDER BY c.display_order, r.competition_id, r.recorded_at, r.result_id");

        let results = query
            .build_query_as::<AthleteResult>()
            .fetch_all(conn)
            .await?;

        Ok(results)
    }

    /// Superseded versions of a result, oldest first.
    pub async fn history(&self, result_id: Uuid) -> Result<Vec<AthleteResultHistory>> {
        let history = sqlx::query_as::<_, AthleteResultHistory>(
            r#"
            SELECT history_id, result_id, client_id, value, status, notes, judge_id,
                   recorded_at, superseded_at
            FROM athlete_result_history
            WHERE result_id = $1
            ORDER BY superseded_at, history_id
            "#,
        )
        .bind(result_id)
        .fetch_all(self.pool)
        .await?;

        Ok(history)
    }

    /// Locks the pair for the rest of the transaction and returns its current
    /// result, if any. The advisory lock also covers a pair with no row yet.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        athlete_id: Uuid,
        competition_id: Uuid,
    ) -> Result<Option<AthleteResult>> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text), hashtext($2::text))")
            .bind(athlete_id)
            .bind(competition_id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query_as::<_, AthleteResult>(&format!(
            r#"
            SELECT {RESULT_COLUMNS}
            FROM athlete_results r
            WHERE r.athlete_id = $1 AND r.competition_id = $2
            FOR UPDATE
            "#
        ))
        .bind(athlete_id)
        .bind(competition_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(result)
    }

    /// Copies a result into the history table before it is overwritten.
    pub async fn archive(tx: &mut Transaction<'_, Postgres>, result: &AthleteResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO athlete_result_history (
                result_id, client_id, value, status, notes, judge_id, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(result.result_id)
        .bind(result.client_id)
        .bind(result.value)
        .bind(result.status)
        .bind(&result.notes)
        .bind(&result.judge_id)
        .bind(result.recorded_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Inserts the result or overwrites the current one for the same athlete
    /// and competition. The row keeps its id across overwrites.
    pub async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        new: NewResult<'_>,
    ) -> Result<AthleteResult> {
        let result = sqlx::query_as::<_, AthleteResult>(
            r#"
            INSERT INTO athlete_results (
                client_id, athlete_id, competition_id, value, status, notes, judge_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (athlete_id, competition_id) DO UPDATE
            SET client_id = EXCLUDED.client_id,
                value = EXCLUDED.value,
                status = EXCLUDED.status,
                notes = EXCLUDED.notes,
                judge_id = EXCLUDED.judge_id,
                recorded_at = CURRENT_TIMESTAMP
            RETURNING result_id, client_id, athlete_id, competition_id, value, status,
                      notes, judge_id, recorded_at
            "#,
        )
        .bind(new.client_id)
        .bind(new.athlete_id)
        .bind(new.competition_id)
        .bind(new.value)
        .bind(new.status)
        .bind(new.notes)
        .bind(new.judge_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(result)
    }
}
