use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::team::{CreateTeamRequest, UpsertDocumentRequest};
use crate::error::{Result, StorageError};
use crate::models::{RegistrationStatus, Team, TeamDocument, concurrent};

const TEAM_COLUMNS: &str = r#"
    team_id, event_id, name, organization_type, region, coach_name, coach_email,
    coach_phone, registration_status, documents_verified, start_number, created_at
"#;

pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Teams of an event, numbered teams first in start order.
    pub async fn list_by_event(
        &self,
        event_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<Team>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_by_event_in(&mut conn, event_id, status).await
    }

    pub async fn list_by_event_in(
        conn: &mut PgConnection,
        event_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(&format!(
            r#"
            SELECT {TEAM_COLUMNS}
            FROM teams
            WHERE event_id = $1
              AND ($2::registration_status IS NULL OR registration_status = $2)
            ORDER BY start_number NULLS LAST, name, team_id
            "#
        ))
        .bind(event_id)
        .bind(status)
        .fetch_all(conn)
        .await?;

        Ok(teams)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, event_id: Uuid, req: &CreateTeamRequest) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            r#"
            INSERT INTO teams (
                event_id, name, organization_type, region, coach_name, coach_email, coach_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(&req.name)
        .bind(req.organization_type)
        .bind(&req.region)
        .bind(&req.coach_name)
        .bind(&req.coach_email)
        .bind(&req.coach_phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).constraint("Team already exists", "Event does not exist"))
    }

    pub async fn update(&self, team: &Team) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            r#"
            UPDATE teams
            SET name = $2,
                organization_type = $3,
                region = $4,
                coach_name = $5,
                coach_email = $6,
                coach_phone = $7
            WHERE team_id = $1
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(team.team_id)
        .bind(&team.name)
        .bind(team.organization_type)
        .bind(&team.region)
        .bind(&team.coach_name)
        .bind(&team.coach_email)
        .bind(&team.coach_phone)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Re-reads the team under a row lock.
    pub async fn find_for_update(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Moves the registration from `from` to `to`. Fails if the stored status
    /// is no longer `from`.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            r#"
            UPDATE teams
            SET registration_status = $3
            WHERE team_id = $1 AND registration_status = $2
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| concurrent("team registration", from).into())
    }

    pub async fn count_by_status(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        status: RegistrationStatus,
    ) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM teams WHERE event_id = $1 AND registration_status = $2",
        )
        .bind(event_id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count)
    }

    /// Accepts a submitted team and hands out the next free start number.
    /// Callers hold the event lock.
    pub async fn accept(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        team_id: Uuid,
    ) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            r#"
            UPDATE teams
            SET registration_status = 'accepted',
                documents_verified = TRUE,
                start_number = (
                    SELECT COALESCE(MAX(start_number), 0) + 1
                    FROM teams
                    WHERE event_id = $1
                )
            WHERE team_id = $2 AND event_id = $1 AND registration_status = 'submitted'
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(team_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StorageError::from(e).constraint("Start number already taken", "Invalid reference"))?
        .ok_or_else(|| concurrent("team registration", RegistrationStatus::Submitted).into())
    }

    /// Deletes the team and its roster. Refused by the database while any of
    /// its athletes has a recorded result.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM teams WHERE team_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                StorageError::from(e).constraint(
                    "Team already exists",
                    "Team has recorded results and cannot be deleted",
                )
            })?;

        if deleted.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    pub async fn documents(&self, team_id: Uuid) -> Result<Vec<TeamDocument>> {
        let documents = sqlx::query_as::<_, TeamDocument>(
            r#"
            SELECT document_id, team_id, kind, file_url, uploaded_at
            FROM team_documents
            WHERE team_id = $1
            ORDER BY kind
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(documents)
    }

    /// Stores a document, replacing an earlier upload of the same kind.
    pub async fn upsert_document(
        &self,
        team_id: Uuid,
        req: &UpsertDocumentRequest,
    ) -> Result<TeamDocument> {
        sqlx::query_as::<_, TeamDocument>(
            r#"
            INSERT INTO team_documents (team_id, kind, file_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id, kind)
            DO UPDATE SET file_url = EXCLUDED.file_url, uploaded_at = CURRENT_TIMESTAMP
            RETURNING document_id, team_id, kind, file_url, uploaded_at
            "#,
        )
        .bind(team_id)
        .bind(&req.kind)
        .bind(&req.file_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).constraint("Document already exists", "Team does not exist"))
    }

    pub async fn delete_document(&self, team_id: Uuid, kind: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM team_documents WHERE team_id = $1 AND kind = $2")
            .bind(team_id)
            .bind(kind)
            .execute(self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
