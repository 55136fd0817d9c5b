use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::{
        athlete::CreateAthleteRequest,
        team::{UpdateTeamRequest, UpsertDocumentRequest},
    },
    error::Result,
    models::{Athlete, RegistrationStatus, Team, TeamDocument},
    repository::{AthleteRepository, TeamRepository},
    services::{lifecycle, registration::RegistrationReport},
};
use uuid::Uuid;

use crate::error::WebResult;
use crate::features::athletes::{self, editable_team};

pub async fn get_team(pool: &PgPool, team_id: Uuid) -> Result<Team> {
    let repo = TeamRepository::new(pool);
    repo.find_by_id(team_id).await
}

pub async fn update_team(
    pool: &PgPool,
    team_id: Uuid,
    request: UpdateTeamRequest,
) -> Result<Team> {
    let mut team = editable_team(pool, team_id).await?;
    request.apply(&mut team);

    TeamRepository::new(pool).update(&team).await
}

pub async fn delete_team(pool: &PgPool, team_id: Uuid) -> Result<()> {
    editable_team(pool, team_id).await?;
    TeamRepository::new(pool).delete(team_id).await
}

pub async fn change_status(pool: &PgPool, team_id: Uuid, to: RegistrationStatus) -> Result<Team> {
    lifecycle::change_team_status(pool, team_id, to, Utc::now().naive_utc()).await
}

pub async fn registration_check(pool: &PgPool, team_id: Uuid) -> Result<RegistrationReport> {
    let team = TeamRepository::new(pool).find_by_id(team_id).await?;
    lifecycle::registration_report(pool, &team).await
}

pub async fn list_athletes(pool: &PgPool, team_id: Uuid) -> Result<Vec<Athlete>> {
    TeamRepository::new(pool).find_by_id(team_id).await?;
    AthleteRepository::new(pool).list_by_team(team_id).await
}

pub async fn create_athlete(
    pool: &PgPool,
    team_id: Uuid,
    request: &CreateAthleteRequest,
) -> WebResult<Athlete> {
    athletes::create_athlete(pool, team_id, request).await
}

pub async fn list_documents(pool: &PgPool, team_id: Uuid) -> Result<Vec<TeamDocument>> {
    TeamRepository::new(pool).find_by_id(team_id).await?;
    TeamRepository::new(pool).documents(team_id).await
}

pub async fn upsert_document(
    pool: &PgPool,
    team_id: Uuid,
    request: &UpsertDocumentRequest,
) -> Result<TeamDocument> {
    editable_team(pool, team_id).await?;
    let document = TeamRepository::new(pool)
        .upsert_document(team_id, request)
        .await?;
    tracing::debug!(%team_id, kind = %document.kind, "Document stored");
    Ok(document)
}

pub async fn delete_document(pool: &PgPool, team_id: Uuid, kind: &str) -> Result<()> {
    editable_team(pool, team_id).await?;
    TeamRepository::new(pool).delete_document(team_id, kind).await
}
