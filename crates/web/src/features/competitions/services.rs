use sqlx::PgPool;
use storage::{
    dto::competition::{UpdateCompetitionRequest, check_scoring},
    error::Result,
    models::{Competition, CompetitionStatus},
    repository::{CompetitionRepository, EventRepository},
    services::lifecycle,
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::features::events::ensure_not_archived;

/// Get competition by id
pub async fn get_competition(pool: &PgPool, competition_id: Uuid) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.find_by_id(competition_id).await
}

/// Update a competition of a not yet completed event
pub async fn update_competition(
    pool: &PgPool,
    competition_id: Uuid,
    request: UpdateCompetitionRequest,
) -> WebResult<Competition> {
    let repo = CompetitionRepository::new(pool);
    let mut competition = repo.find_by_id(competition_id).await?;

    let event = EventRepository::new(pool)
        .find_by_id(competition.event_id)
        .await?;
    ensure_not_archived(&event)?;

    request.apply(&mut competition);
    check_scoring(&competition.zones, competition.max_value)
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    Ok(repo.update(&competition).await?)
}

/// Delete a competition without results
pub async fn delete_competition(pool: &PgPool, competition_id: Uuid) -> Result<()> {
    let repo = CompetitionRepository::new(pool);
    repo.delete(competition_id).await
}

pub async fn change_status(
    pool: &PgPool,
    competition_id: Uuid,
    to: CompetitionStatus,
    admin_override: bool,
) -> Result<Competition> {
    lifecycle::change_competition_status(pool, competition_id, to, admin_override).await
}
