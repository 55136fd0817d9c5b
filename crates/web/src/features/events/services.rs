use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::{
        common::PaginationParams,
        competition::CreateCompetitionRequest,
        event::{CreateEventRequest, UpdateEventRequest, check_event_fields},
        team::CreateTeamRequest,
    },
    error::{Result, StorageError},
    models::{Competition, Event, EventStatus, RegistrationStatus, Team},
    repository::{CompetitionRepository, EventRepository, TeamRepository},
    services::lifecycle,
};

use crate::error::{WebError, WebResult};

pub async fn list_events(pool: &PgPool, pagination: &PaginationParams) -> Result<(Vec<Event>, i64)> {
    let repo = EventRepository::new(pool);
    repo.list(pagination).await
}

pub async fn get_event(pool: &PgPool, event_id: uuid::Uuid) -> Result<Event> {
    let repo = EventRepository::new(pool);
    repo.find_by_id(event_id).await
}

pub async fn get_event_by_slug(pool: &PgPool, slug: &str) -> Result<Event> {
    let repo = EventRepository::new(pool);
    repo.find_by_slug(slug).await
}

pub async fn create_event(pool: &PgPool, request: &CreateEventRequest) -> Result<Event> {
    let repo = EventRepository::new(pool);
    let event = repo.create(request).await?;
    tracing::info!(event_id = %event.event_id, slug = %event.slug, "Event created");
    Ok(event)
}

/// Merges the update into the stored event and re-checks the cross-field
/// rules on the result.
pub async fn update_event(
    pool: &PgPool,
    event_id: uuid::Uuid,
    request: UpdateEventRequest,
) -> WebResult<Event> {
    let repo = EventRepository::new(pool);
    let mut event = repo.find_by_id(event_id).await?;
    ensure_not_archived(&event)?;

    request.apply(&mut event);
    check_event_fields(
        event.start_date,
        event.end_date,
        event.registration_deadline,
        &event.scoring_rules,
        &event.registration_rules,
    )
    .map_err(|e| WebError::BadRequest(e.to_string()))?;

    Ok(repo.update(&event).await?)
}

pub async fn delete_event(pool: &PgPool, event_id: uuid::Uuid) -> Result<()> {
    let repo = EventRepository::new(pool);
    repo.delete(event_id).await
}

pub async fn change_status(pool: &PgPool, event_id: uuid::Uuid, to: EventStatus) -> Result<Event> {
    lifecycle::change_event_status(pool, event_id, to, Utc::now().naive_utc()).await
}

pub async fn list_competitions(pool: &PgPool, event_id: uuid::Uuid) -> Result<Vec<Competition>> {
    EventRepository::new(pool).find_by_id(event_id).await?;
    CompetitionRepository::new(pool).list_by_event(event_id).await
}

pub async fn create_competition(
    pool: &PgPool,
    event_id: uuid::Uuid,
    request: &CreateCompetitionRequest,
) -> Result<Competition> {
    let event = EventRepository::new(pool).find_by_id(event_id).await?;
    ensure_not_archived(&event)?;

    CompetitionRepository::new(pool).create(event_id, request).await
}

pub async fn list_teams(
    pool: &PgPool,
    event_id: uuid::Uuid,
    status: Option<RegistrationStatus>,
) -> Result<Vec<Team>> {
    EventRepository::new(pool).find_by_id(event_id).await?;
    TeamRepository::new(pool).list_by_event(event_id, status).await
}

/// Teams can be registered until the event starts.
pub async fn create_team(
    pool: &PgPool,
    event_id: uuid::Uuid,
    request: &CreateTeamRequest,
) -> Result<Team> {
    let event = EventRepository::new(pool).find_by_id(event_id).await?;
    if !matches!(event.status, EventStatus::Draft | EventStatus::Open) {
        return Err(StorageError::Forbidden(
            "registration for this event is closed".to_string(),
        ));
    }

    TeamRepository::new(pool).create(event_id, request).await
}

pub fn ensure_not_archived(event: &Event) -> Result<()> {
    if event.status.is_archived() {
        return Err(StorageError::Forbidden(
            "event is completed and can no longer be changed".to_string(),
        ));
    }
    Ok(())
}
