use sqlx::PgPool;
use storage::{
    dto::athlete::{CreateAthleteRequest, UpdateAthleteRequest},
    error::{Result, StorageError},
    models::{AgeCategory, Athlete, Gender, Team},
    repository::{AthleteRepository, CompetitionRepository, EventRepository, TeamRepository},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::features::events::ensure_not_archived;

/// Get athlete by id
pub async fn get_athlete(pool: &PgPool, athlete_id: Uuid) -> Result<Athlete> {
    let repo = AthleteRepository::new(pool);
    repo.find_by_id(athlete_id).await
}

/// Add an athlete to a team roster
pub async fn create_athlete(
    pool: &PgPool,
    team_id: Uuid,
    request: &CreateAthleteRequest,
) -> WebResult<Athlete> {
    let team = editable_team(pool, team_id).await?;

    check_entries(
        pool,
        &team,
        None,
        request.gender,
        request.category,
        &request.competition_ids,
    )
    .await?;

    let athlete = AthleteRepository::new(pool).create(team_id, request).await?;
    tracing::info!(athlete_id = %athlete.athlete_id, %team_id, "Athlete added to roster");

    Ok(athlete)
}

/// Update an athlete while the team registration can still be edited
pub async fn update_athlete(
    pool: &PgPool,
    athlete_id: Uuid,
    request: UpdateAthleteRequest,
) -> WebResult<Athlete> {
    let repo = AthleteRepository::new(pool);
    let mut athlete = repo.find_by_id(athlete_id).await?;
    let team = editable_team(pool, athlete.team_id).await?;

    request.apply(&mut athlete);
    check_entries(
        pool,
        &team,
        Some(athlete_id),
        athlete.gender,
        athlete.category,
        &athlete.competition_ids,
    )
    .await?;

    Ok(repo.update(&athlete).await?)
}

/// Delete an athlete
pub async fn delete_athlete(pool: &PgPool, athlete_id: Uuid) -> WebResult<()> {
    let repo = AthleteRepository::new(pool);
    let athlete = repo.find_by_id(athlete_id).await?;
    editable_team(pool, athlete.team_id).await?;

    Ok(repo.delete(athlete_id).await?)
}

/// Loads the team and refuses roster changes once it is accepted or rejected,
/// or once its event is completed.
pub async fn editable_team(pool: &PgPool, team_id: Uuid) -> Result<Team> {
    let team = TeamRepository::new(pool).find_by_id(team_id).await?;

    if !team.registration_status.is_editable() {
        return Err(StorageError::Forbidden(format!(
            "team registration is {} and can no longer be edited",
            team.registration_status
        )));
    }

    let event = EventRepository::new(pool).find_by_id(team.event_id).await?;
    ensure_not_archived(&event)?;

    Ok(team)
}

/// Every competition must belong to the team's event, admit the athlete and
/// have a free slot.
async fn check_entries(
    pool: &PgPool,
    team: &Team,
    athlete_id: Option<Uuid>,
    gender: Gender,
    category: AgeCategory,
    competition_ids: &[Uuid],
) -> WebResult<()> {
    let repo = CompetitionRepository::new(pool);

    for &competition_id in competition_ids {
        let competition = match repo.find_by_id(competition_id).await {
            Ok(competition) => competition,
            Err(StorageError::NotFound) => {
                return Err(WebError::BadRequest(format!(
                    "Competition {competition_id} does not exist"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if competition.event_id != team.event_id {
            return Err(WebError::BadRequest(format!(
                "Competition '{}' belongs to another event",
                competition.name
            )));
        }
        if !competition.admits_gender(gender) {
            return Err(WebError::BadRequest(format!(
                "Competition '{}' is not open to {} athletes",
                competition.name,
                gender.as_str()
            )));
        }
        if !competition.admits_category(category) {
            return Err(WebError::BadRequest(format!(
                "Competition '{}' is not open to this age category",
                competition.name
            )));
        }

        if let Some(max) = competition.max_participants {
            let entered = repo.count_entries(competition_id, athlete_id).await?;
            if entered >= i64::from(max) {
                return Err(StorageError::ConstraintViolation(format!(
                    "Competition '{}' is full ({max} participants)",
                    competition.name
                ))
                .into());
            }
        }
    }

    Ok(())
}
