//! Status changes for events, competitions and team registrations.
//!
//! The allowed moves live on the status enums; this module gathers the facts
//! they need from the database and persists the outcome.

use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Competition, CompetitionStatus, Event, EventGuard, EventStatus, RegistrationStatus, Team,
    TransitionError,
};
use crate::repository::{AthleteRepository, CompetitionRepository, EventRepository, TeamRepository};
use crate::services::registration::{RegistrationReport, check_registration};

/// Runs under the event lock, so a team cannot be submitted between the
/// unresolved count and the status change.
pub async fn change_event_status(
    pool: &PgPool,
    event_id: Uuid,
    to: EventStatus,
    now: NaiveDateTime,
) -> Result<Event> {
    let mut tx = pool.begin().await?;

    let event = EventRepository::lock(&mut tx, event_id).await?;
    let unresolved_teams =
        TeamRepository::count_by_status(&mut tx, event_id, RegistrationStatus::Submitted).await?;

    let guard = EventGuard {
        now,
        registration_deadline: event.registration_deadline,
        unresolved_teams,
    };
    let next = event.status.transition(to, &guard)?;
    let updated = EventRepository::set_status(&mut tx, event_id, event.status, next).await?;
    tx.commit().await?;

    info!(%event_id, from = %event.status, to = %next, "Event status changed");
    Ok(updated)
}

pub async fn change_competition_status(
    pool: &PgPool,
    competition_id: Uuid,
    to: CompetitionStatus,
    admin_override: bool,
) -> Result<Competition> {
    let event_id = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?
        .event_id;

    let mut tx = pool.begin().await?;
    let event = EventRepository::lock(&mut tx, event_id).await?;
    let competition = CompetitionRepository::find_for_update(&mut tx, competition_id).await?;

    if event.status.is_archived() && !admin_override {
        return Err(StorageError::Forbidden(
            "event is completed; reopening a competition needs an admin override".to_string(),
        ));
    }

    let next = competition.status.transition(to, admin_override)?;
    let updated =
        CompetitionRepository::set_status(&mut tx, competition_id, competition.status, next)
            .await?;
    tx.commit().await?;

    info!(
        %competition_id,
        from = %competition.status,
        to = %next,
        admin_override,
        "Competition status changed"
    );
    Ok(updated)
}

/// Builds the readiness report for a team from what is currently stored.
pub async fn registration_report(pool: &PgPool, team: &Team) -> Result<RegistrationReport> {
    let event = EventRepository::new(pool).find_by_id(team.event_id).await?;
    let athletes = AthleteRepository::new(pool)
        .list_by_team(team.team_id)
        .await?;
    let documents = TeamRepository::new(pool).documents(team.team_id).await?;

    Ok(check_registration(
        team,
        &athletes,
        &documents,
        &event.registration_rules,
    ))
}

/// Runs under the event lock with the team row re-read, so concurrent
/// decisions on the same team or event apply one after the other.
pub async fn change_team_status(
    pool: &PgPool,
    team_id: Uuid,
    to: RegistrationStatus,
    now: NaiveDateTime,
) -> Result<Team> {
    let event_id = TeamRepository::new(pool).find_by_id(team_id).await?.event_id;

    let mut tx = pool.begin().await?;
    let event = EventRepository::lock(&mut tx, event_id).await?;
    let team = TeamRepository::find_for_update(&mut tx, team_id).await?;

    if event.status.is_archived() {
        return Err(StorageError::Forbidden("event is completed".to_string()));
    }

    let from = team.registration_status;
    let next = from.transition(to)?;

    let updated = match next {
        RegistrationStatus::Submitted => {
            if event.status != EventStatus::Open || now >= event.registration_deadline {
                return Err(TransitionError::RegistrationClosed.into());
            }
            let report = registration_report(pool, &team).await?;
            if !report.is_ready() {
                return Err(StorageError::RegistrationIncomplete(report));
            }
            TeamRepository::set_status(&mut tx, team_id, from, next).await?
        }
        RegistrationStatus::Accepted => accept_team(&mut tx, &event, team_id).await?,
        RegistrationStatus::Rejected | RegistrationStatus::Draft => {
            TeamRepository::set_status(&mut tx, team_id, from, next).await?
        }
    };
    tx.commit().await?;

    info!(
        %team_id,
        %from,
        to = %next,
        start_number = ?updated.start_number,
        "Team registration status changed"
    );
    Ok(updated)
}

/// Callers hold the event lock, which keeps start numbers dense.
async fn accept_team(
    tx: &mut Transaction<'_, Postgres>,
    event: &Event,
    team_id: Uuid,
) -> Result<Team> {
    if let Some(max_teams) = event.max_teams {
        let accepted =
            TeamRepository::count_by_status(tx, event.event_id, RegistrationStatus::Accepted)
                .await?;
        if accepted >= i64::from(max_teams) {
            return Err(StorageError::ConstraintViolation(format!(
                "event already has {accepted} accepted team(s), the maximum is {max_teams}"
            )));
        }
    }

    TeamRepository::accept(tx, event.event_id, team_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::Utc;

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    #[sqlx::test]
    async fn test_concurrent_accepts_hand_out_one_start_number(pool: PgPool) {
        let event_id = fixtures::event(&pool, EventStatus::Open, None).await;
        let team_id = fixtures::team(&pool, event_id, RegistrationStatus::Submitted, None).await;

        let (a, b) = tokio::join!(
            change_team_status(&pool, team_id, RegistrationStatus::Accepted, now()),
            change_team_status(&pool, team_id, RegistrationStatus::Accepted, now())
        );

        let (accepted, refused) = match (a, b) {
            (Ok(team), Err(e)) | (Err(e), Ok(team)) => (team, e),
            other => panic!("expected exactly one acceptance, got {other:?}"),
        };
        assert_eq!(accepted.start_number, Some(1));
        assert!(matches!(refused, StorageError::InvalidTransition(_)));

        let stored = TeamRepository::new(&pool).find_by_id(team_id).await.unwrap();
        assert_eq!(stored.start_number, Some(1));
    }

    #[sqlx::test]
    async fn test_reject_racing_accept_cannot_overwrite_it(pool: PgPool) {
        let event_id = fixtures::event(&pool, EventStatus::Open, None).await;
        let team_id = fixtures::team(&pool, event_id, RegistrationStatus::Submitted, None).await;

        let (accept, reject) = tokio::join!(
            change_team_status(&pool, team_id, RegistrationStatus::Accepted, now()),
            change_team_status(&pool, team_id, RegistrationStatus::Rejected, now())
        );
        assert!(accept.is_ok() ^ reject.is_ok());

        let stored = TeamRepository::new(&pool).find_by_id(team_id).await.unwrap();
        match stored.registration_status {
            RegistrationStatus::Accepted => assert_eq!(stored.start_number, Some(1)),
            RegistrationStatus::Rejected => assert_eq!(stored.start_number, None),
            other => panic!("unexpected status {other}"),
        }
    }

    #[sqlx::test]
    async fn test_stale_status_update_is_refused(pool: PgPool) {
        let event_id = fixtures::event(&pool, EventStatus::Open, None).await;
        let team_id = fixtures::team(&pool, event_id, RegistrationStatus::Accepted, Some(1)).await;

        let mut tx = pool.begin().await.unwrap();
        let err = TeamRepository::set_status(
            &mut tx,
            team_id,
            RegistrationStatus::Submitted,
            RegistrationStatus::Rejected,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidTransition(TransitionError::Concurrent { .. })
        ));
        assert!(matches!(
            TeamRepository::accept(&mut tx, event_id, team_id).await,
            Err(StorageError::InvalidTransition(TransitionError::Concurrent { .. }))
        ));
    }

    #[sqlx::test]
    async fn test_event_cannot_start_with_submitted_team(pool: PgPool) {
        let event_id = fixtures::event(&pool, EventStatus::Open, None).await;
        let team_id = fixtures::team(&pool, event_id, RegistrationStatus::Submitted, None).await;

        let err = change_event_status(&pool, event_id, EventStatus::InProgress, now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidTransition(TransitionError::UnresolvedTeams(1))
        ));

        change_team_status(&pool, team_id, RegistrationStatus::Accepted, now())
            .await
            .unwrap();
        let event = change_event_status(&pool, event_id, EventStatus::InProgress, now())
            .await
            .unwrap();
        assert_eq!(event.status, EventStatus::InProgress);
    }

    #[sqlx::test]
    async fn test_max_teams_is_enforced_on_accept(pool: PgPool) {
        let event_id = fixtures::event(&pool, EventStatus::Open, Some(1)).await;
        fixtures::team(&pool, event_id, RegistrationStatus::Accepted, Some(1)).await;
        let waiting = fixtures::team(&pool, event_id, RegistrationStatus::Submitted, None).await;

        let err = change_team_status(&pool, waiting, RegistrationStatus::Accepted, now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }
}
