use sqlx::PgPool;
use storage::{
    error::{Result, StorageError},
    models::{Competition, CompetitionStatus, Event, StartListEntry},
    repository::{CompetitionRepository, EventRepository, StartListRepository},
};
use uuid::Uuid;

use crate::features::events::ensure_not_archived;

pub async fn get_start_list(pool: &PgPool, competition_id: Uuid) -> Result<Vec<StartListEntry>> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;
    StartListRepository::new(pool).list(competition_id).await
}

/// The start list of a completed competition, or of any competition in a
/// completed event, is frozen.
fn ensure_start_list_editable(event: &Event, competition: &Competition) -> Result<()> {
    ensure_not_archived(event)?;

    if competition.status == CompetitionStatus::Completed {
        return Err(StorageError::Forbidden(
            "competition is completed".to_string(),
        ));
    }
    Ok(())
}

async fn load_editable(pool: &PgPool, competition_id: Uuid) -> Result<Competition> {
    let competition = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;
    let event = EventRepository::new(pool)
        .find_by_id(competition.event_id)
        .await?;
    ensure_start_list_editable(&event, &competition)?;

    Ok(competition)
}

/// Draws the start list again from the accepted teams' entries.
pub async fn generate_start_list(
    pool: &PgPool,
    competition_id: Uuid,
) -> Result<Vec<StartListEntry>> {
    load_editable(pool, competition_id).await?;

    let entries = StartListRepository::new(pool)
        .generate(competition_id)
        .await?;
    tracing::info!(%competition_id, athletes = entries.len(), "Start list generated");

    Ok(entries)
}

pub async fn set_presence(
    pool: &PgPool,
    competition_id: Uuid,
    athlete_id: Uuid,
    present: bool,
) -> Result<StartListEntry> {
    load_editable(pool, competition_id).await?;

    StartListRepository::new(pool)
        .set_presence(competition_id, athlete_id, present)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sqlx::types::Json;
    use storage::models::{
        Branding, CompetitionType, EventStatus, RegistrationRules, ScoringRules, ScoringType,
    };

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn event(status: EventStatus) -> Event {
        Event {
            event_id: Uuid::from_u128(1),
            name: "Zawody Obronne".to_string(),
            slug: "zawody-obronne".to_string(),
            location: None,
            start_date: ts().date(),
            end_date: ts().date(),
            registration_deadline: ts(),
            status,
            max_teams: None,
            scoring_rules: Json(ScoringRules::default()),
            registration_rules: Json(RegistrationRules::default()),
            branding: Json(Branding::default()),
            created_at: ts(),
        }
    }

    fn competition(status: CompetitionStatus) -> Competition {
        Competition {
            competition_id: Uuid::from_u128(10),
            event_id: Uuid::from_u128(1),
            name: "Strzelectwo".to_string(),
            competition_type: CompetitionType::Shooting,
            scoring_type: ScoringType::Points,
            ascending: None,
            zones: Json(vec![]),
            max_participants: None,
            max_value: None,
            status,
            allowed_genders: Json(vec![]),
            allowed_categories: Json(vec![]),
            display_order: 0,
            created_at: ts(),
        }
    }

    #[test]
    fn test_start_list_editable_while_running() {
        assert!(
            ensure_start_list_editable(
                &event(EventStatus::InProgress),
                &competition(CompetitionStatus::InProgress)
            )
            .is_ok()
        );
        assert!(
            ensure_start_list_editable(
                &event(EventStatus::Open),
                &competition(CompetitionStatus::Pending)
            )
            .is_ok()
        );
    }

    #[test]
    fn test_start_list_frozen_in_completed_event() {
        let err = ensure_start_list_editable(
            &event(EventStatus::Completed),
            &competition(CompetitionStatus::InProgress),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
    }

    #[test]
    fn test_start_list_frozen_in_completed_competition() {
        let err = ensure_start_list_editable(
            &event(EventStatus::InProgress),
            &competition(CompetitionStatus::Completed),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
    }
}
