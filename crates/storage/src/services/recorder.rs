//! Result recording.
//!
//! A submission is checked in full before anything is written. Writes happen
//! in one transaction: the replaced result (if any) goes to the history table,
//! the new one takes its place, the start list entry is ticked off and a
//! pending competition is moved to in_progress.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::result::{RecordResultRequest, RecordResultResponse};
use crate::error::Result;
use crate::models::{
    Athlete, Competition, CompetitionStatus, Event, EventStatus, RegistrationStatus, ResultStatus,
    ScoringType, Team,
};
use crate::repository::{
    AthleteRepository, CompetitionRepository, EventRepository, NewResult, ResultRepository,
    StartListRepository, TeamRepository,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{value} is not one of the zone values: {allowed}")]
    NotAZoneValue { value: Decimal, allowed: String },

    #[error("value cannot be negative")]
    Negative,

    #[error("time must be greater than zero")]
    NonPositiveTime,

    #[error("{value} exceeds the maximum of {max}")]
    AboveMaximum { value: Decimal, max: Decimal },

    #[error("{0} has more than 3 decimal places")]
    TooPrecise(Decimal),

    #[error("{0} is out of range")]
    OutOfRange(Decimal),

    #[error("athlete is not entered in this competition")]
    AthleteNotEntered,

    #[error("athlete's team has not been accepted")]
    TeamNotAccepted,

    #[error("competition is already completed")]
    CompetitionCompleted,

    #[error("event is not in progress")]
    EventNotInProgress,
}

/// Matches the `NUMERIC(12, 3)` result column.
const MAX_SCALE: u32 = 3;
const MAX_INTEGER_DIGITS: u32 = 9;

/// Parses and checks a raw value against the competition's scoring rules.
///
/// Non-active statuses always store 0, whatever was typed in.
pub fn normalize_value(
    competition: &Competition,
    raw: &str,
    status: ResultStatus,
) -> std::result::Result<Decimal, ResultValidationError> {
    if !status.counts_for_points() {
        return Ok(Decimal::ZERO);
    }

    let trimmed = raw.trim();
    let value = Decimal::from_str(&trimmed.replace(',', "."))
        .map_err(|_| ResultValidationError::NotANumber(trimmed.to_string()))?
        .normalize();

    if value.scale() > MAX_SCALE {
        return Err(ResultValidationError::TooPrecise(value));
    }
    if value.abs() >= Decimal::from(10u64.pow(MAX_INTEGER_DIGITS)) {
        return Err(ResultValidationError::OutOfRange(value));
    }

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ResultValidationError::Negative);
    }

    if competition.scoring_type == ScoringType::Time && value.is_zero() {
        return Err(ResultValidationError::NonPositiveTime);
    }

    if competition.is_zone_based() {
        let allowed = competition.zone_values();
        if !allowed.contains(&value) {
            return Err(ResultValidationError::NotAZoneValue {
                value,
                allowed: allowed
                    .iter()
                    .map(Decimal::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }

    if let Some(max) = competition.max_value {
        if value > max {
            return Err(ResultValidationError::AboveMaximum { value, max });
        }
    }

    Ok(value)
}

/// Checks that a result may be recorded for this athlete right now.
pub fn check_entry(
    event: &Event,
    competition: &Competition,
    team: &Team,
    athlete: &Athlete,
) -> std::result::Result<(), ResultValidationError> {
    if event.status != EventStatus::InProgress {
        return Err(ResultValidationError::EventNotInProgress);
    }
    if competition.status == CompetitionStatus::Completed {
        return Err(ResultValidationError::CompetitionCompleted);
    }
    if team.registration_status != RegistrationStatus::Accepted {
        return Err(ResultValidationError::TeamNotAccepted);
    }
    if !athlete.is_entered_in(competition.competition_id) {
        return Err(ResultValidationError::AthleteNotEntered);
    }
    Ok(())
}

pub async fn record_result(
    pool: &PgPool,
    req: &RecordResultRequest,
    judge_id: Option<&str>,
) -> Result<RecordResultResponse> {
    let results = ResultRepository::new(pool);
    let client_id = req.client_id.unwrap_or_else(Uuid::new_v4);

    if let Some(result) = results.find_by_client_id(client_id).await? {
        debug!(%client_id, "Result already recorded, returning stored copy");
        return Ok(RecordResultResponse {
            result,
            superseded: false,
            duplicate: true,
        });
    }

    let competition = CompetitionRepository::new(pool)
        .find_by_id(req.competition_id)
        .await?;
    let event = EventRepository::new(pool)
        .find_by_id(competition.event_id)
        .await?;
    let athlete = AthleteRepository::new(pool)
        .find_by_id(req.athlete_id)
        .await?;
    let team = TeamRepository::new(pool).find_by_id(athlete.team_id).await?;

    check_entry(&event, &competition, &team, &athlete)?;
    let value = normalize_value(&competition, &req.value, req.status)?;

    let outcome = write_result(pool, req, client_id, value, judge_id, &competition).await;

    match outcome {
        Ok(response) => {
            info!(
                athlete_id = %req.athlete_id,
                competition_id = %req.competition_id,
                %value,
                status = %req.status,
                superseded = response.superseded,
                "Result recorded"
            );
            Ok(response)
        }
        // Two deliveries of the same submission raced each other; the other one won.
        Err(e) if e.is_unique_violation() => match results.find_by_client_id(client_id).await? {
            Some(result) => Ok(RecordResultResponse {
                result,
                superseded: false,
                duplicate: true,
            }),
            None => Err(e),
        },
        Err(e) => Err(e),
    }
}

async fn write_result(
    pool: &PgPool,
    req: &RecordResultRequest,
    client_id: Uuid,
    value: Decimal,
    judge_id: Option<&str>,
    competition: &Competition,
) -> Result<RecordResultResponse> {
    let mut tx = pool.begin().await?;

    let previous =
        ResultRepository::find_for_update(&mut tx, req.athlete_id, req.competition_id).await?;
    if let Some(ref previous) = previous {
        ResultRepository::archive(&mut tx, previous).await?;
    }

    let result = ResultRepository::upsert(
        &mut tx,
        NewResult {
            client_id,
            athlete_id: req.athlete_id,
            competition_id: req.competition_id,
            value,
            status: req.status,
            notes: req.notes.as_deref(),
            judge_id,
        },
    )
    .await?;

    StartListRepository::mark_completed(&mut tx, req.competition_id, req.athlete_id).await?;

    if competition.status == CompetitionStatus::Pending
        && CompetitionRepository::start(&mut tx, competition.competition_id).await?
    {
        debug!(competition_id = %competition.competition_id, "Competition started by first result");
    }

    tx.commit().await?;

    Ok(RecordResultResponse {
        result,
        superseded: previous.is_some(),
        duplicate: false,
    })
}
