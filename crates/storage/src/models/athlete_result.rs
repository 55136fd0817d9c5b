use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::ResultStatus;

/// The current result of one athlete in one competition.
///
/// There is at most one row per (athlete, competition); a new submission
/// replaces it and the replaced content moves to [`AthleteResultHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AthleteResult {
    pub result_id: Uuid,
    /// Idempotency key generated by the submitting client.
    pub client_id: Uuid,
    pub athlete_id: Uuid,
    pub competition_id: Uuid,
    /// Points, seconds or meters depending on the competition's scoring type.
    pub value: Decimal,
    pub status: ResultStatus,
    pub notes: Option<String>,
    pub judge_id: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AthleteResultHistory {
    pub history_id: Uuid,
    pub result_id: Uuid,
    pub client_id: Uuid,
    pub value: Decimal,
    pub status: ResultStatus,
    pub notes: Option<String>,
    pub judge_id: Option<String>,
    pub recorded_at: NaiveDateTime,
    pub superseded_at: NaiveDateTime,
}
