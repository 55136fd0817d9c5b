use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::athlete::{AgeCategory, Gender};
use super::status::CompetitionStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub competition_type: CompetitionType,
    pub scoring_type: ScoringType,
    /// Overrides the ranking direction implied by `scoring_type`.
    pub ascending: Option<bool>,
    #[schema(value_type = Vec<Zone>)]
    pub zones: Json<Vec<Zone>>,
    pub max_participants: Option<i32>,
    pub max_value: Option<Decimal>,
    pub status: CompetitionStatus,
    #[schema(value_type = Vec<Gender>)]
    pub allowed_genders: Json<Vec<Gender>>,
    #[schema(value_type = Vec<AgeCategory>)]
    pub allowed_categories: Json<Vec<AgeCategory>>,
    pub display_order: i32,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "competition_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompetitionType {
    Shooting,
    GrenadeThrow,
    CrossCountry,
    ObstacleCourse,
    FirstAid,
    Orienteering,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "scoring_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScoringType {
    Points,
    /// Seconds; lower is better.
    Time,
    /// Meters; higher is better.
    Distance,
}

impl ScoringType {
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Self::Time)
    }
}

/// A scoring zone, e.g. a target ring worth a fixed number of points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Zone {
    pub name: String,
    pub points: Decimal,
}

impl Competition {
    /// Whether lower values rank better in this competition.
    pub fn ranks_ascending(&self) -> bool {
        self.ascending
            .unwrap_or_else(|| self.scoring_type.lower_is_better())
    }

    pub fn is_zone_based(&self) -> bool {
        !self.zones.is_empty()
    }

    pub fn zone_values(&self) -> Vec<Decimal> {
        self.zones.iter().map(|z| z.points).collect()
    }

    pub fn admits_gender(&self, gender: Gender) -> bool {
        self.allowed_genders.is_empty() || self.allowed_genders.contains(&gender)
    }

    pub fn admits_category(&self, category: AgeCategory) -> bool {
        self.allowed_categories.is_empty() || self.allowed_categories.contains(&category)
    }
}
