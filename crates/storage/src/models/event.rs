use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::EventStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_deadline: NaiveDateTime,
    pub status: EventStatus,
    pub max_teams: Option<i32>,
    #[schema(value_type = ScoringRules)]
    pub scoring_rules: Json<ScoringRules>,
    #[schema(value_type = RegistrationRules)]
    pub registration_rules: Json<RegistrationRules>,
    #[schema(value_type = Branding)]
    pub branding: Json<Branding>,
    pub created_at: NaiveDateTime,
}

/// How placings in a single competition turn into classification points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoringRules {
    /// Points for 1st, 2nd, 3rd... place. Places beyond the table score 0.
    #[serde(default = "default_points_distribution")]
    pub team_points_distribution: Vec<i32>,
    /// Applied in order to athletes with equal totals. Whatever is still
    /// tied afterwards shares the position.
    #[serde(default)]
    pub tie_breaking_rules: Vec<TieBreakRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TieBreakRule {
    /// Better place in the given competition wins; no place at all loses.
    DesignatedCompetition { competition_id: Uuid },
    /// More first places wins, then more second places, and so on.
    CountBack,
}

fn default_points_distribution() -> Vec<i32> {
    vec![15, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1]
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            team_points_distribution: default_points_distribution(),
            tie_breaking_rules: Vec::new(),
        }
    }
}

const MAX_POINTS_PER_PLACE: i32 = 10_000;

impl ScoringRules {
    pub fn points_for_place(&self, place: u32) -> i32 {
        place
            .checked_sub(1)
            .and_then(|idx| self.team_points_distribution.get(idx as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn validate_table(&self) -> Result<(), &'static str> {
        if self.team_points_distribution.is_empty() {
            return Err("Points distribution must contain at least one entry");
        }
        if self.team_points_distribution.iter().any(|p| *p < 0) {
            return Err("Points distribution cannot contain negative values");
        }
        if self.team_points_distribution.iter().any(|p| *p > MAX_POINTS_PER_PLACE) {
            return Err("Points distribution entries cannot exceed 10000");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationRules {
    #[serde(default = "default_min_athletes")]
    pub min_athletes: u32,
    #[serde(default = "default_max_athletes")]
    pub max_athletes: u32,
    #[serde(default)]
    pub max_per_gender: GenderLimits,
    /// Document kinds every team has to upload before submitting.
    #[serde(default)]
    pub required_documents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenderLimits {
    pub male: Option<u32>,
    pub female: Option<u32>,
}

fn default_min_athletes() -> u32 {
    3
}

fn default_max_athletes() -> u32 {
    6
}

impl Default for RegistrationRules {
    fn default() -> Self {
        Self {
            min_athletes: default_min_athletes(),
            max_athletes: default_max_athletes(),
            max_per_gender: GenderLimits::default(),
            required_documents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Branding {
    pub primary_color: Option<String>,
    pub logo_url: Option<String>,
}
