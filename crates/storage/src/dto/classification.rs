use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{AgeCategory, Athlete, Gender, ResultStatus};

/// Restricts an individual classification to one gender and/or category.
/// Points are then distributed among the filtered athletes only.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassificationFilter {
    pub gender: Option<Gender>,
    pub category: Option<AgeCategory>,
}

impl ClassificationFilter {
    pub fn matches(&self, athlete: &Athlete) -> bool {
        self.gender.is_none_or(|g| g == athlete.gender)
            && self.category.is_none_or(|c| c == athlete.category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IndividualClassificationEntry {
    pub position: u32,
    pub athlete: ClassifiedAthlete,
    pub competitions: Vec<CompetitionScore>,
    pub total_points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassifiedAthlete {
    pub athlete_id: Uuid,
    pub team_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub category: AgeCategory,
}

/// An athlete's standing in one competition of the event.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompetitionScore {
    pub competition_id: Uuid,
    pub competition_name: String,
    /// `None` when nothing was recorded.
    pub value: Option<Decimal>,
    pub status: Option<ResultStatus>,
    /// Place among active results; `None` for missing or non-active results.
    pub place: Option<u32>,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamClassificationEntry {
    pub position: u32,
    pub team_id: Uuid,
    pub team_name: String,
    pub start_number: Option<i32>,
    pub total_points: i32,
    pub athletes: Vec<TeamMemberScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamMemberScore {
    pub athlete_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub total_points: i32,
}
