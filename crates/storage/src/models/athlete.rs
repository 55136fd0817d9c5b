use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Athlete {
    pub athlete_id: Uuid,
    pub team_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_year: i32,
    pub category: AgeCategory,
    pub gender: Gender,
    /// Competitions the athlete is entered in, sorted by id.
    pub competition_ids: Vec<Uuid>,
    pub created_at: chrono::NaiveDateTime,
}

impl Athlete {
    pub fn is_entered_in(&self, competition_id: Uuid) -> bool {
        self.competition_ids.contains(&competition_id)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "age_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Junior,
    Senior,
}
