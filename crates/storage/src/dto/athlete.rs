use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AgeCategory, Athlete, Gender};

/// Request payload for adding an athlete to a team roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAthleteRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "First name must be between 1 and 255 characters"
    ))]
    pub first_name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Last name must be between 1 and 255 characters"
    ))]
    pub last_name: String,

    #[validate(range(min = 1900, max = 2100, message = "Birth year is out of range"))]
    pub birth_year: i32,

    pub category: AgeCategory,

    pub gender: Gender,

    /// Competitions of the team's event the athlete is entered in.
    #[serde(default)]
    pub competition_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAthleteRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub birth_year: Option<i32>,

    pub category: Option<AgeCategory>,

    pub gender: Option<Gender>,

    /// Replaces the athlete's entries when present.
    pub competition_ids: Option<Vec<Uuid>>,
}

impl UpdateAthleteRequest {
    pub fn apply(self, athlete: &mut Athlete) {
        if let Some(first_name) = self.first_name {
            athlete.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            athlete.last_name = last_name;
        }
        if let Some(birth_year) = self.birth_year {
            athlete.birth_year = birth_year;
        }
        if let Some(category) = self.category {
            athlete.category = category;
        }
        if let Some(gender) = self.gender {
            athlete.gender = gender;
        }
        if let Some(mut competition_ids) = self.competition_ids {
            competition_ids.sort();
            competition_ids.dedup();
            athlete.competition_ids = competition_ids;
        }
    }
}
