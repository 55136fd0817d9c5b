use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{
    AgeCategory, Competition, CompetitionStatus, CompetitionType, Gender, ScoringType, Zone,
};

/// Request payload for adding a competition to an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub competition_type: CompetitionType,

    pub scoring_type: ScoringType,

    pub ascending: Option<bool>,

    #[serde(default)]
    pub zones: Vec<Zone>,

    #[validate(range(min = 1, message = "max_participants must be positive"))]
    pub max_participants: Option<i32>,

    pub max_value: Option<Decimal>,

    #[serde(default)]
    pub allowed_genders: Vec<Gender>,

    #[serde(default)]
    pub allowed_categories: Vec<AgeCategory>,

    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCompetitionRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub competition_type: Option<CompetitionType>,

    pub scoring_type: Option<ScoringType>,

    pub ascending: Option<bool>,

    pub zones: Option<Vec<Zone>>,

    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,

    pub max_value: Option<Decimal>,

    pub allowed_genders: Option<Vec<Gender>>,

    pub allowed_categories: Option<Vec<AgeCategory>>,

    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ChangeCompetitionStatusRequest {
    pub status: CompetitionStatus,
    /// Allows moving back, e.g. reopening a completed competition.
    #[serde(default)]
    pub admin_override: bool,
}

pub fn check_scoring(zones: &[Zone], max_value: Option<Decimal>) -> Result<(), &'static str> {
    if zones.iter().any(|z| z.name.trim().is_empty()) {
        return Err("Zone names cannot be empty");
    }
    if zones.iter().any(|z| z.points.is_sign_negative() && !z.points.is_zero()) {
        return Err("Zone points cannot be negative");
    }
    if max_value.is_some_and(|m| m.is_sign_negative() && !m.is_zero()) {
        return Err("max_value cannot be negative");
    }
    Ok(())
}

impl CreateCompetitionRequest {
    pub fn validate_scoring(&self) -> Result<(), &'static str> {
        check_scoring(&self.zones, self.max_value)
    }
}

impl UpdateCompetitionRequest {
    pub fn apply(self, competition: &mut Competition) {
        if let Some(name) = self.name {
            competition.name = name;
        }
        if let Some(competition_type) = self.competition_type {
            competition.competition_type = competition_type;
        }
        if let Some(scoring_type) = self.scoring_type {
            competition.scoring_type = scoring_type;
        }
        if self.ascending.is_some() {
            competition.ascending = self.ascending;
        }
        if let Some(zones) = self.zones {
            competition.zones = Json(zones);
        }
        if self.max_participants.is_some() {
            competition.max_participants = self.max_participants;
        }
        if self.max_value.is_some() {
            competition.max_value = self.max_value;
        }
        if let Some(genders) = self.allowed_genders {
            competition.allowed_genders = Json(genders);
        }
        if let Some(categories) = self.allowed_categories {
            competition.allowed_categories = Json(categories);
        }
        if let Some(display_order) = self.display_order {
            competition.display_order = display_order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_create_request_wire_format() {
        let req: CreateCompetitionRequest = serde_json::from_value(serde_json::json!({
            "name": "Strzelectwo z broni krótkiej",
            "competition_type": "shooting",
            "scoring_type": "points",
            "zones": [{ "name": "10", "points": "10" }, { "name": "9", "points": "9" }],
            "allowed_genders": ["female"]
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(req.validate_scoring().is_ok());
        assert_eq!(req.zones.len(), 2);
        assert_eq!(req.allowed_genders, vec![Gender::Female]);
        assert_eq!(req.display_order, 0);
    }

    #[test]
    fn test_negative_scoring_rejected() {
        let zones = vec![Zone {
            name: "pudło".to_string(),
            points: Decimal::from_str("-1").unwrap(),
        }];
        assert!(check_scoring(&zones, None).is_err());
        assert!(check_scoring(&[], Some(Decimal::from(-5))).is_err());
        assert!(check_scoring(&[], Some(Decimal::ZERO)).is_ok());
    }
}
