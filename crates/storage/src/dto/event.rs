use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use super::common::validate_slug;
use crate::models::{Branding, Event, EventStatus, RegistrationRules, ScoringRules};

/// Request payload for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Slug must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub registration_deadline: NaiveDateTime,

    #[validate(range(min = 1, message = "max_teams must be positive"))]
    pub max_teams: Option<i32>,

    #[serde(default)]
    pub scoring_rules: ScoringRules,

    #[serde(default)]
    pub registration_rules: RegistrationRules,

    #[serde(default)]
    pub branding: Branding,
}

/// Request payload for updating an event; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    pub registration_deadline: Option<NaiveDateTime>,

    #[validate(range(min = 1))]
    pub max_teams: Option<i32>,

    pub scoring_rules: Option<ScoringRules>,

    pub registration_rules: Option<RegistrationRules>,

    pub branding: Option<Branding>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ChangeEventStatusRequest {
    pub status: EventStatus,
}

/// Cross-field checks shared by create and update.
pub fn check_event_fields(
    start_date: NaiveDate,
    end_date: NaiveDate,
    registration_deadline: NaiveDateTime,
    scoring_rules: &ScoringRules,
    registration_rules: &RegistrationRules,
) -> Result<(), &'static str> {
    if end_date < start_date {
        return Err("End date must be on or after start date");
    }
    if registration_deadline.date() > start_date {
        return Err("Registration must close before the event starts");
    }
    scoring_rules.validate_table()?;
    if registration_rules.min_athletes > registration_rules.max_athletes {
        return Err("min_athletes cannot exceed max_athletes");
    }
    Ok(())
}

impl CreateEventRequest {
    pub fn validate_fields(&self) -> Result<(), &'static str> {
        check_event_fields(
            self.start_date,
            self.end_date,
            self.registration_deadline,
            &self.scoring_rules,
            &self.registration_rules,
        )
    }
}

impl UpdateEventRequest {
    /// Merges the request into `event`.
    pub fn apply(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(slug) = self.slug {
            event.slug = slug;
        }
        if self.location.is_some() {
            event.location = self.location;
        }
        if let Some(start_date) = self.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            event.end_date = end_date;
        }
        if let Some(deadline) = self.registration_deadline {
            event.registration_deadline = deadline;
        }
        if self.max_teams.is_some() {
            event.max_teams = self.max_teams;
        }
        if let Some(rules) = self.scoring_rules {
            event.scoring_rules = Json(rules);
        }
        if let Some(rules) = self.registration_rules {
            event.registration_rules = Json(rules);
        }
        if let Some(branding) = self.branding {
            event.branding = Json(branding);
        }
    }
}
