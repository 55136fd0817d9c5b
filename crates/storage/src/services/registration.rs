//! Team registration readiness check.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::models::{Athlete, Gender, RegistrationRules, Team, TeamDocument};

/// One unmet registration condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RegistrationIssue {
    MissingTeamName,
    MissingOrganizationType,
    MissingCoachEmail,
    InvalidCoachEmail { email: String },
    TooFewAthletes { count: u32, min: u32 },
    TooManyAthletes { count: u32, max: u32 },
    AthleteWithoutCompetition { athlete_id: uuid::Uuid, name: String },
    MissingDocument { kind: String },
    GenderQuotaExceeded { gender: Gender, count: u32, max: u32 },
}

impl fmt::Display for RegistrationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTeamName => write!(f, "team name is required"),
            Self::MissingOrganizationType => write!(f, "organization type is required"),
            Self::MissingCoachEmail => write!(f, "coach email is required"),
            Self::InvalidCoachEmail { email } => write!(f, "'{email}' is not a valid email"),
            Self::TooFewAthletes { count, min } => {
                write!(f, "team has {count} athlete(s), at least {min} required")
            }
            Self::TooManyAthletes { count, max } => {
                write!(f, "team has {count} athlete(s), at most {max} allowed")
            }
            Self::AthleteWithoutCompetition { name, .. } => {
                write!(f, "{name} is not entered in any competition")
            }
            Self::MissingDocument { kind } => write!(f, "document '{kind}' has not been uploaded"),
            Self::GenderQuotaExceeded { gender, count, max } => {
                write!(f, "{count} {} athlete(s), at most {max} allowed", gender.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationReport {
    pub issues: Vec<RegistrationIssue>,
}

impl RegistrationReport {
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for RegistrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Lists every condition that keeps the team from being submitted.
pub fn check_registration(
    team: &Team,
    athletes: &[Athlete],
    documents: &[TeamDocument],
    rules: &RegistrationRules,
) -> RegistrationReport {
    let mut issues = Vec::new();

    if team.name.trim().is_empty() {
        issues.push(RegistrationIssue::MissingTeamName);
    }

    if team.organization_type.is_none() {
        issues.push(RegistrationIssue::MissingOrganizationType);
    }

    match team.coach_email.as_deref().map(str::trim) {
        None | Some("") => issues.push(RegistrationIssue::MissingCoachEmail),
        Some(email) if !email.validate_email() => {
            issues.push(RegistrationIssue::InvalidCoachEmail {
                email: email.to_string(),
            })
        }
        Some(_) => {}
    }

    let count = athletes.len() as u32;
    if count < rules.min_athletes {
        issues.push(RegistrationIssue::TooFewAthletes {
            count,
            min: rules.min_athletes,
        });
    }
    if count > rules.max_athletes {
        issues.push(RegistrationIssue::TooManyAthletes {
            count,
            max: rules.max_athletes,
        });
    }

    for athlete in athletes.iter().filter(|a| a.competition_ids.is_empty()) {
        issues.push(RegistrationIssue::AthleteWithoutCompetition {
            athlete_id: athlete.athlete_id,
            name: format!("{} {}", athlete.first_name, athlete.last_name),
        });
    }

    for kind in &rules.required_documents {
        let uploaded = documents
            .iter()
            .any(|d| &d.kind == kind && d.is_uploaded());
        if !uploaded {
            issues.push(RegistrationIssue::MissingDocument { kind: kind.clone() });
        }
    }

    let limits = [
        (Gender::Male, rules.max_per_gender.male),
        (Gender::Female, rules.max_per_gender.female),
    ];
    for (gender, limit) in limits {
        let Some(max) = limit else { continue };
        let count = athletes.iter().filter(|a| a.gender == gender).count() as u32;
        if count > max {
            issues.push(RegistrationIssue::GenderQuotaExceeded { gender, count, max });
        }
    }

    RegistrationReport { issues }
}
