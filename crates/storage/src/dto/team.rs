use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{OrganizationType, RegistrationStatus, Team};

/// Request payload for registering a team. Fields may be filled in gradually;
/// completeness is only enforced on submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub organization_type: Option<OrganizationType>,

    #[validate(length(max = 255))]
    pub region: Option<String>,

    #[validate(length(max = 255))]
    pub coach_name: Option<String>,

    #[validate(email(message = "Coach email is not a valid email address"))]
    pub coach_email: Option<String>,

    #[validate(length(max = 64))]
    pub coach_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub organization_type: Option<OrganizationType>,

    #[validate(length(max = 255))]
    pub region: Option<String>,

    #[validate(length(max = 255))]
    pub coach_name: Option<String>,

    #[validate(email)]
    pub coach_email: Option<String>,

    #[validate(length(max = 64))]
    pub coach_phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ChangeTeamStatusRequest {
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertDocumentRequest {
    #[validate(length(min = 1, max = 64))]
    pub kind: String,

    #[validate(url, length(max = 500))]
    pub file_url: String,
}

impl UpdateTeamRequest {
    pub fn apply(self, team: &mut Team) {
        if let Some(name) = self.name {
            team.name = name;
        }
        if self.organization_type.is_some() {
            team.organization_type = self.organization_type;
        }
        if self.region.is_some() {
            team.region = self.region;
        }
        if self.coach_name.is_some() {
            team.coach_name = self.coach_name;
        }
        if self.coach_email.is_some() {
            team.coach_email = self.coach_email;
        }
        if self.coach_phone.is_some() {
            team.coach_phone = self.coach_phone;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coach_email_validated() {
        let req: CreateTeamRequest = serde_json::from_value(serde_json::json!({
            "name": "SP 12 Gdańsk",
            "organization_type": "school",
            "coach_email": "trener@sp12"
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateTeamRequest = serde_json::from_value(serde_json::json!({
            "name": "SP 12 Gdańsk",
            "coach_email": "trener@sp12.edu.pl"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_document_url_validated() {
        let bad = UpsertDocumentRequest {
            kind: "parental_consent".to_string(),
            file_url: "consent.pdf".to_string(),
        };
        assert!(bad.validate().is_err());

        let good = UpsertDocumentRequest {
            kind: "parental_consent".to_string(),
            file_url: "https://files.example.pl/consent.pdf".to_string(),
        };
        assert!(good.validate().is_ok());
    }
}
