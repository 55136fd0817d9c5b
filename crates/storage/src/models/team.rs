use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::RegistrationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub organization_type: Option<OrganizationType>,
    pub region: Option<String>,
    pub coach_name: Option<String>,
    pub coach_email: Option<String>,
    pub coach_phone: Option<String>,
    pub registration_status: RegistrationStatus,
    pub documents_verified: bool,
    /// Assigned when the registration is accepted.
    pub start_number: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "organization_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    School,
    ScoutTroop,
    Club,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamDocument {
    pub document_id: Uuid,
    pub team_id: Uuid,
    pub kind: String,
    pub file_url: String,
    pub uploaded_at: NaiveDateTime,
}

impl TeamDocument {
    pub fn is_uploaded(&self) -> bool {
        !self.file_url.trim().is_empty()
    }
}
