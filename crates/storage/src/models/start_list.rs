use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One slot on a competition's start list, joined with the athlete and team
/// details a judge needs at the start line.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StartListEntry {
    pub competition_id: Uuid,
    pub athlete_id: Uuid,
    pub start_order: i32,
    pub present: bool,
    pub completed: bool,
    pub first_name: String,
    pub last_name: String,
    pub team_id: Uuid,
    pub team_name: String,
    pub start_number: Option<i32>,
}
