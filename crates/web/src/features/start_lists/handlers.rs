use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{Database, dto::start_list::SetPresenceRequest, models::StartListEntry};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/start-list",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Start list in starting order", body = Vec<StartListEntry>),
        (status = 404, description = "Competition not found")
    ),
    tag = "start-lists"
)]
pub async fn get_start_list(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let entries = services::get_start_list(db.pool(), competition_id).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/start-list",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Start list generated", body = Vec<StartListEntry>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Competition or event is completed"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Athletes have already competed")
    ),
    tag = "start-lists"
)]
pub async fn generate_start_list(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let entries = services::generate_start_list(db.pool(), competition_id).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}/start-list/{athlete_id}/presence",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id"),
        ("athlete_id" = Uuid, Path, description = "Athlete id")
    ),
    request_body = SetPresenceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Presence updated", body = StartListEntry),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Athlete is not on the start list")
    ),
    tag = "start-lists"
)]
pub async fn set_presence(
    State(db): State<Database>,
    Path((competition_id, athlete_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SetPresenceRequest>,
) -> Result<Response, WebError> {
    let entry = services::set_presence(db.pool(), competition_id, athlete_id, req.present).await?;

    Ok(Json(entry).into_response())
}
