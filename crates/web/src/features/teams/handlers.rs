use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        athlete::CreateAthleteRequest,
        team::{ChangeTeamStatusRequest, UpdateTeamRequest, UpsertDocumentRequest},
    },
    models::{Athlete, Team, TeamDocument},
    services::registration::RegistrationReport,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Team found", body = Team),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let team = services::get_team(db.pool(), team_id).await?;

    Ok(Json(team).into_response())
}

#[utoipa::path(
    put,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = UpdateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team updated successfully", body = Team),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team registration can no longer be edited"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn update_team(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
    Json(update_req): Json<UpdateTeamRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_team(db.pool(), team_id, update_req).await?;

    Ok(Json(updated).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Team deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team registration can no longer be edited"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_team(db.pool(), team_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/status",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = ChangeTeamStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Registration status changed", body = Team),
        (status = 400, description = "Registration is incomplete", body = RegistrationReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Event is completed"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Transition not allowed, registration closed or event full")
    ),
    tag = "teams"
)]
pub async fn change_team_status(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<ChangeTeamStatusRequest>,
) -> Result<Response, WebError> {
    let team = services::change_status(db.pool(), team_id, req.status).await?;

    Ok(Json(team).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/registration-check",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Outstanding registration issues, empty when ready", body = RegistrationReport),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn registration_check(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let report = services::registration_check(db.pool(), team_id).await?;

    Ok(Json(report).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/athletes",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Team roster", body = Vec<Athlete>),
        (status = 404, description = "Team not found")
    ),
    tag = "athletes"
)]
pub async fn list_athletes(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let athletes = services::list_athletes(db.pool(), team_id).await?;

    Ok(Json(athletes).into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/athletes",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = CreateAthleteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Athlete created successfully", body = Athlete),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team registration can no longer be edited"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Competition is full")
    ),
    tag = "athletes"
)]
pub async fn create_athlete(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<CreateAthleteRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let athlete = services::create_athlete(db.pool(), team_id, &req).await?;

    Ok((StatusCode::CREATED, Json(athlete)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/documents",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Uploaded documents", body = Vec<TeamDocument>),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn list_documents(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let documents = services::list_documents(db.pool(), team_id).await?;

    Ok(Json(documents).into_response())
}

#[utoipa::path(
    put,
    path = "/api/teams/{team_id}/documents",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = UpsertDocumentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Document stored", body = TeamDocument),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team registration can no longer be edited"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn upsert_document(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpsertDocumentRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let document = services::upsert_document(db.pool(), team_id, &req).await?;

    Ok(Json(document).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}/documents/{kind}",
    params(
        ("team_id" = Uuid, Path, description = "Team id"),
        ("kind" = String, Path, description = "Document kind")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Document removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team registration can no longer be edited"),
        (status = 404, description = "Document not found")
    ),
    tag = "teams"
)]
pub async fn delete_document(
    State(db): State<Database>,
    Path((team_id, kind)): Path<(Uuid, String)>,
) -> Result<Response, WebError> {
    services::delete_document(db.pool(), team_id, &kind).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
