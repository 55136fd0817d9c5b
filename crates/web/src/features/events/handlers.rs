use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        competition::CreateCompetitionRequest,
        event::{ChangeEventStatusRequest, CreateEventRequest, UpdateEventRequest},
        team::CreateTeamRequest,
    },
    models::{Competition, Event, RegistrationStatus, Team},
};
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamListParams {
    /// Only teams with this registration status
    pub status: Option<RegistrationStatus>,
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(PaginationParams),
    responses(
        (status = 200, description = "Events, most recent first", body = PaginatedResponse<Event>),
        (status = 400, description = "Invalid pagination parameters")
    ),
    tag = "events"
)]
pub async fn list_events(
    State(db): State<Database>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, WebError> {
    pagination.validate().map_err(WebError::BadRequest)?;

    let (events, total_items) = services::list_events(db.pool(), &pagination).await?;

    let response = PaginatedResponse::new(
        events,
        pagination.page,
        pagination.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let event = services::get_event(db.pool(), event_id).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/by-slug/{slug}",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event_by_slug(
    State(db): State<Database>,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let event = services::get_event_by_slug(db.pool(), &slug).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created successfully", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an admin key"),
        (status = 409, description = "Slug already exists")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(db): State<Database>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    req.validate_fields()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let event = services::create_event(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(event)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event updated successfully", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Event is archived"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Slug already exists")
    ),
    tag = "events"
)]
pub async fn update_event(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(update_req): Json<UpdateEventRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_event(db.pool(), event_id, update_req).await?;

    Ok(Json(updated).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Event deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event already has results")
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_event(db.pool(), event_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/status",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = ChangeEventStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = Event),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Transition not allowed")
    ),
    tag = "events"
)]
pub async fn change_event_status(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ChangeEventStatusRequest>,
) -> Result<Response, WebError> {
    let event = services::change_status(db.pool(), event_id, req.status).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/competitions",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Competitions in display order", body = Vec<Competition>),
        (status = 404, description = "Event not found")
    ),
    tag = "competitions"
)]
pub async fn list_competitions(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let competitions = services::list_competitions(db.pool(), event_id).await?;

    Ok(Json(competitions).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/competitions",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = CreateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created successfully", body = Competition),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Event is archived"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Name already used in this event")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    req.validate_scoring()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let competition = services::create_competition(db.pool(), event_id, &req).await?;

    Ok((StatusCode::CREATED, Json(competition)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id"),
        TeamListParams
    ),
    responses(
        (status = 200, description = "Teams of the event", body = Vec<Team>),
        (status = 404, description = "Event not found")
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Query(params): Query<TeamListParams>,
) -> Result<Response, WebError> {
    let teams = services::list_teams(db.pool(), event_id, params.status).await?;

    Ok(Json(teams).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = CreateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team registered as draft", body = Team),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Registration is closed"),
        (status = 404, description = "Event not found")
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let team = services::create_team(db.pool(), event_id, &req).await?;

    Ok((StatusCode::CREATED, Json(team)).into_response())
}
