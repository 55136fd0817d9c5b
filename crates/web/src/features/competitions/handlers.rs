use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::competition::{ChangeCompetitionStatusRequest, UpdateCompetitionRequest},
    models::Competition,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition found", body = Competition),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let competition = services::get_competition(db.pool(), competition_id).await?;

    Ok(Json(competition).into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    request_body = UpdateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition updated successfully", body = Competition),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Event is archived"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Name already used in this event")
    ),
    tag = "competitions"
)]
pub async fn update_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(update_req): Json<UpdateCompetitionRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_competition(db.pool(), competition_id, update_req).await?;

    Ok(Json(updated).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Competition deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Competition already has results")
    ),
    tag = "competitions"
)]
pub async fn delete_competition(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_competition(db.pool(), competition_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/status",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    request_body = ChangeCompetitionStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = Competition),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Event is archived"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Transition not allowed")
    ),
    tag = "competitions"
)]
pub async fn change_competition_status(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<ChangeCompetitionStatusRequest>,
) -> Result<Response, WebError> {
    let competition =
        services::change_status(db.pool(), competition_id, req.status, req.admin_override).await?;

    Ok(Json(competition).into_response())
}
