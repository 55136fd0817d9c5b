use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::classification::{
        ClassificationFilter, IndividualClassificationEntry, TeamClassificationEntry,
    },
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/classification/individual",
    params(
        ("event_id" = Uuid, Path, description = "Event id"),
        ClassificationFilter
    ),
    responses(
        (status = 200, description = "Individual standings, best first", body = Vec<IndividualClassificationEntry>),
        (status = 404, description = "Event not found")
    ),
    tag = "classification"
)]
pub async fn individual_classification(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Query(filter): Query<ClassificationFilter>,
) -> Result<Response, WebError> {
    let entries = services::individual_classification(db.pool(), event_id, &filter).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/classification/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Team standings, best first", body = Vec<TeamClassificationEntry>),
        (status = 404, description = "Event not found")
    ),
    tag = "classification"
)]
pub async fn team_classification(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let entries = services::team_classification(db.pool(), event_id).await?;

    Ok(Json(entries).into_response())
}
