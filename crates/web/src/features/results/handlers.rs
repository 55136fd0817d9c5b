use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::result::{RecordResultRequest, RecordResultResponse, ResultFilter},
    models::{AthleteResult, AthleteResultHistory},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Caller;

use super::services;

#[utoipa::path(
    post,
    path = "/api/results",
    request_body = RecordResultRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Result recorded", body = RecordResultResponse),
        (status = 200, description = "Client id already recorded, stored result returned", body = RecordResultResponse),
        (status = 400, description = "Value rejected, athlete not entered or competition closed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Athlete or competition not found")
    ),
    tag = "results"
)]
pub async fn record_result(
    State(db): State<Database>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<RecordResultRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let response = services::record_result(db.pool(), &req, &caller.id).await?;

    let status = if response.duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(response)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/results",
    params(ResultFilter),
    responses(
        (status = 200, description = "Current results matching the filter", body = Vec<AthleteResult>)
    ),
    tag = "results"
)]
pub async fn list_results(
    State(db): State<Database>,
    Query(filter): Query<ResultFilter>,
) -> Result<Response, WebError> {
    let results = services::list_results(db.pool(), &filter).await?;

    Ok(Json(results).into_response())
}

#[utoipa::path(
    get,
    path = "/api/results/{result_id}",
    params(
        ("result_id" = Uuid, Path, description = "Result id")
    ),
    responses(
        (status = 200, description = "Result found", body = AthleteResult),
        (status = 404, description = "Result not found")
    ),
    tag = "results"
)]
pub async fn get_result(
    State(db): State<Database>,
    Path(result_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let result = services::get_result(db.pool(), result_id).await?;

    Ok(Json(result).into_response())
}

#[utoipa::path(
    get,
    path = "/api/results/{result_id}/history",
    params(
        ("result_id" = Uuid, Path, description = "Result id")
    ),
    responses(
        (status = 200, description = "Superseded versions, oldest first", body = Vec<AthleteResultHistory>),
        (status = 404, description = "Result not found")
    ),
    tag = "results"
)]
pub async fn get_result_history(
    State(db): State<Database>,
    Path(result_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let history = services::get_history(db.pool(), result_id).await?;

    Ok(Json(history).into_response())
}
