use sqlx::PgPool;
use storage::{
    dto::result::{RecordResultRequest, RecordResultResponse, ResultFilter},
    error::Result,
    models::{AthleteResult, AthleteResultHistory},
    repository::ResultRepository,
    services::recorder,
};
use uuid::Uuid;

pub async fn record_result(
    pool: &PgPool,
    request: &RecordResultRequest,
    judge_id: &str,
) -> Result<RecordResultResponse> {
    recorder::record_result(pool, request, Some(judge_id)).await
}

pub async fn list_results(pool: &PgPool, filter: &ResultFilter) -> Result<Vec<AthleteResult>> {
    let repo = ResultRepository::new(pool);
    repo.list(filter).await
}

pub async fn get_result(pool: &PgPool, result_id: Uuid) -> Result<AthleteResult> {
    let repo = ResultRepository::new(pool);
    repo.find_by_id(result_id).await
}

pub async fn get_history(pool: &PgPool, result_id: Uuid) -> Result<Vec<AthleteResultHistory>> {
    let repo = ResultRepository::new(pool);
    repo.find_by_id(result_id).await?;
    repo.history(result_id).await
}
