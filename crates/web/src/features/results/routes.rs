use axum::{
    Router, middleware,
    routing::{get, post},
};
use storage::Database;

use super::handlers::{get_result, get_result_history, list_results, record_result};
use crate::middleware::auth::{ApiKeys, require_judge};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(record_result))
        .route_layer(middleware::from_fn_with_state(api_keys, require_judge));

    Router::new()
        .route("/", get(list_results))
        .route("/:result_id", get(get_result))
        .route("/:result_id/history", get(get_result_history))
        .merge(protected)
}
