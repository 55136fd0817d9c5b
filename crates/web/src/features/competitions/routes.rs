use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{
    change_competition_status, delete_competition, get_competition, update_competition,
};
use crate::middleware::auth::{ApiKeys, require_admin};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route(
            "/:competition_id",
            put(update_competition).delete(delete_competition),
        )
        .route("/:competition_id/status", post(change_competition_status))
        .route_layer(middleware::from_fn_with_state(api_keys, require_admin));

    Router::new()
        .route("/:competition_id", get(get_competition))
        .merge(protected)
}
