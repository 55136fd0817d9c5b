use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{generate_start_list, get_start_list, set_presence};
use crate::middleware::auth::{ApiKeys, require_admin, require_judge};

/// Mounted under the competitions prefix.
pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let admin = Router::new()
        .route("/:competition_id/start-list", post(generate_start_list))
        .route_layer(middleware::from_fn_with_state(
            api_keys.clone(),
            require_admin,
        ));

    let judge = Router::new()
        .route(
            "/:competition_id/start-list/:athlete_id/presence",
            put(set_presence),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_judge));

    Router::new()
        .route("/:competition_id/start-list", get(get_start_list))
        .merge(admin)
        .merge(judge)
}
