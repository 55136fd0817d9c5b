use axum::{
    Router, middleware,
    routing::{get, put},
};
use storage::Database;

use super::handlers::{delete_athlete, get_athlete, update_athlete};
use crate::middleware::auth::{ApiKeys, require_admin};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:athlete_id", put(update_athlete).delete(delete_athlete))
        .route_layer(middleware::from_fn_with_state(api_keys, require_admin));

    Router::new()
        .route("/:athlete_id", get(get_athlete))
        .merge(protected)
}
