use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{
    change_event_status, create_competition, create_event, create_team, delete_event, get_event,
    get_event_by_slug, list_competitions, list_events, list_teams, update_event,
};
use crate::middleware::auth::{ApiKeys, require_admin};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(create_event))
        .route("/:event_id", put(update_event).delete(delete_event))
        .route("/:event_id/status", post(change_event_status))
        .route("/:event_id/competitions", post(create_competition))
        .route("/:event_id/teams", post(create_team))
        .route_layer(middleware::from_fn_with_state(api_keys, require_admin));

    Router::new()
        .route("/", get(list_events))
        .route("/by-slug/:slug", get(get_event_by_slug))
        .route("/:event_id", get(get_event))
        .route("/:event_id/competitions", get(list_competitions))
        .route("/:event_id/teams", get(list_teams))
        .merge(protected)
}
