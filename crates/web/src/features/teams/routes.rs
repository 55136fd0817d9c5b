use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use storage::Database;

use super::handlers::{
    change_team_status, create_athlete, delete_document, delete_team, get_team, list_athletes,
    list_documents, registration_check, update_team, upsert_document,
};
use crate::middleware::auth::{ApiKeys, require_admin};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:team_id", put(update_team).delete(delete_team))
        .route("/:team_id/status", post(change_team_status))
        .route("/:team_id/athletes", post(create_athlete))
        .route("/:team_id/documents", put(upsert_document))
        .route("/:team_id/documents/:kind", delete(delete_document))
        .route_layer(middleware::from_fn_with_state(api_keys, require_admin));

    Router::new()
        .route("/:team_id", get(get_team))
        .route("/:team_id/registration-check", get(registration_check))
        .route("/:team_id/athletes", get(list_athletes))
        .route("/:team_id/documents", get(list_documents))
        .merge(protected)
}
