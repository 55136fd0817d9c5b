use axum::{Router, routing::get};
use storage::Database;

use super::handlers::{individual_classification, team_classification};

/// Mounted under the events prefix.
pub fn routes() -> Router<Database> {
    Router::new()
        .route(
            "/:event_id/classification/individual",
            get(individual_classification),
        )
        .route("/:event_id/classification/teams", get(team_classification))
}
