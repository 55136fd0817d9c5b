pub mod athletes;
pub mod classification;
pub mod competitions;
pub mod events;
pub mod results;
pub mod start_lists;
pub mod teams;

use axum::Router;
use storage::Database;

use crate::middleware::auth::ApiKeys;

pub fn api_routes(api_keys: ApiKeys) -> Router<Database> {
    Router::new()
        .nest(
            "/api/events",
            events::routes::routes(api_keys.clone()).merge(classification::routes::routes()),
        )
        .nest(
            "/api/competitions",
            competitions::routes::routes(api_keys.clone())
                .merge(start_lists::routes::routes(api_keys.clone())),
        )
        .nest("/api/teams", teams::routes::routes(api_keys.clone()))
        .nest("/api/athletes", athletes::routes::routes(api_keys.clone()))
        .nest("/api/results", results::routes::routes(api_keys))
}
