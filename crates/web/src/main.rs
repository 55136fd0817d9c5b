use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use features::{athletes, classification, competitions, events, results, start_lists, teams};
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        events::handlers::list_events,
        events::handlers::get_event,
        events::handlers::get_event_by_slug,
        events::handlers::create_event,
        events::handlers::update_event,
        events::handlers::delete_event,
        events::handlers::change_event_status,
        events::handlers::list_competitions,
        events::handlers::create_competition,
        events::handlers::list_teams,
        events::handlers::create_team,
        competitions::handlers::get_competition,
        competitions::handlers::update_competition,
        competitions::handlers::delete_competition,
        competitions::handlers::change_competition_status,
        start_lists::handlers::get_start_list,
        start_lists::handlers::generate_start_list,
        start_lists::handlers::set_presence,
        teams::handlers::get_team,
        teams::handlers::update_team,
        teams::handlers::delete_team,
        teams::handlers::change_team_status,
        teams::handlers::registration_check,
        teams::handlers::list_athletes,
        teams::handlers::create_athlete,
        teams::handlers::list_documents,
        teams::handlers::upsert_document,
        teams::handlers::delete_document,
        athletes::handlers::get_athlete,
        athletes::handlers::update_athlete,
        athletes::handlers::delete_athlete,
        results::handlers::record_result,
        results::handlers::list_results,
        results::handlers::get_result,
        results::handlers::get_result_history,
        classification::handlers::individual_classification,
        classification::handlers::team_classification,
    ),
    components(
        schemas(
            storage::dto::event::CreateEventRequest,
            storage::dto::event::UpdateEventRequest,
            storage::dto::event::ChangeEventStatusRequest,
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::UpdateCompetitionRequest,
            storage::dto::competition::ChangeCompetitionStatusRequest,
            storage::dto::team::CreateTeamRequest,
            storage::dto::team::UpdateTeamRequest,
            storage::dto::team::ChangeTeamStatusRequest,
            storage::dto::team::UpsertDocumentRequest,
            storage::dto::athlete::CreateAthleteRequest,
            storage::dto::athlete::UpdateAthleteRequest,
            storage::dto::result::RecordResultRequest,
            storage::dto::result::RecordResultResponse,
            storage::dto::start_list::SetPresenceRequest,
            storage::dto::classification::IndividualClassificationEntry,
            storage::dto::classification::ClassifiedAthlete,
            storage::dto::classification::CompetitionScore,
            storage::dto::classification::TeamClassificationEntry,
            storage::dto::classification::TeamMemberScore,
            storage::dto::common::PaginationMeta,
            storage::services::registration::RegistrationReport,
            storage::services::registration::RegistrationIssue,
            storage::models::Event,
            storage::models::ScoringRules,
            storage::models::TieBreakRule,
            storage::models::RegistrationRules,
            storage::models::GenderLimits,
            storage::models::Branding,
            storage::models::EventStatus,
            storage::models::Competition,
            storage::models::CompetitionType,
            storage::models::ScoringType,
            storage::models::CompetitionStatus,
            storage::models::Zone,
            storage::models::Team,
            storage::models::TeamDocument,
            storage::models::OrganizationType,
            storage::models::RegistrationStatus,
            storage::models::Athlete,
            storage::models::Gender,
            storage::models::AgeCategory,
            storage::models::AthleteResult,
            storage::models::AthleteResultHistory,
            storage::models::ResultStatus,
            storage::models::StartListEntry,
        )
    ),
    tags(
        (name = "events", description = "Events and their lifecycle"),
        (name = "competitions", description = "Competitions within an event"),
        (name = "start-lists", description = "Starting order and presence"),
        (name = "teams", description = "Team registration"),
        (name = "athletes", description = "Team rosters"),
        (name = "results", description = "Result recording"),
        (name = "classification", description = "Individual and team standings"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Zawody API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_config(&config.admin_api_keys, &config.judge_api_keys);
    if api_keys.is_empty() {
        tracing::warn!("No API keys configured; every write endpoint will answer 401");
    } else {
        tracing::info!(keys = api_keys.len(), "API keys loaded");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(features::api_routes(api_keys))
        .layer(cors)
        .with_state(db);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);

    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
