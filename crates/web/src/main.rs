use anyhow::Context;
use axum::Router;
use storage::Database;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::marathons::handlers::list_marathons,
        features::marathons::handlers::get_marathon,
        features::marathons::handlers::create_marathon,
        features::marathons::handlers::finish_marathon,
        features::marathons::handlers::cancel_marathon,
        features::marathons::handlers::delete_marathon,
        features::entries::handlers::record_entry,
        features::entries::handlers::get_participant_series,
        features::standings::handlers::get_standings,
        features::standings::handlers::get_chart,
    ),
    components(
        schemas(
            storage::dto::marathon::CreateMarathonRequest,
            storage::dto::marathon::CreateParticipantRequest,
            storage::dto::marathon::RecordEntryRequest,
            storage::dto::marathon::MarathonResponse,
            storage::dto::marathon::MarathonDetailResponse,
            storage::dto::marathon::ParticipantResponse,
            storage::dto::marathon::EntryResponse,
            storage::dto::marathon::FrozenPositionResponse,
            storage::dto::common::PaginationMeta,
            storage::dto::standings::LeaderboardResponse,
            storage::dto::standings::StandingsRow,
            storage::dto::standings::PodiumEntry,
            storage::dto::standings::ChartResponse,
            storage::dto::standings::ChartSeries,
            storage::dto::standings::MarathonDay,
            storage::dto::standings::ProgressSummary,
            storage::dto::standings::ParticipantSeriesResponse,
            storage::models::MarathonKind,
            storage::models::MarathonState,
        )
    ),
    tags(
        (name = "marathons", description = "Marathon lifecycle endpoints"),
        (name = "entries", description = "Measurement entry endpoints"),
        (name = "standings", description = "Standings and chart endpoints"),
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

    tracing::info!("Starting Marathon Standings API");

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

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let marathon_routes = features::marathons::routes::routes(api_keys.clone())
        .merge(features::entries::routes::routes(api_keys))
        .merge(features::standings::routes::routes());

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/marathons", marathon_routes)
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(db);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
