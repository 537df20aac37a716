// Flight Foresight API v0.1
use axum::http::Method;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::airports::{load_airports_from_csv, AirportStore};
use services::delay::DelayService;
use services::pipeline::Pipeline;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 1;

/// Flight Foresight API: OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flight Foresight API",
        version = "0.1.0",
        description = "Airport reference data plus flight delay and fare prediction. \
            Predictions run pre-trained models over fitted preprocessing bundles \
            loaded at startup; delay predictions are logged to PostgreSQL.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Airports", description = "Airport reference data (in memory, not persisted)"),
        (name = "Flights", description = "Flight path lookup"),
        (name = "Delay", description = "Flight delay prediction and classification"),
        (name = "Fare", description = "Flight fare prediction"),
    ),
    paths(
        routes::health::root,
        routes::health::health_check,
        routes::airports::list_airports,
        routes::airports::get_airport,
        routes::airports::add_airport,
        routes::airports::delete_airport,
        routes::flights::search_flight,
        routes::delay::predict_delay,
        routes::delay::classify_delay,
        routes::delay::list_predictions,
        routes::fare::predict_fare,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::health::RootResponse,
            services::airports::Airport,
            routes::airports::DeleteResponse,
            routes::flights::FlightSearchRequest,
            services::flights::FlightPath,
            services::delay::FlightDelayRequest,
            routes::delay::DelayPredictionResponse,
            routes::delay::DelayClassificationResponse,
            routes::delay::PredictionRecordResponse,
            services::fare::FlightFareRequest,
            routes::fare::FarePredictionResponse,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flight_foresight_api=debug,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(config.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // Load airport reference data
    let airports_path = Path::new(&config.airports_csv);
    let airports = load_airports_from_csv(airports_path).unwrap_or_else(|e| {
        panic!(
            "Failed to load airports from {}: {}",
            airports_path.display(),
            e
        )
    });
    if airports.is_empty() {
        tracing::warn!("No airports found in {}", airports_path.display());
    }
    tracing::info!(
        "Loaded {} airports from {}",
        airports.len(),
        airports_path.display()
    );

    // Load prediction pipelines
    let delay = config.delay.as_ref().map(|paths| {
        let regressor = Pipeline::load("delay", paths)
            .unwrap_or_else(|e| panic!("Failed to load delay pipeline: {}", e));
        let classifier = config.delay_classifier.as_ref().map(|paths| {
            Pipeline::load("delay-classifier", paths)
                .unwrap_or_else(|e| panic!("Failed to load delay classifier: {}", e))
        });
        Arc::new(DelayService::new(regressor, classifier))
    });
    let fare = config.fare.as_ref().map(|paths| {
        Arc::new(
            Pipeline::load("fare", paths)
                .unwrap_or_else(|e| panic!("Failed to load fare pipeline: {}", e)),
        )
    });

    match &delay {
        Some(service) if service.has_classifier() => {
            tracing::info!("Delay prediction and classification enabled")
        }
        Some(_) => tracing::info!("Delay prediction enabled (no classifier configured)"),
        None => tracing::warn!("Delay pipeline not configured; /delay routes disabled"),
    }
    if config.delay.is_none() && config.delay_classifier.is_some() {
        tracing::warn!("Delay classifier configured without a delay regressor; ignoring it");
    }
    match &fare {
        Some(pipeline) => tracing::info!("Fare prediction enabled ({})", pipeline.name()),
        None => tracing::warn!("Fare pipeline not configured; /predict route disabled"),
    }

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let app_state = AppState {
        pool,
        airports: Arc::new(AirportStore::new(airports)),
        delay,
        fare,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = routes::build_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let ip: std::net::IpAddr = config
        .host
        .parse()
        .unwrap_or_else(|_| panic!("HOST must be an IP address, got '{}'", config.host));
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
