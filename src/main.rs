//! Rentdesk Server - Rental Inventory Availability & Booking Engine
//!
//! A Rust REST API server for rental inventory management.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentdesk_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{changefeed::ChangeFeedRouter, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rentdesk_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Rentdesk Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool.clone());
    let services = Services::new(repository, config.reservations.clone());

    // Start the change propagation router
    let changefeed = Arc::new(ChangeFeedRouter::new());
    {
        let changefeed = changefeed.clone();
        let pool = pool.clone();
        tokio::spawn(async move {
            changefeed.run(pool).await;
        });
    }

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        changefeed,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Device types (catalog)
        .route("/device-types", get(api::device_types::list_device_types))
        .route("/device-types", post(api::device_types::create_device_type))
        .route("/device-types/availability", get(api::device_types::get_all_availability))
        .route("/device-types/:id", get(api::device_types::get_device_type))
        .route("/device-types/:id", put(api::device_types::update_device_type))
        .route("/device-types/:id", delete(api::device_types::delete_device_type))
        .route("/device-types/:id/availability", get(api::device_types::get_availability))
        // Devices
        .route("/devices", get(api::devices::list_devices))
        .route("/devices", post(api::devices::create_device))
        .route("/devices/:id", get(api::devices::get_device))
        .route("/devices/:id", put(api::devices::update_device))
        .route("/devices/:id", delete(api::devices::delete_device))
        .route("/devices/:id/payments", get(api::devices::list_device_payments))
        // Accessories
        .route("/accessories", get(api::accessories::list_accessories))
        .route("/accessories", post(api::accessories::create_accessory))
        .route("/accessories/:id", get(api::accessories::get_accessory))
        .route("/accessories/:id", put(api::accessories::update_accessory))
        .route("/accessories/:id", delete(api::accessories::delete_accessory))
        // Reservations
        .route("/reservations", post(api::reservations::checkout))
        .route("/reservations", get(api::reservations::list_reservations))
        .route("/reservations/quote", post(api::reservations::quote))
        .route("/reservations/:id", get(api::reservations::get_reservation))
        .route("/reservations/:id/cancel", post(api::reservations::cancel_reservation))
        // Subscriptions
        .route("/subscriptions/rollover", post(api::subscriptions::rollover))
        .route("/payments/:id/pay", post(api::subscriptions::pay))
        // Change feed
        .route("/events", get(api::events::subscribe))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
