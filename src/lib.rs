//! # sommelier: Wine Inventory & Sales Analytics for Restaurants
//!
//! `sommelier` is the backend for a restaurant wine program: it tracks the
//! wine list, records bottle sales, and turns that data into the reports a
//! beverage director actually uses (what is selling, what is about to run
//! out, and which bottles are priced badly).
//!
//! ## Overview
//!
//! Restaurants carry expensive, slow-moving wine inventory and usually only
//! discover problems (a dead SKU, an under-priced list, an imminent stockout)
//! at the end-of-month count. This crate addresses that by keeping the
//! inventory ledger and the sales ledger in one place and deriving the
//! analytics from transactional rows on demand.
//!
//! ### What It Does
//!
//! Each restaurant account owns a wine list. Recording a sale atomically
//! bumps the wine's `times_sold` and deducts stock (stock is clamped at zero
//! rather than going negative, so an over-sale is still recorded). Deleting a
//! sale reverses exactly the adjustments that sale made. On top of those
//! ledgers sit five reports: a 30-day dashboard summary, best/worst seller
//! rankings, a daily sales trend series, stockout projections, and per-wine
//! profitability with pricing suggestions. Wines and sales can also be loaded
//! in bulk from CSV exports, with per-row error reporting.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses SQLite (via `sqlx`) for persistence, so a single
//! binary with a single database file is a complete deployment.
//!
//! ### Request Flow
//!
//! Requests hit `/api/v1/*`, are deserialized and validated by the handler
//! layer, and reach the database through repository types that own the SQL.
//! Mutations that touch more than one table (recording a sale, bulk uploads)
//! run inside a transaction. Aggregation queries for the reports live in a
//! separate analytics module that works directly on the pool so independent
//! rollups can run concurrently.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes RESTful CRUD endpoints for
//! restaurants, wines, and sales, plus the read-only reporting endpoints
//! under `/api/v1/analytics/*`.
//!
//! The **database layer** ([`db`]) uses the repository pattern to abstract
//! data access. Each entity has a corresponding repository that handles
//! queries and mutations; counter updates ride in the same transaction as
//! the row changes they belong to.
//!
//! The **pricing module** ([`pricing`]) holds the margin and markup
//! arithmetic shared by the wine responses and the profitability report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use sommelier::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = sommelier::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize structured logging
//!     sommelier::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application opens (and creates, if missing) the configured SQLite
//! database and runs migrations on startup:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
//! // Run migrations
//! sommelier::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
//!
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod pricing;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::openapi::ApiDoc;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use bon::Builder;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::CorsOrigin;

pub use config::Config;
pub use errors::{Error, Result};
pub use types::{RestaurantId, SaleId, WineId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the sommelier database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the configured SQLite database, creating the file if needed, and
/// bring the schema up to date.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.pool.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.pool.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .expose_headers(vec![axum::http::header::LOCATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Restaurant, wine, and sale CRUD routes under `/api/v1`
/// - Analytics report routes under `/api/v1/analytics`
/// - OpenAPI docs (Scalar UI at `/docs`, spec at `/docs/openapi.json`)
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if a configured CORS origin cannot be turned into a
/// header value.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.uploads.max_file_size as usize;

    // API routes
    let api_routes = Router::new()
        // Restaurant accounts
        .route("/restaurants", post(api::handlers::restaurants::create_restaurant))
        .route("/restaurants", get(api::handlers::restaurants::list_restaurants))
        .route("/restaurants/{id}", get(api::handlers::restaurants::get_restaurant))
        // Wine inventory
        .route("/wines", post(api::handlers::wines::create_wine))
        .route("/wines", get(api::handlers::wines::list_wines))
        .route(
            "/wines/bulk-upload",
            post(api::handlers::wines::bulk_upload_wines).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/wines/{id}", get(api::handlers::wines::get_wine))
        .route("/wines/{id}", put(api::handlers::wines::update_wine))
        .route("/wines/{id}", delete(api::handlers::wines::delete_wine))
        // Sales ledger
        .route("/sales", post(api::handlers::sales::create_sale))
        .route("/sales", get(api::handlers::sales::list_sales))
        .route(
            "/sales/bulk-upload",
            post(api::handlers::sales::bulk_upload_sales).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/sales/{id}", get(api::handlers::sales::get_sale))
        .route("/sales/{id}", delete(api::handlers::sales::delete_sale))
        // Reports
        .route("/analytics/dashboard/{restaurant_id}", get(api::handlers::analytics::get_dashboard))
        .route(
            "/analytics/top-bottom-wines/{restaurant_id}",
            get(api::handlers::analytics::get_top_bottom_wines),
        )
        .route(
            "/analytics/sales-trends/{restaurant_id}",
            get(api::handlers::analytics::get_sales_trends),
        )
        .route(
            "/analytics/inventory-health/{restaurant_id}",
            get(api::handlers::analytics::get_inventory_health),
        )
        .route(
            "/analytics/profit-analysis/{restaurant_id}",
            get(api::handlers::analytics::get_profit_analysis),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route(
            "/",
            get(|| async {
                Json(serde_json::json!({
                    "message": "Sommelier API",
                    "version": env!("CARGO_PKG_VERSION"),
                    "status": "healthy",
                }))
            }),
        )
        .route("/healthz", get(|| async { "OK" }))
        .route("/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .nest("/api/v1", api_routes);

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// A fully initialized application: database opened and migrated, router
/// built, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting sommelier with configuration: {:#?}", config);

        // Open the database and run migrations
        let pool = setup_database(&config).await?;

        // Build app state and router
        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Sommelier listening on http://{}, docs at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
