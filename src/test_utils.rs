//! Test utilities for integration testing (available with `test-utils` feature).

use crate::api::models::wines::WineType;
use crate::config::{Config, DatabaseConfig, PoolSettings};
use crate::db::handlers::{Repository, Restaurants, Sales, Wines};
use crate::db::models::{
    restaurants::{RestaurantCreateDBRequest, RestaurantDBResponse},
    sales::{SaleCreateDBRequest, SaleDBResponse},
    wines::{WineCreateDBRequest, WineDBResponse},
};
use crate::types::{RestaurantId, WineId};
use axum_test::TestServer;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Build a test server around an existing pool. `#[sqlx::test]` hands each
/// test a freshly migrated database, so the config's own database URL is
/// never used here.
pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    let config = create_test_config();

    let state = crate::AppState::builder().db(pool).config(config).build();
    let router = crate::build_router(state).expect("Failed to build router");

    TestServer::new(router).expect("Failed to create test server")
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                acquire_timeout_secs: 5,
            },
        },
        cors: crate::config::CorsConfig::default(),
        uploads: crate::config::UploadsConfig::default(),
    }
}

pub async fn create_test_restaurant(pool: &SqlitePool, name: &str, email: &str) -> RestaurantDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Restaurants::new(&mut conn);

    let request = RestaurantCreateDBRequest {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        address: None,
        city: None,
        state: None,
        zip_code: None,
    };

    repo.create(&request).await.expect("Failed to create test restaurant")
}

pub async fn create_test_wine(
    pool: &SqlitePool,
    restaurant_id: RestaurantId,
    name: &str,
    price: f64,
    cost: Option<f64>,
    inventory: i64,
) -> WineDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Wines::new(&mut conn);

    let request = WineCreateDBRequest {
        restaurant_id,
        name: name.to_string(),
        producer: None,
        vintage: Some(2019),
        varietal: None,
        region: None,
        country: None,
        wine_type: Some(WineType::Red),
        body: None,
        sweetness: None,
        acidity: None,
        tannin: None,
        alcohol_content: None,
        cost,
        price,
        inventory_count: inventory,
        tasting_notes: None,
        bottle_size: "750ml".to_string(),
        sku: None,
    };

    repo.create(&request).await.expect("Failed to create test wine")
}

pub async fn create_test_sale(
    pool: &SqlitePool,
    restaurant_id: RestaurantId,
    wine_id: WineId,
    sale_date: NaiveDate,
    quantity: i64,
    unit_price: f64,
    unit_cost: Option<f64>,
) -> SaleDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Sales::new(&mut conn);

    let request = SaleCreateDBRequest {
        restaurant_id,
        wine_id,
        sale_date,
        quantity,
        unit_price,
        unit_cost,
        server_name: None,
        table_number: None,
        notes: None,
        pos_transaction_id: None,
    };

    repo.create(&request).await.expect("Failed to create test sale")
}
