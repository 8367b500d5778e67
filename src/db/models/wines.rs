//! Database models for wines.

use crate::api::models::wines::{WineBody, WineCreate, WineType, WineUpdate};
use crate::types::{RestaurantId, WineId};
use chrono::{DateTime, Utc};

/// Database request for creating a new wine
#[derive(Debug, Clone)]
pub struct WineCreateDBRequest {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub varietal: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub wine_type: Option<WineType>,
    pub body: Option<WineBody>,
    pub sweetness: Option<i32>,
    pub acidity: Option<i32>,
    pub tannin: Option<i32>,
    pub alcohol_content: Option<f64>,
    pub cost: Option<f64>,
    pub price: f64,
    pub inventory_count: i64,
    pub tasting_notes: Option<String>,
    pub bottle_size: String,
    pub sku: Option<String>,
}

impl From<WineCreate> for WineCreateDBRequest {
    fn from(api: WineCreate) -> Self {
        Self {
            restaurant_id: api.restaurant_id,
            name: api.name,
            producer: api.producer,
            vintage: api.vintage,
            varietal: api.varietal,
            region: api.region,
            country: api.country,
            wine_type: api.wine_type,
            body: api.body,
            sweetness: api.sweetness,
            acidity: api.acidity,
            tannin: api.tannin,
            alcohol_content: api.alcohol_content,
            cost: api.cost,
            price: api.price,
            inventory_count: api.inventory_count,
            tasting_notes: api.tasting_notes,
            bottle_size: api.bottle_size,
            sku: api.sku,
        }
    }
}

/// Database request for updating a wine
///
/// Absent fields are left unchanged (COALESCE semantics); a partial update
/// cannot clear a column back to NULL.
#[derive(Debug, Clone)]
pub struct WineUpdateDBRequest {
    pub name: Option<String>,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub varietal: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub wine_type: Option<WineType>,
    pub body: Option<WineBody>,
    pub sweetness: Option<i32>,
    pub acidity: Option<i32>,
    pub tannin: Option<i32>,
    pub alcohol_content: Option<f64>,
    pub cost: Option<f64>,
    pub price: Option<f64>,
    pub inventory_count: Option<i64>,
    pub tasting_notes: Option<String>,
    pub bottle_size: Option<String>,
    pub sku: Option<String>,
}

impl WineUpdateDBRequest {
    pub fn new(update: WineUpdate) -> Self {
        Self {
            name: update.name,
            producer: update.producer,
            vintage: update.vintage,
            varietal: update.varietal,
            region: update.region,
            country: update.country,
            wine_type: update.wine_type,
            body: update.body,
            sweetness: update.sweetness,
            acidity: update.acidity,
            tannin: update.tannin,
            alcohol_content: update.alcohol_content,
            cost: update.cost,
            price: update.price,
            inventory_count: update.inventory_count,
            tasting_notes: update.tasting_notes,
            bottle_size: update.bottle_size,
            sku: update.sku,
        }
    }
}

/// Database response for a wine
#[derive(Debug, Clone)]
pub struct WineDBResponse {
    pub id: WineId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub varietal: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub wine_type: Option<WineType>,
    pub body: Option<WineBody>,
    pub sweetness: Option<i32>,
    pub acidity: Option<i32>,
    pub tannin: Option<i32>,
    pub alcohol_content: Option<f64>,
    pub cost: Option<f64>,
    pub price: f64,
    pub inventory_count: i64,
    pub times_sold: i64,
    pub tasting_notes: Option<String>,
    pub bottle_size: String,
    pub sku: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
