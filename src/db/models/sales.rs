//! Database models for sales.
//!
//! Sale rows are immutable once written: there is no update request type.
//! Corrections happen by deleting the sale (which reverses the wine counters)
//! and recording a new one.

use crate::api::models::sales::SaleCreate;
use crate::types::{RestaurantId, SaleId, WineId};
use chrono::{DateTime, NaiveDate, Utc};

/// Database request for creating a new sale
#[derive(Debug, Clone)]
pub struct SaleCreateDBRequest {
    pub restaurant_id: RestaurantId,
    pub wine_id: WineId,
    pub sale_date: NaiveDate,
    pub quantity: i64,
    pub unit_price: f64,
    pub unit_cost: Option<f64>,
    pub server_name: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub pos_transaction_id: Option<String>,
}

impl From<SaleCreate> for SaleCreateDBRequest {
    fn from(api: SaleCreate) -> Self {
        Self {
            restaurant_id: api.restaurant_id,
            wine_id: api.wine_id,
            sale_date: api.sale_date,
            quantity: api.quantity,
            unit_price: api.unit_price,
            unit_cost: api.unit_cost,
            server_name: api.server_name,
            table_number: api.table_number,
            notes: api.notes,
            pos_transaction_id: api.pos_transaction_id,
        }
    }
}

/// Database response for a sale
#[derive(Debug, Clone)]
pub struct SaleDBResponse {
    pub id: SaleId,
    pub restaurant_id: RestaurantId,
    pub wine_id: WineId,
    pub sale_date: NaiveDate,
    pub quantity: i64,
    pub unit_price: f64,
    pub unit_cost: Option<f64>,
    pub total_amount: f64,
    pub server_name: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub pos_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
