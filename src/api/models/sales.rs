//! API models for recorded sales.

use crate::api::models::pagination::Pagination;
use crate::db::models::sales::SaleDBResponse;
use crate::pricing;
use crate::types::{RestaurantId, SaleId, WineId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.len() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

/// Request to record a sale against a wine
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleCreate {
    #[schema(value_type = String, format = "uuid")]
    pub restaurant_id: RestaurantId,
    #[schema(value_type = String, format = "uuid")]
    pub wine_id: WineId,
    /// Business date of the sale, not the time it was keyed in
    pub sale_date: NaiveDate,
    pub quantity: i64,
    /// Price per bottle as actually charged (may differ from the list price)
    pub unit_price: f64,
    /// Per-bottle cost at the time of sale
    pub unit_cost: Option<f64>,
    pub server_name: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    /// Identifier from the point-of-sale system, unique when present
    pub pos_transaction_id: Option<String>,
}

impl SaleCreate {
    /// Field checks the type system cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity <= 0 {
            return Err("Quantity must be greater than 0".to_string());
        }
        if self.unit_price <= 0.0 {
            return Err("Unit price must be greater than 0".to_string());
        }
        if let Some(unit_cost) = self.unit_cost
            && unit_cost < 0.0
        {
            return Err("Unit cost must not be negative".to_string());
        }
        if let Some(ref server_name) = self.server_name {
            check_length("Server name", server_name, 100)?;
        }
        if let Some(ref table_number) = self.table_number {
            check_length("Table number", table_number, 20)?;
        }
        if let Some(ref notes) = self.notes {
            check_length("Notes", notes, 500)?;
        }
        if let Some(ref pos_transaction_id) = self.pos_transaction_id {
            check_length("POS transaction ID", pos_transaction_id, 100)?;
        }
        Ok(())
    }
}

/// Sale as returned by the API, with derived profit figures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SaleId,
    #[schema(value_type = String, format = "uuid")]
    pub restaurant_id: RestaurantId,
    #[schema(value_type = String, format = "uuid")]
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
    /// Total profit on the sale, present when the unit cost is known
    pub profit: Option<f64>,
    /// Margin on the realized price, present when the unit cost is known
    pub profit_margin: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<SaleDBResponse> for SaleResponse {
    fn from(db: SaleDBResponse) -> Self {
        let profit = db
            .unit_cost
            .map(|unit_cost| (db.unit_price - unit_cost) * db.quantity as f64);
        let profit_margin = db
            .unit_cost
            .and_then(|unit_cost| pricing::profit_margin(db.unit_price, unit_cost));

        Self {
            id: db.id,
            restaurant_id: db.restaurant_id,
            wine_id: db.wine_id,
            sale_date: db.sale_date,
            quantity: db.quantity,
            unit_price: db.unit_price,
            unit_cost: db.unit_cost,
            total_amount: db.total_amount,
            server_name: db.server_name,
            table_number: db.table_number,
            notes: db.notes,
            pos_transaction_id: db.pos_transaction_id,
            profit,
            profit_margin,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing sales
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListSalesQuery {
    /// Owning restaurant
    pub restaurant_id: RestaurantId,

    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Restrict to sales of one wine
    pub wine_id: Option<WineId>,

    /// Earliest sale date to include
    pub start_date: Option<NaiveDate>,

    /// Latest sale date to include
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for the sale CSV bulk upload endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BulkUploadQuery {
    /// Restaurant receiving the uploaded rows
    pub restaurant_id: RestaurantId,
}

/// Outcome of a sales CSV bulk upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleBulkUploadResponse {
    pub message: String,
    pub sales_created: i64,
    /// Per-row failures as "Row N: <reason>"; null when every row imported
    pub errors: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_create() -> SaleCreate {
        SaleCreate {
            restaurant_id: Uuid::new_v4(),
            wine_id: Uuid::new_v4(),
            sale_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            quantity: 2,
            unit_price: 120.0,
            unit_cost: Some(45.0),
            server_name: Some("Dana".to_string()),
            table_number: Some("12".to_string()),
            notes: None,
            pos_transaction_id: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(sample_create().validate().is_ok());

        let mut sale = sample_create();
        sale.quantity = 0;
        assert_eq!(sale.validate().unwrap_err(), "Quantity must be greater than 0");

        let mut sale = sample_create();
        sale.unit_price = -10.0;
        assert_eq!(sale.validate().unwrap_err(), "Unit price must be greater than 0");

        let mut sale = sample_create();
        sale.unit_cost = Some(-1.0);
        assert_eq!(sale.validate().unwrap_err(), "Unit cost must not be negative");
    }

    #[test]
    fn test_response_profit_fields() {
        let now = Utc::now();
        let db = SaleDBResponse {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            wine_id: Uuid::new_v4(),
            sale_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            quantity: 3,
            unit_price: 120.0,
            unit_cost: Some(45.0),
            total_amount: 360.0,
            server_name: None,
            table_number: None,
            notes: None,
            pos_transaction_id: None,
            created_at: now,
        };

        let response = SaleResponse::from(db.clone());
        assert_eq!(response.profit, Some(225.0));
        assert_eq!(response.profit_margin, Some(62.5));

        let mut costless = db;
        costless.unit_cost = None;
        let response = SaleResponse::from(costless);
        assert_eq!(response.profit, None);
        assert_eq!(response.profit_margin, None);
    }
}
