//! API models for wine inventory management.

use crate::api::models::pagination::Pagination;
use crate::db::models::wines::WineDBResponse;
use crate::pricing;
use crate::types::{RestaurantId, WineId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Broad style of a wine, stored lowercase in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WineType {
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

/// Body (weight on the palate) of a wine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WineBody {
    Light,
    Medium,
    Full,
}

// FromStr impls back the CSV import path, where values arrive as bare strings.
impl std::str::FromStr for WineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(WineType::Red),
            "white" => Ok(WineType::White),
            "rose" => Ok(WineType::Rose),
            "sparkling" => Ok(WineType::Sparkling),
            "dessert" => Ok(WineType::Dessert),
            "fortified" => Ok(WineType::Fortified),
            other => Err(format!("unknown wine type '{other}'")),
        }
    }
}

impl std::str::FromStr for WineBody {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(WineBody::Light),
            "medium" => Ok(WineBody::Medium),
            "full" => Ok(WineBody::Full),
            other => Err(format!("unknown wine body '{other}'")),
        }
    }
}

fn default_bottle_size() -> String {
    "750ml".to_string()
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.len() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

// Tasting scales (sweetness, acidity, tannin) run from 1 to 5
fn check_scale(field: &str, value: i32) -> Result<(), String> {
    if !(1..=5).contains(&value) {
        return Err(format!("{field} must be between 1 and 5"));
    }
    Ok(())
}

fn check_vintage(vintage: i32) -> Result<(), String> {
    if !(1900..=2030).contains(&vintage) {
        return Err("Vintage must be between 1900 and 2030".to_string());
    }
    Ok(())
}

/// Request to add a wine to a restaurant's inventory
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WineCreate {
    #[schema(value_type = String, format = "uuid")]
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
    /// Menu price per bottle
    pub price: f64,
    /// What the restaurant pays per bottle
    pub cost: Option<f64>,
    #[serde(default)]
    pub inventory_count: i64,
    pub tasting_notes: Option<String>,
    #[serde(default = "default_bottle_size")]
    pub bottle_size: String,
    pub sku: Option<String>,
}

impl WineCreate {
    /// Field checks the type system cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Name must not be empty".to_string());
        }
        check_length("Name", &self.name, 255)?;
        if let Some(ref producer) = self.producer {
            check_length("Producer", producer, 255)?;
        }
        if let Some(vintage) = self.vintage {
            check_vintage(vintage)?;
        }
        if let Some(ref varietal) = self.varietal {
            check_length("Varietal", varietal, 100)?;
        }
        if let Some(ref region) = self.region {
            check_length("Region", region, 255)?;
        }
        if let Some(ref country) = self.country {
            check_length("Country", country, 100)?;
        }
        if let Some(sweetness) = self.sweetness {
            check_scale("Sweetness", sweetness)?;
        }
        if let Some(acidity) = self.acidity {
            check_scale("Acidity", acidity)?;
        }
        if let Some(tannin) = self.tannin {
            check_scale("Tannin", tannin)?;
        }
        if let Some(alcohol_content) = self.alcohol_content
            && !(0.0..=20.0).contains(&alcohol_content)
        {
            return Err("Alcohol content must be between 0 and 20".to_string());
        }
        if self.price <= 0.0 {
            return Err("Price must be greater than 0".to_string());
        }
        if let Some(cost) = self.cost {
            if cost < 0.0 {
                return Err("Cost must not be negative".to_string());
            }
            if cost >= self.price {
                return Err("Cost must be less than price".to_string());
            }
        }
        if self.inventory_count < 0 {
            return Err("Inventory count must not be negative".to_string());
        }
        check_length("Bottle size", &self.bottle_size, 20)?;
        if let Some(ref sku) = self.sku {
            check_length("SKU", sku, 100)?;
        }
        Ok(())
    }
}

/// Partial update for a wine; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WineUpdate {
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
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub inventory_count: Option<i64>,
    pub tasting_notes: Option<String>,
    pub bottle_size: Option<String>,
    pub sku: Option<String>,
}

impl WineUpdate {
    /// Field checks for whichever fields the update carries.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            if name.is_empty() {
                return Err("Name must not be empty".to_string());
            }
            check_length("Name", name, 255)?;
        }
        if let Some(ref producer) = self.producer {
            check_length("Producer", producer, 255)?;
        }
        if let Some(vintage) = self.vintage {
            check_vintage(vintage)?;
        }
        if let Some(ref varietal) = self.varietal {
            check_length("Varietal", varietal, 100)?;
        }
        if let Some(ref region) = self.region {
            check_length("Region", region, 255)?;
        }
        if let Some(ref country) = self.country {
            check_length("Country", country, 100)?;
        }
        if let Some(sweetness) = self.sweetness {
            check_scale("Sweetness", sweetness)?;
        }
        if let Some(acidity) = self.acidity {
            check_scale("Acidity", acidity)?;
        }
        if let Some(tannin) = self.tannin {
            check_scale("Tannin", tannin)?;
        }
        if let Some(alcohol_content) = self.alcohol_content
            && !(0.0..=20.0).contains(&alcohol_content)
        {
            return Err("Alcohol content must be between 0 and 20".to_string());
        }
        if let Some(price) = self.price
            && price <= 0.0
        {
            return Err("Price must be greater than 0".to_string());
        }
        if let Some(cost) = self.cost
            && cost < 0.0
        {
            return Err("Cost must not be negative".to_string());
        }
        if let Some(inventory_count) = self.inventory_count
            && inventory_count < 0
        {
            return Err("Inventory count must not be negative".to_string());
        }
        if let Some(ref bottle_size) = self.bottle_size {
            check_length("Bottle size", bottle_size, 20)?;
        }
        if let Some(ref sku) = self.sku {
            check_length("SKU", sku, 100)?;
        }
        Ok(())
    }
}

/// Wine as returned by the API, with derived pricing figures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WineResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: WineId,
    #[schema(value_type = String, format = "uuid")]
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
    pub price: f64,
    pub cost: Option<f64>,
    pub inventory_count: i64,
    pub times_sold: i64,
    pub tasting_notes: Option<String>,
    pub bottle_size: String,
    pub sku: Option<String>,
    /// Margin over the menu price, present when cost data exists
    pub profit_margin: Option<f64>,
    /// Markup over cost, present when the cost is known and positive
    pub markup: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WineDBResponse> for WineResponse {
    fn from(db: WineDBResponse) -> Self {
        let profit_margin = db.cost.and_then(|cost| pricing::profit_margin(db.price, cost));
        let markup = db.cost.and_then(|cost| pricing::markup(db.price, cost));

        Self {
            id: db.id,
            restaurant_id: db.restaurant_id,
            name: db.name,
            producer: db.producer,
            vintage: db.vintage,
            varietal: db.varietal,
            region: db.region,
            country: db.country,
            wine_type: db.wine_type,
            body: db.body,
            sweetness: db.sweetness,
            acidity: db.acidity,
            tannin: db.tannin,
            alcohol_content: db.alcohol_content,
            price: db.price,
            cost: db.cost,
            inventory_count: db.inventory_count,
            times_sold: db.times_sold,
            tasting_notes: db.tasting_notes,
            bottle_size: db.bottle_size,
            sku: db.sku,
            profit_margin,
            markup,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing wines
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListWinesQuery {
    /// Owning restaurant
    pub restaurant_id: RestaurantId,

    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match over name, producer, varietal, and region
    pub search: Option<String>,

    /// Restrict the list to one wine style
    pub wine_type: Option<WineType>,
}

/// Query parameters for the wine CSV bulk upload endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BulkUploadQuery {
    /// Restaurant receiving the uploaded rows
    pub restaurant_id: RestaurantId,
}

/// Outcome of a wine CSV bulk upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WineBulkUploadResponse {
    pub message: String,
    pub wines_created: i64,
    /// Per-row failures as "Row N: <reason>"; null when every row imported
    pub errors: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_create() -> WineCreate {
        WineCreate {
            restaurant_id: Uuid::new_v4(),
            name: "Ridge Monte Bello".to_string(),
            producer: None,
            vintage: Some(2018),
            varietal: None,
            region: None,
            country: None,
            wine_type: Some(WineType::Red),
            body: None,
            sweetness: Some(1),
            acidity: Some(4),
            tannin: Some(5),
            alcohol_content: Some(13.5),
            price: 180.0,
            cost: Some(60.0),
            inventory_count: 12,
            tasting_notes: None,
            bottle_size: "750ml".to_string(),
            sku: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(sample_create().validate().is_ok());

        let mut wine = sample_create();
        wine.name = String::new();
        assert_eq!(wine.validate().unwrap_err(), "Name must not be empty");

        let mut wine = sample_create();
        wine.vintage = Some(1850);
        assert_eq!(wine.validate().unwrap_err(), "Vintage must be between 1900 and 2030");

        let mut wine = sample_create();
        wine.sweetness = Some(6);
        assert_eq!(wine.validate().unwrap_err(), "Sweetness must be between 1 and 5");

        let mut wine = sample_create();
        wine.price = 0.0;
        assert_eq!(wine.validate().unwrap_err(), "Price must be greater than 0");

        let mut wine = sample_create();
        wine.cost = Some(180.0);
        assert_eq!(wine.validate().unwrap_err(), "Cost must be less than price");
    }

    #[test]
    fn test_update_validation_skips_absent_fields() {
        assert!(WineUpdate::default().validate().is_ok());

        let update = WineUpdate {
            price: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err(), "Price must be greater than 0");

        // The cost-below-price rule only applies at creation time
        let update = WineUpdate {
            cost: Some(500.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_response_pricing_fields() {
        use crate::db::models::wines::WineDBResponse;
        use chrono::Utc;

        let now = Utc::now();
        let db = WineDBResponse {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: "Margaux".to_string(),
            producer: None,
            vintage: None,
            varietal: None,
            region: None,
            country: None,
            wine_type: None,
            body: None,
            sweetness: None,
            acidity: None,
            tannin: None,
            alcohol_content: None,
            cost: Some(20.0),
            price: 50.0,
            inventory_count: 0,
            times_sold: 0,
            tasting_notes: None,
            bottle_size: "750ml".to_string(),
            sku: None,
            created_at: now,
            updated_at: now,
        };

        let response = WineResponse::from(db.clone());
        assert_eq!(response.profit_margin, Some(60.0));
        assert_eq!(response.markup, Some(150.0));

        let mut costless = db;
        costless.cost = None;
        let response = WineResponse::from(costless);
        assert_eq!(response.profit_margin, None);
        assert_eq!(response.markup, None);
    }
}
