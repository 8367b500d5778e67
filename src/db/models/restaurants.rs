//! Database models for restaurants.

use crate::api::models::restaurants::RestaurantCreate;
use crate::types::RestaurantId;
use chrono::{DateTime, Utc};

/// Database request for creating a new restaurant
#[derive(Debug, Clone)]
pub struct RestaurantCreateDBRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl From<RestaurantCreate> for RestaurantCreateDBRequest {
    fn from(api: RestaurantCreate) -> Self {
        Self {
            name: api.name,
            email: api.email,
            phone: api.phone,
            address: api.address,
            city: api.city,
            state: api.state,
            zip_code: api.zip_code,
        }
    }
}

/// Database response for a restaurant
#[derive(Debug, Clone)]
pub struct RestaurantDBResponse {
    pub id: RestaurantId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: bool,
    pub subscription_tier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
