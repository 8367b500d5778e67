//! API models for restaurant accounts.

use crate::api::models::pagination::Pagination;
use crate::db::models::restaurants::RestaurantDBResponse;
use crate::types::RestaurantId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Structural email check: one `@` with a non-empty local part and a
/// dotted domain. Deliverability is the mail system's problem.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Request to register a restaurant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantCreate {
    pub name: String,
    /// Contact email, unique across all restaurants
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl RestaurantCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Name must not be empty".to_string());
        }
        if !is_valid_email(&self.email) {
            return Err(format!("Invalid email address: {}", self.email));
        }
        Ok(())
    }
}

/// Restaurant as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantResponse {
    #[schema(value_type = String, format = "uuid")]
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
}

/// Query parameters for listing restaurants
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListRestaurantsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

impl From<RestaurantDBResponse> for RestaurantResponse {
    fn from(db: RestaurantDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            phone: db.phone,
            address: db.address,
            city: db.city,
            state: db.state,
            zip_code: db.zip_code,
            is_active: db.is_active,
            subscription_tier: db.subscription_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_structure() {
        assert!(is_valid_email("cellar@maisonlumiere.example"));
        assert!(is_valid_email("a@b.co"));

        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.example.com"));
    }

    #[test]
    fn test_create_validation() {
        let restaurant = RestaurantCreate {
            name: "Maison Lumiere".to_string(),
            email: "cellar@maisonlumiere.example".to_string(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
        };
        assert!(restaurant.validate().is_ok());

        let mut unnamed = restaurant.clone();
        unnamed.name = String::new();
        assert_eq!(unnamed.validate().unwrap_err(), "Name must not be empty");

        let mut bad_email = restaurant;
        bad_email.email = "front-desk".to_string();
        assert_eq!(
            bad_email.validate().unwrap_err(),
            "Invalid email address: front-desk"
        );
    }
}
