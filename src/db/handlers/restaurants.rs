//! Database repository for restaurants.
//!
//! Restaurants are the tenant root: every wine, sale, and dish row hangs off
//! one. The API surface is create/get/list only, so this repository stays off
//! the [`Repository`](super::repository::Repository) trait and exposes inherent
//! methods.

use crate::db::{
    errors::Result,
    models::restaurants::{RestaurantCreateDBRequest, RestaurantDBResponse},
};
use crate::types::{RestaurantId, abbrev_uuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Restaurant {
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

pub struct Restaurants<'c> {
    db: &'c mut SqliteConnection,
}

impl From<Restaurant> for RestaurantDBResponse {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name,
            email: restaurant.email,
            phone: restaurant.phone,
            address: restaurant.address,
            city: restaurant.city,
            state: restaurant.state,
            zip_code: restaurant.zip_code,
            is_active: restaurant.is_active,
            subscription_tier: restaurant.subscription_tier,
            created_at: restaurant.created_at,
            updated_at: restaurant.updated_at,
        }
    }
}

impl<'c> Restaurants<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &RestaurantCreateDBRequest) -> Result<RestaurantDBResponse> {
        // Always generate a new ID for restaurants
        let restaurant_id = Uuid::new_v4();
        let now = Utc::now();

        // is_active and subscription_tier come from column defaults
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            INSERT INTO restaurants (id, name, email, phone, address, city, state, zip_code, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.zip_code)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(RestaurantDBResponse::from(restaurant))
    }

    #[instrument(skip(self), fields(restaurant_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: RestaurantId) -> Result<Option<RestaurantDBResponse>> {
        let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(restaurant.map(RestaurantDBResponse::from))
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<RestaurantDBResponse>> {
        let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(restaurant.map(RestaurantDBResponse::from))
    }

    #[instrument(skip(self), fields(limit = limit, skip = skip), err)]
    pub async fn list(&mut self, skip: i64, limit: i64) -> Result<Vec<RestaurantDBResponse>> {
        let restaurants = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(restaurants.into_iter().map(RestaurantDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use sqlx::SqlitePool;

    fn sample_create() -> RestaurantCreateDBRequest {
        RestaurantCreateDBRequest {
            name: "Maison Lumiere".to_string(),
            email: "cellar@maisonlumiere.example".to_string(),
            phone: Some("555-0142".to_string()),
            address: Some("12 Harbor Way".to_string()),
            city: Some("Portland".to_string()),
            state: Some("OR".to_string()),
            zip_code: Some("97209".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_restaurant(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Restaurants::new(&mut conn);

        let created = repo.create(&sample_create()).await.unwrap();

        assert_eq!(created.name, "Maison Lumiere");
        assert_eq!(created.email, "cellar@maisonlumiere.example");
        assert!(created.is_active);
        assert_eq!(created.subscription_tier, "trial");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_restaurant_by_email(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Restaurants::new(&mut conn);

        let created = repo.create(&sample_create()).await.unwrap();

        let found = repo.get_by_email("cellar@maisonlumiere.example").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);

        let missing = repo.get_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_unique_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Restaurants::new(&mut conn);

        repo.create(&sample_create()).await.unwrap();
        let err = repo.create(&sample_create()).await.unwrap_err();

        match err {
            DbError::UniqueViolation { table, constraint, .. } => {
                assert_eq!(table.as_deref(), Some("restaurants"));
                assert_eq!(constraint.as_deref(), Some("email"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_restaurants_paginated(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Restaurants::new(&mut conn);

        for i in 0..3 {
            let mut request = sample_create();
            request.name = format!("Restaurant {i}");
            request.email = format!("r{i}@example.com");
            repo.create(&request).await.unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 3);

        let first_page = repo.list(0, 2).await.unwrap();
        assert_eq!(first_page.len(), 2);

        let second_page = repo.list(2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
    }
}
