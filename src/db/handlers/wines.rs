//! Database repository for wines.

use std::collections::HashMap;

use crate::api::models::wines::{WineBody, WineType};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::wines::{WineCreateDBRequest, WineDBResponse, WineUpdateDBRequest},
};
use crate::types::{RestaurantId, WineId, abbrev_uuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing wines
#[derive(Debug, Clone)]
pub struct WineFilter {
    pub restaurant_id: RestaurantId,
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>, // Case-insensitive substring search on name, producer, varietal, region
    pub wine_type: Option<WineType>,
}

impl WineFilter {
    pub fn new(restaurant_id: RestaurantId, skip: i64, limit: i64) -> Self {
        Self {
            restaurant_id,
            skip,
            limit,
            search: None,
            wine_type: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_wine_type(mut self, wine_type: WineType) -> Self {
        self.wine_type = Some(wine_type);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Wine {
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

pub struct Wines<'c> {
    db: &'c mut SqliteConnection,
}

impl From<Wine> for WineDBResponse {
    fn from(wine: Wine) -> Self {
        Self {
            id: wine.id,
            restaurant_id: wine.restaurant_id,
            name: wine.name,
            producer: wine.producer,
            vintage: wine.vintage,
            varietal: wine.varietal,
            region: wine.region,
            country: wine.country,
            wine_type: wine.wine_type,
            body: wine.body,
            sweetness: wine.sweetness,
            acidity: wine.acidity,
            tannin: wine.tannin,
            alcohol_content: wine.alcohol_content,
            cost: wine.cost,
            price: wine.price,
            inventory_count: wine.inventory_count,
            times_sold: wine.times_sold,
            tasting_notes: wine.tasting_notes,
            bottle_size: wine.bottle_size,
            sku: wine.sku,
            created_at: wine.created_at,
            updated_at: wine.updated_at,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Wines<'c> {
    type CreateRequest = WineCreateDBRequest;
    type UpdateRequest = WineUpdateDBRequest;
    type Response = WineDBResponse;
    type Id = WineId;
    type Filter = WineFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Always generate a new ID for wines
        let wine_id = Uuid::new_v4();
        let now = Utc::now();

        // times_sold starts from the column default of 0
        let wine = sqlx::query_as::<_, Wine>(
            r#"
            INSERT INTO wines (
                id, restaurant_id, name, producer, vintage, varietal, region, country,
                wine_type, body, sweetness, acidity, tannin, alcohol_content,
                cost, price, inventory_count, tasting_notes, bottle_size, sku,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(wine_id)
        .bind(request.restaurant_id)
        .bind(&request.name)
        .bind(&request.producer)
        .bind(request.vintage)
        .bind(&request.varietal)
        .bind(&request.region)
        .bind(&request.country)
        .bind(request.wine_type)
        .bind(request.body)
        .bind(request.sweetness)
        .bind(request.acidity)
        .bind(request.tannin)
        .bind(request.alcohol_content)
        .bind(request.cost)
        .bind(request.price)
        .bind(request.inventory_count)
        .bind(&request.tasting_notes)
        .bind(&request.bottle_size)
        .bind(&request.sku)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(WineDBResponse::from(wine))
    }

    #[instrument(skip(self), fields(wine_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let wine = sqlx::query_as::<_, Wine>("SELECT * FROM wines WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(wine.map(WineDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        use sqlx::QueryBuilder;

        let mut query = QueryBuilder::new("SELECT * FROM wines WHERE restaurant_id = ");
        query.push_bind(filter.restaurant_id);

        // Case-insensitive substring match across the descriptive columns
        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(producer, '')) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(varietal, '')) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(region, '')) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        if let Some(wine_type) = filter.wine_type {
            query.push(" AND wine_type = ");
            query.push_bind(wine_type);
        }

        query.push(" ORDER BY name LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let wines = query.build_query_as::<Wine>().fetch_all(&mut *self.db).await?;

        Ok(wines.into_iter().map(WineDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(wine_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wines WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(wine_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let wine = sqlx::query_as::<_, Wine>(
            r#"
            UPDATE wines SET
                name = COALESCE(?, name),
                producer = COALESCE(?, producer),
                vintage = COALESCE(?, vintage),
                varietal = COALESCE(?, varietal),
                region = COALESCE(?, region),
                country = COALESCE(?, country),
                wine_type = COALESCE(?, wine_type),
                body = COALESCE(?, body),
                sweetness = COALESCE(?, sweetness),
                acidity = COALESCE(?, acidity),
                tannin = COALESCE(?, tannin),
                alcohol_content = COALESCE(?, alcohol_content),
                cost = COALESCE(?, cost),
                price = COALESCE(?, price),
                inventory_count = COALESCE(?, inventory_count),
                tasting_notes = COALESCE(?, tasting_notes),
                bottle_size = COALESCE(?, bottle_size),
                sku = COALESCE(?, sku),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.producer)
        .bind(request.vintage)
        .bind(&request.varietal)
        .bind(&request.region)
        .bind(&request.country)
        .bind(request.wine_type)
        .bind(request.body)
        .bind(request.sweetness)
        .bind(request.acidity)
        .bind(request.tannin)
        .bind(request.alcohol_content)
        .bind(request.cost)
        .bind(request.price)
        .bind(request.inventory_count)
        .bind(&request.tasting_notes)
        .bind(&request.bottle_size)
        .bind(&request.sku)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(WineDBResponse::from(wine))
    }
}

impl<'c> Wines<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Count wines matching the filter, ignoring its pagination fields.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &WineFilter) -> Result<i64> {
        use sqlx::QueryBuilder;

        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM wines WHERE restaurant_id = ");
        query.push_bind(filter.restaurant_id);

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(producer, '')) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(varietal, '')) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(region, '')) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        if let Some(wine_type) = filter.wine_type {
            query.push(" AND wine_type = ");
            query.push_bind(wine_type);
        }

        let count: i64 = query.build_query_scalar().fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// Map of lowercased wine name to id for one restaurant's inventory.
    /// Bulk sale ingestion matches CSV rows against this.
    #[instrument(skip(self), fields(restaurant_id = %abbrev_uuid(&restaurant_id)), err)]
    pub async fn name_lookup(&mut self, restaurant_id: RestaurantId) -> Result<HashMap<String, WineId>> {
        let rows: Vec<(String, WineId)> = sqlx::query_as("SELECT name, id FROM wines WHERE restaurant_id = ?")
            .bind(restaurant_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|(name, id)| (name.to_lowercase(), id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::restaurants::Restaurants;
    use crate::db::models::restaurants::RestaurantCreateDBRequest;
    use sqlx::SqlitePool;

    async fn seed_restaurant(pool: &SqlitePool) -> RestaurantId {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Restaurants::new(&mut conn);
        let request = RestaurantCreateDBRequest {
            name: "Test Bistro".to_string(),
            email: "bistro@example.com".to_string(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
        };
        repo.create(&request).await.expect("Failed to create test restaurant").id
    }

    fn sample_wine(restaurant_id: RestaurantId) -> WineCreateDBRequest {
        WineCreateDBRequest {
            restaurant_id,
            name: "Ridge Monte Bello".to_string(),
            producer: Some("Ridge Vineyards".to_string()),
            vintage: Some(2018),
            varietal: Some("Cabernet Sauvignon".to_string()),
            region: Some("Santa Cruz Mountains".to_string()),
            country: Some("USA".to_string()),
            wine_type: Some(WineType::Red),
            body: Some(WineBody::Full),
            sweetness: Some(1),
            acidity: Some(4),
            tannin: Some(5),
            alcohol_content: Some(13.5),
            cost: Some(60.0),
            price: 180.0,
            inventory_count: 12,
            tasting_notes: None,
            bottle_size: "750ml".to_string(),
            sku: Some("RMB-2018".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_wine(pool: SqlitePool) {
        let restaurant_id = seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let wine = repo.create(&sample_wine(restaurant_id)).await.unwrap();

        assert_eq!(wine.name, "Ridge Monte Bello");
        assert_eq!(wine.restaurant_id, restaurant_id);
        assert_eq!(wine.wine_type, Some(WineType::Red));
        assert_eq!(wine.inventory_count, 12);
        assert_eq!(wine.times_sold, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_wine_unknown_restaurant_is_fk_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let err = repo.create(&sample_wine(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_wine_partial(pool: SqlitePool) {
        let restaurant_id = seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let wine = repo.create(&sample_wine(restaurant_id)).await.unwrap();

        let update = WineUpdateDBRequest {
            name: None,
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
            cost: None,
            price: Some(195.0),
            inventory_count: Some(9),
            tasting_notes: None,
            bottle_size: None,
            sku: None,
        };

        let updated = repo.update(wine.id, &update).await.unwrap();
        assert_eq!(updated.price, 195.0);
        assert_eq!(updated.inventory_count, 9);
        // Untouched fields keep their values
        assert_eq!(updated.name, "Ridge Monte Bello");
        assert_eq!(updated.cost, Some(60.0));
        assert_eq!(updated.created_at, wine.created_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_wine_is_not_found(pool: SqlitePool) {
        seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let update = WineUpdateDBRequest {
            name: Some("Ghost Wine".to_string()),
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
            cost: None,
            price: None,
            inventory_count: None,
            tasting_notes: None,
            bottle_size: None,
            sku: None,
        };

        let err = repo.update(Uuid::new_v4(), &update).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_wines_search_and_type_filter(pool: SqlitePool) {
        let restaurant_id = seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let mut pinot = sample_wine(restaurant_id);
        pinot.name = "Willamette Cuvee".to_string();
        pinot.varietal = Some("Pinot Noir".to_string());
        pinot.producer = Some("Eyrie".to_string());
        repo.create(&pinot).await.unwrap();

        let mut chablis = sample_wine(restaurant_id);
        chablis.name = "Chablis Premier Cru".to_string();
        chablis.varietal = Some("Chardonnay".to_string());
        chablis.wine_type = Some(WineType::White);
        repo.create(&chablis).await.unwrap();

        repo.create(&sample_wine(restaurant_id)).await.unwrap();

        // Substring search is case-insensitive and covers varietal
        let filter = WineFilter::new(restaurant_id, 0, 50).with_search("PINOT".to_string());
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Willamette Cuvee");

        let filter = WineFilter::new(restaurant_id, 0, 50).with_wine_type(WineType::White);
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Chablis Premier Cru");

        let filter = WineFilter::new(restaurant_id, 0, 50);
        assert_eq!(repo.count(&filter).await.unwrap(), 3);
        let filter = filter.with_search("pinot".to_string());
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_wines_pagination(pool: SqlitePool) {
        let restaurant_id = seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        for i in 0..5 {
            let mut wine = sample_wine(restaurant_id);
            wine.name = format!("Wine {i}");
            repo.create(&wine).await.unwrap();
        }

        let page1 = repo.list(&WineFilter::new(restaurant_id, 0, 2)).await.unwrap();
        let page2 = repo.list(&WineFilter::new(restaurant_id, 2, 2)).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 2);
        // Name-ordered pages never overlap
        assert_eq!(page1[0].name, "Wine 0");
        assert_eq!(page2[0].name, "Wine 2");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_wine(pool: SqlitePool) {
        let restaurant_id = seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let wine = repo.create(&sample_wine(restaurant_id)).await.unwrap();

        assert!(repo.delete(wine.id).await.unwrap());
        assert!(repo.get_by_id(wine.id).await.unwrap().is_none());
        assert!(!repo.delete(wine.id).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_name_lookup_lowercases_keys(pool: SqlitePool) {
        let restaurant_id = seed_restaurant(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Wines::new(&mut conn);

        let wine = repo.create(&sample_wine(restaurant_id)).await.unwrap();

        let lookup = repo.name_lookup(restaurant_id).await.unwrap();
        assert_eq!(lookup.get("ridge monte bello"), Some(&wine.id));
        assert!(!lookup.contains_key("Ridge Monte Bello"));
    }
}
