//! Database repository for wine sales.
//!
//! Sales are immutable once recorded, so this repository stays off the
//! [`Repository`](super::repository::Repository) trait: there is no update
//! operation, and create/delete also maintain the per-wine counters
//! (`times_sold`, `inventory_count`) inside a single transaction.

use crate::db::{
    errors::{DbError, Result},
    models::sales::{SaleCreateDBRequest, SaleDBResponse},
};
use crate::types::{RestaurantId, SaleId, WineId, abbrev_uuid};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing sales
#[derive(Debug, Clone)]
pub struct SaleFilter {
    pub restaurant_id: RestaurantId,
    pub skip: i64,
    pub limit: i64,
    pub wine_id: Option<WineId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SaleFilter {
    pub fn new(restaurant_id: RestaurantId, skip: i64, limit: i64) -> Self {
        Self {
            restaurant_id,
            skip,
            limit,
            wine_id: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_wine_id(mut self, wine_id: WineId) -> Self {
        self.wine_id = Some(wine_id);
        self
    }

    pub fn with_date_range(mut self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Sale {
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
    pub inventory_decremented: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Sale> for SaleDBResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            restaurant_id: sale.restaurant_id,
            wine_id: sale.wine_id,
            sale_date: sale.sale_date,
            quantity: sale.quantity,
            unit_price: sale.unit_price,
            unit_cost: sale.unit_cost,
            total_amount: sale.total_amount,
            server_name: sale.server_name,
            table_number: sale.table_number,
            notes: sale.notes,
            pos_transaction_id: sale.pos_transaction_id,
            created_at: sale.created_at,
        }
    }
}

pub struct Sales<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Sales<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Record a sale and roll its quantity into the wine's counters.
    ///
    /// `times_sold` always grows by the sold quantity. `inventory_count` is
    /// only deducted when enough stock is on hand, so an over-recorded sale
    /// never drives the inventory negative; whether the deduction happened is
    /// stored on the sale row so deletion can reverse exactly what was taken.
    /// Both writes and the insert share one transaction; inside an enclosing
    /// transaction this becomes a savepoint, which is what bulk ingestion
    /// relies on for per-row rollback.
    #[instrument(skip(self, request), fields(wine_id = %abbrev_uuid(&request.wine_id), quantity = request.quantity), err)]
    pub async fn create(&mut self, request: &SaleCreateDBRequest) -> Result<SaleDBResponse> {
        let sale_id = Uuid::new_v4();
        let now = Utc::now();
        let total_amount = request.unit_price * request.quantity as f64;

        let mut tx = self.db.begin().await?;

        let inventory: i64 = sqlx::query_scalar("SELECT inventory_count FROM wines WHERE id = ?")
            .bind(request.wine_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

        let decremented = inventory >= request.quantity;
        let stock_delta = if decremented { request.quantity } else { 0 };

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                id, restaurant_id, wine_id, sale_date, quantity, unit_price,
                unit_cost, total_amount, server_name, table_number, notes,
                pos_transaction_id, inventory_decremented, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(request.restaurant_id)
        .bind(request.wine_id)
        .bind(request.sale_date)
        .bind(request.quantity)
        .bind(request.unit_price)
        .bind(request.unit_cost)
        .bind(total_amount)
        .bind(&request.server_name)
        .bind(&request.table_number)
        .bind(&request.notes)
        .bind(&request.pos_transaction_id)
        .bind(decremented)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE wines SET
                times_sold = times_sold + ?,
                inventory_count = inventory_count - ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.quantity)
        .bind(stock_delta)
        .bind(now)
        .bind(request.wine_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SaleDBResponse::from(sale))
    }

    #[instrument(skip(self), fields(sale_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: SaleId) -> Result<Option<SaleDBResponse>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(sale.map(SaleDBResponse::from))
    }

    /// List sales newest first (by sale date, then by recording time).
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &SaleFilter) -> Result<Vec<SaleDBResponse>> {
        use sqlx::QueryBuilder;

        let mut query = QueryBuilder::new("SELECT * FROM sales WHERE restaurant_id = ");
        query.push_bind(filter.restaurant_id);

        if let Some(wine_id) = filter.wine_id {
            query.push(" AND wine_id = ");
            query.push_bind(wine_id);
        }

        if let Some(start_date) = filter.start_date {
            query.push(" AND sale_date >= ");
            query.push_bind(start_date);
        }

        if let Some(end_date) = filter.end_date {
            query.push(" AND sale_date <= ");
            query.push_bind(end_date);
        }

        query.push(" ORDER BY sale_date DESC, created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let sales = query.build_query_as::<Sale>().fetch_all(&mut *self.db).await?;

        Ok(sales.into_iter().map(SaleDBResponse::from).collect())
    }

    /// Count sales matching the filter, ignoring its pagination fields.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &SaleFilter) -> Result<i64> {
        use sqlx::QueryBuilder;

        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM sales WHERE restaurant_id = ");
        query.push_bind(filter.restaurant_id);

        if let Some(wine_id) = filter.wine_id {
            query.push(" AND wine_id = ");
            query.push_bind(wine_id);
        }

        if let Some(start_date) = filter.start_date {
            query.push(" AND sale_date >= ");
            query.push_bind(start_date);
        }

        if let Some(end_date) = filter.end_date {
            query.push(" AND sale_date <= ");
            query.push_bind(end_date);
        }

        let count: i64 = query.build_query_scalar().fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// Delete a sale and hand back exactly what it took from the wine.
    ///
    /// `times_sold` is reduced by the quantity, clamped at zero. Stock is
    /// only restored when the sale actually deducted it at creation time, so
    /// the create-then-delete round trip is net zero on both counters even
    /// for sales recorded against insufficient inventory.
    #[instrument(skip(self), fields(sale_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: SaleId) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(sale) = sale else {
            return Ok(false);
        };

        let stock_delta = if sale.inventory_decremented { sale.quantity } else { 0 };

        sqlx::query(
            r#"
            UPDATE wines SET
                times_sold = MAX(0, times_sold - ?),
                inventory_count = inventory_count + ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(sale.quantity)
        .bind(stock_delta)
        .bind(Utc::now())
        .bind(sale.wine_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }
}
