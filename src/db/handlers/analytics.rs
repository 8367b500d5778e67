//! Database queries for sales analytics and inventory reports.
//!
//! Unlike the CRUD repositories these functions take the pool directly, so a
//! single report can fan its aggregate queries out concurrently. All profit
//! sums are strict about missing cost data: if any sale row in the window
//! lacks `unit_cost`, the aggregate is reported as absent rather than as a
//! partial figure.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use crate::{
    api::models::analytics::{
        DashboardSummary, InventoryHealth, ProfitAnalysis, SalesTrend, SalesTrendResponse,
        TopBottomWines, WineSalesMetric,
    },
    db::errors::Result,
    pricing::{recommended_price, round2},
    types::{RestaurantId, WineId},
};

/// Wine and bottle totals for one restaurant
#[derive(FromRow)]
struct InventoryTotalsRow {
    pub total_wines: i64,
    pub total_bottles_in_stock: i64,
}

/// Windowed sale aggregates for the dashboard
#[derive(FromRow)]
struct SalesWindowRow {
    pub total_sales: Option<i64>,
    pub total_revenue: Option<f64>,
    pub total_profit: Option<f64>,
}

/// Per-wine sale aggregates from the top/bottom query
#[derive(FromRow)]
struct WineMetricsRow {
    pub wine_id: WineId,
    pub wine_name: String,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub total_bottles_sold: i64,
    pub total_revenue: f64,
    pub total_profit: Option<f64>,
    pub avg_price: f64,
    pub last_sale_date: NaiveDate,
}

/// One day of sales from the trend query
#[derive(FromRow)]
struct DailySalesRow {
    pub sale_date: NaiveDate,
    pub total_sales: i64,
    pub total_revenue: f64,
    pub total_profit: Option<f64>,
    pub unique_wines_sold: i64,
}

/// Inventory level plus 30-day sales volume for one wine
#[derive(FromRow)]
struct StockVelocityRow {
    pub wine_id: WineId,
    pub wine_name: String,
    pub inventory_count: i64,
    pub sold_last_30_days: i64,
}

/// Costed wine with its year-to-date realized profit
#[derive(FromRow)]
struct CostedWineRow {
    pub wine_id: WineId,
    pub wine_name: String,
    pub cost: f64,
    pub price: f64,
    pub total_profit_ytd: Option<f64>,
}

#[instrument(skip(db), err)]
async fn get_inventory_totals(db: &SqlitePool, restaurant_id: RestaurantId) -> Result<InventoryTotalsRow> {
    let totals = sqlx::query_as::<_, InventoryTotalsRow>(
        r#"
        SELECT
            COUNT(*) AS total_wines,
            COALESCE(SUM(inventory_count), 0) AS total_bottles_in_stock
        FROM wines
        WHERE restaurant_id = ?
        "#,
    )
    .bind(restaurant_id)
    .fetch_one(db)
    .await?;

    Ok(totals)
}

#[instrument(skip(db), err)]
async fn get_sales_window(
    db: &SqlitePool,
    restaurant_id: RestaurantId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<SalesWindowRow> {
    let window = sqlx::query_as::<_, SalesWindowRow>(
        r#"
        SELECT
            SUM(quantity) AS total_sales,
            SUM(total_amount) AS total_revenue,
            CASE WHEN COUNT(*) = COUNT(unit_cost)
                 THEN SUM(quantity * (unit_price - unit_cost))
            END AS total_profit
        FROM sales
        WHERE restaurant_id = ? AND sale_date >= ? AND sale_date <= ?
        "#,
    )
    .bind(restaurant_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(db)
    .await?;

    Ok(window)
}

#[instrument(skip(db), err)]
async fn get_top_wine(
    db: &SqlitePool,
    restaurant_id: RestaurantId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Option<String>> {
    let name = sqlx::query_scalar(
        r#"
        SELECT w.name
        FROM wines w
        JOIN sales s ON s.wine_id = w.id
        WHERE s.restaurant_id = ? AND s.sale_date >= ? AND s.sale_date <= ?
        GROUP BY w.id, w.name
        ORDER BY SUM(s.quantity) DESC
        LIMIT 1
        "#,
    )
    .bind(restaurant_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(db)
    .await?;

    Ok(name)
}

/// The wine whose most recent sale (epoch sentinel when it never sold) is
/// oldest, provided it predates the cutoff.
#[instrument(skip(db), err)]
async fn get_slowest_wine(db: &SqlitePool, restaurant_id: RestaurantId, cutoff: NaiveDate) -> Result<Option<String>> {
    let name = sqlx::query_scalar(
        r#"
        SELECT w.name
        FROM wines w
        LEFT JOIN sales s ON s.wine_id = w.id
        WHERE w.restaurant_id = ?
        GROUP BY w.id, w.name
        HAVING COALESCE(MAX(s.sale_date), '1900-01-01') < ?
        ORDER BY COALESCE(MAX(s.sale_date), '1900-01-01'), w.name
        LIMIT 1
        "#,
    )
    .bind(restaurant_id)
    .bind(cutoff)
    .fetch_optional(db)
    .await?;

    Ok(name)
}

#[instrument(skip(db), err)]
async fn count_wines_needing_reorder(db: &SqlitePool, restaurant_id: RestaurantId) -> Result<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM wines WHERE restaurant_id = ? AND inventory_count < 5 AND times_sold > 0",
    )
    .bind(restaurant_id)
    .fetch_one(db)
    .await?;

    Ok(count)
}

#[instrument(skip(db), err)]
async fn count_overstocked_wines(db: &SqlitePool, restaurant_id: RestaurantId) -> Result<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM wines WHERE restaurant_id = ? AND inventory_count > 20 AND times_sold < 5",
    )
    .bind(restaurant_id)
    .fetch_one(db)
    .await?;

    Ok(count)
}

/// Number of calendar days in the inclusive [start, end] window.
fn day_span(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

fn average_per_day(total: i64, days: i64) -> f64 {
    if days > 0 { total as f64 / days as f64 } else { 0.0 }
}

/// Split a descending metric list into top sellers and slow movers.
///
/// The tail is suppressed entirely when the pool is no bigger than the limit,
/// so a small list never reports the same wine on both ends.
fn split_top_and_slow(metrics: Vec<WineSalesMetric>, limit: usize) -> (Vec<WineSalesMetric>, Vec<WineSalesMetric>) {
    if metrics.len() > limit {
        let slow_movers = metrics[metrics.len() - limit..].to_vec();
        let top_sellers = metrics.into_iter().take(limit).collect();
        (top_sellers, slow_movers)
    } else {
        (metrics, Vec::new())
    }
}

/// Stocking outlook for one wine from its 30-day sales velocity.
fn stock_outlook(row: &StockVelocityRow) -> InventoryHealth {
    let avg_daily_sales = row.sold_last_30_days as f64 / 30.0;

    let days_until_stockout =
        (row.sold_last_30_days > 0).then(|| (row.inventory_count as f64 / avg_daily_sales) as i64);

    let reorder_recommended = days_until_stockout.is_some_and(|days| days < 7);
    let overstocked = row.inventory_count > 20
        && (row.sold_last_30_days == 0 || days_until_stockout.is_some_and(|days| days > 90));

    InventoryHealth {
        wine_id: row.wine_id,
        wine_name: row.wine_name.clone(),
        current_inventory: row.inventory_count,
        avg_daily_sales: round2(avg_daily_sales),
        days_until_stockout,
        reorder_recommended,
        overstocked,
    }
}

/// Overall dashboard summary over a fixed 30-day window ending today.
#[instrument(skip(db), err)]
pub async fn get_dashboard_summary(db: &SqlitePool, restaurant_id: RestaurantId) -> Result<DashboardSummary> {
    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(30);

    // Execute all queries concurrently
    let (totals, sales, top_wine, slowest_wine, needing_reorder, overstocked) = tokio::try_join!(
        get_inventory_totals(db, restaurant_id),
        get_sales_window(db, restaurant_id, start_date, end_date),
        get_top_wine(db, restaurant_id, start_date, end_date),
        get_slowest_wine(db, restaurant_id, start_date),
        count_wines_needing_reorder(db, restaurant_id),
        count_overstocked_wines(db, restaurant_id),
    )?;

    let revenue = sales.total_revenue.unwrap_or(0.0);
    let profit = sales.total_profit;
    let avg_profit_margin = match profit {
        Some(profit) if revenue > 0.0 => Some(profit / revenue * 100.0),
        _ => None,
    };

    Ok(DashboardSummary {
        total_wines: totals.total_wines,
        total_bottles_in_stock: totals.total_bottles_in_stock,
        total_sales_last_30_days: sales.total_sales.unwrap_or(0),
        revenue_last_30_days: revenue,
        profit_last_30_days: profit,
        avg_profit_margin,
        top_wine_this_month: top_wine,
        slowest_wine,
        wines_needing_reorder: needing_reorder,
        overstocked_wines: overstocked,
    })
}

/// Best and worst selling wines by volume over the window (default last 90 days).
#[instrument(skip(db), err)]
pub async fn get_top_bottom_wines(
    db: &SqlitePool,
    restaurant_id: RestaurantId,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    limit: usize,
) -> Result<TopBottomWines> {
    let end_date = end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start_date = start_date.unwrap_or_else(|| end_date - Duration::days(90));

    let rows = sqlx::query_as::<_, WineMetricsRow>(
        r#"
        SELECT
            w.id AS wine_id,
            w.name AS wine_name,
            w.producer AS producer,
            w.vintage AS vintage,
            SUM(s.quantity) AS total_bottles_sold,
            SUM(s.total_amount) AS total_revenue,
            CASE WHEN COUNT(*) = COUNT(s.unit_cost)
                 THEN SUM(s.quantity * (s.unit_price - s.unit_cost))
            END AS total_profit,
            AVG(s.unit_price) AS avg_price,
            MAX(s.sale_date) AS last_sale_date
        FROM wines w
        JOIN sales s ON s.wine_id = w.id
        WHERE w.restaurant_id = ? AND s.sale_date >= ? AND s.sale_date <= ?
        GROUP BY w.id, w.name, w.producer, w.vintage
        ORDER BY total_bottles_sold DESC
        "#,
    )
    .bind(restaurant_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(db)
    .await?;

    let metrics: Vec<WineSalesMetric> = rows
        .into_iter()
        .map(|row| {
            let profit_margin = match row.total_profit {
                Some(profit) if row.total_revenue > 0.0 => Some(profit / row.total_revenue * 100.0),
                _ => None,
            };

            WineSalesMetric {
                wine_id: row.wine_id,
                wine_name: row.wine_name,
                producer: row.producer,
                vintage: row.vintage,
                total_bottles_sold: row.total_bottles_sold,
                total_revenue: row.total_revenue,
                total_profit: row.total_profit,
                avg_price: row.avg_price,
                profit_margin,
                last_sale_date: Some(row.last_sale_date),
                days_since_last_sale: Some((end_date - row.last_sale_date).num_days()),
            }
        })
        .collect();

    let (top_sellers, slow_movers) = split_top_and_slow(metrics, limit);

    Ok(TopBottomWines { top_sellers, slow_movers })
}

/// Daily sales series over the window (default last 30 days).
#[instrument(skip(db), err)]
pub async fn get_sales_trends(
    db: &SqlitePool,
    restaurant_id: RestaurantId,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<SalesTrendResponse> {
    let end_date = end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start_date = start_date.unwrap_or_else(|| end_date - Duration::days(30));

    let rows = sqlx::query_as::<_, DailySalesRow>(
        r#"
        SELECT
            sale_date,
            SUM(quantity) AS total_sales,
            SUM(total_amount) AS total_revenue,
            CASE WHEN COUNT(*) = COUNT(unit_cost)
                 THEN SUM(quantity * (unit_price - unit_cost))
            END AS total_profit,
            COUNT(DISTINCT wine_id) AS unique_wines_sold
        FROM sales
        WHERE restaurant_id = ? AND sale_date >= ? AND sale_date <= ?
        GROUP BY sale_date
        ORDER BY sale_date
        "#,
    )
    .bind(restaurant_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(db)
    .await?;

    let trends: Vec<SalesTrend> = rows
        .into_iter()
        .map(|row| SalesTrend {
            date: row.sale_date,
            total_sales: row.total_sales,
            total_revenue: row.total_revenue,
            total_profit: row.total_profit,
            unique_wines_sold: row.unique_wines_sold,
        })
        .collect();

    let total_sales: i64 = trends.iter().map(|t| t.total_sales).sum();
    let total_revenue: f64 = trends.iter().map(|t| t.total_revenue).sum();
    let avg_daily_sales = average_per_day(total_sales, day_span(start_date, end_date));

    Ok(SalesTrendResponse {
        period_start: start_date,
        period_end: end_date,
        trends,
        total_sales,
        total_revenue,
        avg_daily_sales,
    })
}

/// Stocking outlook for every wine, most urgent first.
#[instrument(skip(db), err)]
pub async fn get_inventory_health(db: &SqlitePool, restaurant_id: RestaurantId) -> Result<Vec<InventoryHealth>> {
    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(30);

    let rows = sqlx::query_as::<_, StockVelocityRow>(
        r#"
        SELECT
            w.id AS wine_id,
            w.name AS wine_name,
            w.inventory_count AS inventory_count,
            COALESCE(SUM(CASE WHEN s.sale_date >= ? AND s.sale_date <= ? THEN s.quantity END), 0)
                AS sold_last_30_days
        FROM wines w
        LEFT JOIN sales s ON s.wine_id = w.id
        WHERE w.restaurant_id = ?
        GROUP BY w.id, w.name, w.inventory_count
        "#,
    )
    .bind(start_date)
    .bind(end_date)
    .bind(restaurant_id)
    .fetch_all(db)
    .await?;

    let mut health: Vec<InventoryHealth> = rows.iter().map(stock_outlook).collect();

    // Reorder candidates first, closest stockout first; never-selling wines last
    health.sort_by_key(|h| (!h.reorder_recommended, h.days_until_stockout.unwrap_or(999)));

    Ok(health)
}

/// Margin, markup, and pricing recommendation for every wine with cost data.
///
/// Wines without a positive cost are excluded outright. Sorted ascending by
/// margin so the wines needing pricing attention come first.
#[instrument(skip(db), err)]
pub async fn get_profit_analysis(db: &SqlitePool, restaurant_id: RestaurantId) -> Result<Vec<ProfitAnalysis>> {
    let today = Utc::now().date_naive();
    let year_start =
        NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("January 1st is always a valid date");

    let rows = sqlx::query_as::<_, CostedWineRow>(
        r#"
        SELECT
            w.id AS wine_id,
            w.name AS wine_name,
            w.cost AS cost,
            w.price AS price,
            CASE WHEN COUNT(s.id) = COUNT(s.unit_cost)
                 THEN SUM(s.quantity * (s.unit_price - s.unit_cost))
            END AS total_profit_ytd
        FROM wines w
        LEFT JOIN sales s ON s.wine_id = w.id AND s.sale_date >= ?
        WHERE w.restaurant_id = ? AND w.cost IS NOT NULL AND w.cost > 0
        GROUP BY w.id, w.name, w.cost, w.price
        "#,
    )
    .bind(year_start)
    .bind(restaurant_id)
    .fetch_all(db)
    .await?;

    let mut analyses: Vec<ProfitAnalysis> = rows
        .into_iter()
        .map(|row| {
            // Recommendation threshold works on the unrounded margin
            let margin = (row.price - row.cost) / row.price * 100.0;
            let markup = (row.price - row.cost) / row.cost * 100.0;

            ProfitAnalysis {
                wine_id: row.wine_id,
                wine_name: row.wine_name,
                cost: row.cost,
                price: row.price,
                profit_per_bottle: row.price - row.cost,
                profit_margin: round2(margin),
                markup_percentage: round2(markup),
                total_profit_ytd: row.total_profit_ytd.unwrap_or(0.0),
                recommended_price: recommended_price(row.cost, margin),
            }
        })
        .collect();

    analyses.sort_by(|a, b| a.profit_margin.total_cmp(&b.profit_margin));

    Ok(analyses)
}
