//! HTTP handlers for the reporting endpoints.
//!
//! Every report is a read-only aggregation scoped to one restaurant. The
//! heavy lifting lives in [`crate::db::handlers::analytics`]; these handlers
//! only validate parameters and map the results onto the wire.

use crate::{
    AppState,
    api::models::analytics::{
        DashboardSummary, InventoryHealth, ProfitAnalysis, SalesTrendResponse, SalesTrendsQuery,
        TopBottomWines, TopBottomWinesQuery,
    },
    db::handlers::{Restaurants, analytics},
    errors::{Error, Result},
    types::RestaurantId,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};

#[utoipa::path(
    get,
    path = "/analytics/dashboard/{restaurant_id}",
    tag = "analytics",
    summary = "Dashboard summary",
    description = "Inventory totals plus sales, revenue, and profit over the trailing 30 days.",
    params(
        ("restaurant_id" = uuid::Uuid, Path, description = "Restaurant ID"),
    ),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 404, description = "Restaurant not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
) -> Result<Json<DashboardSummary>> {
    {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        if Restaurants::new(&mut conn).get_by_id(restaurant_id).await?.is_none() {
            return Err(Error::NotFound {
                resource: "Restaurant".to_string(),
                id: restaurant_id.to_string(),
            });
        }
    }

    let summary = analytics::get_dashboard_summary(&state.db, restaurant_id).await?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/analytics/top-bottom-wines/{restaurant_id}",
    tag = "analytics",
    summary = "Best and worst selling wines",
    description = "Per-wine sales metrics over the window (default last 90 days), split into top sellers and slow movers.",
    params(
        ("restaurant_id" = uuid::Uuid, Path, description = "Restaurant ID"),
        TopBottomWinesQuery,
    ),
    responses(
        (status = 200, description = "Top and bottom wines", body = TopBottomWines),
        (status = 400, description = "Invalid limit"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_top_bottom_wines(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    Query(query): Query<TopBottomWinesQuery>,
) -> Result<Json<TopBottomWines>> {
    let limit = query.limit().map_err(|message| Error::BadRequest { message })?;

    let report = analytics::get_top_bottom_wines(
        &state.db,
        restaurant_id,
        query.start_date,
        query.end_date,
        limit as usize,
    )
    .await?;

    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/analytics/sales-trends/{restaurant_id}",
    tag = "analytics",
    summary = "Daily sales trend",
    description = "Per-day quantity, revenue, and profit over the window (default last 30 days).",
    params(
        ("restaurant_id" = uuid::Uuid, Path, description = "Restaurant ID"),
        SalesTrendsQuery,
    ),
    responses(
        (status = 200, description = "Daily sales series with window totals", body = SalesTrendResponse),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_sales_trends(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    Query(query): Query<SalesTrendsQuery>,
) -> Result<Json<SalesTrendResponse>> {
    let trends = analytics::get_sales_trends(&state.db, restaurant_id, query.start_date, query.end_date).await?;

    Ok(Json(trends))
}

#[utoipa::path(
    get,
    path = "/analytics/inventory-health/{restaurant_id}",
    tag = "analytics",
    summary = "Inventory health",
    description = "Stockout projections from 30-day sales velocity, most urgent first.",
    params(
        ("restaurant_id" = uuid::Uuid, Path, description = "Restaurant ID"),
    ),
    responses(
        (status = 200, description = "Per-wine inventory health", body = Vec<InventoryHealth>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_inventory_health(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
) -> Result<Json<Vec<InventoryHealth>>> {
    let report = analytics::get_inventory_health(&state.db, restaurant_id).await?;

    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/analytics/profit-analysis/{restaurant_id}",
    tag = "analytics",
    summary = "Profit analysis",
    description = "Margin, markup, and year-to-date profit for wines with cost data, thinnest margins first.",
    params(
        ("restaurant_id" = uuid::Uuid, Path, description = "Restaurant ID"),
    ),
    responses(
        (status = 200, description = "Per-wine profitability", body = Vec<ProfitAnalysis>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_profit_analysis(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
) -> Result<Json<Vec<ProfitAnalysis>>> {
    let report = analytics::get_profit_analysis(&state.db, restaurant_id).await?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use sqlx::SqlitePool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_missing_restaurant_is_404(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get(&format!("/api/v1/analytics/dashboard/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_summary(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let barolo = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 10).await;
        create_test_wine(&pool, restaurant.id, "Chablis Grand Cru", 90.0, Some(30.0), 14).await;

        let today = Utc::now().date_naive();
        create_test_sale(&pool, restaurant.id, barolo.id, today - Duration::days(5), 3, 120.0, Some(45.0)).await;

        let response = app.get(&format!("/api/v1/analytics/dashboard/{}", restaurant.id)).await;
        response.assert_status_ok();
        let summary: DashboardSummary = response.json();

        assert_eq!(summary.total_wines, 2);
        // 10 - 3 sold plus the untouched 14
        assert_eq!(summary.total_bottles_in_stock, 21);
        assert_eq!(summary.total_sales_last_30_days, 3);
        assert_eq!(summary.revenue_last_30_days, 360.0);
        assert_eq!(summary.profit_last_30_days, Some(225.0));
        assert_eq!(summary.avg_profit_margin, Some(62.5));
        assert_eq!(summary.top_wine_this_month.as_deref(), Some("Barolo Riserva"));
        // Never-sold wines qualify as slow via the epoch sentinel
        assert_eq!(summary.slowest_wine.as_deref(), Some("Chablis Grand Cru"));
        assert_eq!(summary.wines_needing_reorder, 0);
        assert_eq!(summary.overstocked_wines, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_top_bottom_limit_is_validated(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;

        for limit in ["0", "51"] {
            let response = app
                .get(&format!(
                    "/api/v1/analytics/top-bottom-wines/{}?limit={limit}",
                    restaurant.id
                ))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let error: Value = response.json();
            assert_eq!(error["error"], "Limit must be between 1 and 50");
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_top_bottom_split(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let barolo = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 50).await;
        let chablis = create_test_wine(&pool, restaurant.id, "Chablis Grand Cru", 90.0, Some(30.0), 50).await;
        let gamay = create_test_wine(&pool, restaurant.id, "Morgon", 55.0, Some(18.0), 50).await;

        let today = Utc::now().date_naive();
        for (wine_id, quantity) in [(barolo.id, 9), (chablis.id, 5), (gamay.id, 1)] {
            create_test_sale(&pool, restaurant.id, wine_id, today - Duration::days(3), quantity, 80.0, None).await;
        }

        // Default limit of 10 swallows the whole pool: no slow movers
        let response = app
            .get(&format!("/api/v1/analytics/top-bottom-wines/{}", restaurant.id))
            .await;
        response.assert_status_ok();
        let report: TopBottomWines = response.json();
        assert_eq!(report.top_sellers.len(), 3);
        assert!(report.slow_movers.is_empty());
        assert_eq!(report.top_sellers[0].wine_name, "Barolo Riserva");
        assert_eq!(report.top_sellers[0].total_bottles_sold, 9);

        let response = app
            .get(&format!("/api/v1/analytics/top-bottom-wines/{}?limit=1", restaurant.id))
            .await;
        let report: TopBottomWines = response.json();
        assert_eq!(report.top_sellers.len(), 1);
        assert_eq!(report.top_sellers[0].wine_name, "Barolo Riserva");
        assert_eq!(report.slow_movers.len(), 1);
        assert_eq!(report.slow_movers[0].wine_name, "Morgon");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sales_trends_totals(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let wine = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 50).await;

        let day = |d: u32| chrono::NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        create_test_sale(&pool, restaurant.id, wine.id, day(2), 4, 120.0, Some(45.0)).await;
        create_test_sale(&pool, restaurant.id, wine.id, day(5), 6, 120.0, Some(45.0)).await;

        let response = app
            .get(&format!(
                "/api/v1/analytics/sales-trends/{}?start_date=2024-06-01&end_date=2024-06-10",
                restaurant.id
            ))
            .await;
        response.assert_status_ok();
        let report: SalesTrendResponse = response.json();

        assert_eq!(report.trends.len(), 2);
        // Ascending by date
        assert_eq!(report.trends[0].date, day(2));
        assert_eq!(report.trends[0].total_sales, 4);
        assert_eq!(report.trends[1].date, day(5));

        // Daily quantities always add up to the window total
        let daily_sum: i64 = report.trends.iter().map(|t| t.total_sales).sum();
        assert_eq!(daily_sum, report.total_sales);
        assert_eq!(report.total_sales, 10);
        assert_eq!(report.total_revenue, 1200.0);
        // Ten calendar days in the window
        assert_eq!(report.avg_daily_sales, 1.0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inventory_health_projection(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let wine = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 44).await;

        // 30 bottles over the last 30 days leaves 14 in stock at 1.0/day
        let today = Utc::now().date_naive();
        create_test_sale(&pool, restaurant.id, wine.id, today - Duration::days(10), 30, 120.0, Some(45.0)).await;

        let response = app
            .get(&format!("/api/v1/analytics/inventory-health/{}", restaurant.id))
            .await;
        response.assert_status_ok();
        let report: Vec<InventoryHealth> = response.json();

        assert_eq!(report.len(), 1);
        let health = &report[0];
        assert_eq!(health.current_inventory, 14);
        assert_eq!(health.avg_daily_sales, 1.0);
        assert_eq!(health.days_until_stockout, Some(14));
        assert!(!health.reorder_recommended);
        assert!(!health.overstocked);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_profit_analysis_recommendations(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        create_test_wine(&pool, restaurant.id, "Healthy Margin", 50.0, Some(20.0), 10).await;
        create_test_wine(&pool, restaurant.id, "Thin Margin", 50.0, Some(30.0), 10).await;
        // No cost data: excluded from the report entirely
        create_test_wine(&pool, restaurant.id, "Mystery Cost", 50.0, None, 10).await;

        let response = app
            .get(&format!("/api/v1/analytics/profit-analysis/{}", restaurant.id))
            .await;
        response.assert_status_ok();
        let report: Vec<ProfitAnalysis> = response.json();

        assert_eq!(report.len(), 2);
        // Thinnest margin first
        assert_eq!(report[0].wine_name, "Thin Margin");
        assert_eq!(report[0].profit_margin, 40.0);
        assert_eq!(report[0].recommended_price, Some(85.71));
        assert_eq!(report[0].total_profit_ytd, 0.0);

        assert_eq!(report[1].wine_name, "Healthy Margin");
        assert_eq!(report[1].profit_margin, 60.0);
        assert_eq!(report[1].markup_percentage, 150.0);
        assert_eq!(report[1].recommended_price, None);
    }
}
