//! API models for the analytics endpoints.
//!
//! Profit-derived fields are optional throughout: any sale or wine without
//! cost data makes the profit for its aggregate unknowable, and the API
//! reports `null` rather than a number computed from partial costs.

use crate::types::WineId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// At-a-glance numbers for a restaurant over the last 30 days
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub total_wines: i64,
    pub total_bottles_in_stock: i64,
    pub total_sales_last_30_days: i64,
    pub revenue_last_30_days: f64,
    /// Absent when any sale in the window is missing its unit cost
    pub profit_last_30_days: Option<f64>,
    /// Profit over revenue, absent whenever the profit is
    pub avg_profit_margin: Option<f64>,
    /// Name of the wine with the most bottles sold in the window
    pub top_wine_this_month: Option<String>,
    /// Name of a stocked wine with no sales in the window
    pub slowest_wine: Option<String>,
    pub wines_needing_reorder: i64,
    pub overstocked_wines: i64,
}

/// Sales performance of one wine over a reporting window
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WineSalesMetric {
    #[schema(value_type = String, format = "uuid")]
    pub wine_id: WineId,
    pub wine_name: String,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub total_bottles_sold: i64,
    pub total_revenue: f64,
    pub total_profit: Option<f64>,
    pub avg_price: f64,
    pub profit_margin: Option<f64>,
    pub last_sale_date: Option<NaiveDate>,
    pub days_since_last_sale: Option<i64>,
}

/// Best and worst sellers over a reporting window
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopBottomWines {
    pub top_sellers: Vec<WineSalesMetric>,
    pub slow_movers: Vec<WineSalesMetric>,
}

/// One day's sales totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesTrend {
    pub date: NaiveDate,
    pub total_sales: i64,
    pub total_revenue: f64,
    pub total_profit: Option<f64>,
    pub unique_wines_sold: i64,
}

/// Daily sales series plus window totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesTrendResponse {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub trends: Vec<SalesTrend>,
    pub total_sales: i64,
    pub total_revenue: f64,
    /// Bottles per day across the whole window, including zero-sale days
    pub avg_daily_sales: f64,
}

/// Stocking outlook for one wine based on its trailing 30-day velocity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryHealth {
    #[schema(value_type = String, format = "uuid")]
    pub wine_id: WineId,
    pub wine_name: String,
    pub current_inventory: i64,
    pub avg_daily_sales: f64,
    /// Absent when the wine had no sales in the last 30 days
    pub days_until_stockout: Option<i64>,
    pub reorder_recommended: bool,
    pub overstocked: bool,
}

/// Margin picture for one costed wine
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfitAnalysis {
    #[schema(value_type = String, format = "uuid")]
    pub wine_id: WineId,
    pub wine_name: String,
    pub cost: f64,
    pub price: f64,
    pub profit_per_bottle: f64,
    pub profit_margin: f64,
    pub markup_percentage: f64,
    pub total_profit_ytd: f64,
    /// Suggested menu price, present when the current margin is below target
    pub recommended_price: Option<f64>,
}

/// Query parameters for the top/bottom wines report
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TopBottomWinesQuery {
    /// Start of the reporting window; defaults to 90 days before the end
    pub start_date: Option<NaiveDate>,

    /// End of the reporting window; defaults to today
    pub end_date: Option<NaiveDate>,

    /// How many wines to return in each direction
    #[param(default = 10, minimum = 1, maximum = 50)]
    pub limit: Option<i64>,
}

impl TopBottomWinesQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 50;

    pub fn limit(&self) -> Result<i64, String> {
        let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT);
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(format!("Limit must be between 1 and {}", Self::MAX_LIMIT));
        }
        Ok(limit)
    }
}

/// Query parameters for the sales trends report
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SalesTrendsQuery {
    /// Start of the reporting window; defaults to 30 days before the end
    pub start_date: Option<NaiveDate>,

    /// End of the reporting window; defaults to today
    pub end_date: Option<NaiveDate>,
}
