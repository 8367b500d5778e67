//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] covers the whole REST surface at `/api/v1/*`. The JSON spec is
//! served at `/docs/openapi.json` and rendered interactively at `/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::api::models::{
    analytics::{
        DashboardSummary, InventoryHealth, ProfitAnalysis, SalesTrend, SalesTrendResponse,
        TopBottomWines, WineSalesMetric,
    },
    restaurants::{RestaurantCreate, RestaurantResponse},
    sales::{SaleBulkUploadResponse, SaleCreate, SaleResponse},
    wines::{WineBody, WineBulkUploadResponse, WineCreate, WineResponse, WineType, WineUpdate},
};

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api/v1", description = "Sommelier API server")
    ),
    paths(
        api::handlers::restaurants::create_restaurant,
        api::handlers::restaurants::get_restaurant,
        api::handlers::restaurants::list_restaurants,
        api::handlers::wines::create_wine,
        api::handlers::wines::get_wine,
        api::handlers::wines::list_wines,
        api::handlers::wines::update_wine,
        api::handlers::wines::delete_wine,
        api::handlers::wines::bulk_upload_wines,
        api::handlers::sales::create_sale,
        api::handlers::sales::get_sale,
        api::handlers::sales::list_sales,
        api::handlers::sales::delete_sale,
        api::handlers::sales::bulk_upload_sales,
        api::handlers::analytics::get_dashboard,
        api::handlers::analytics::get_top_bottom_wines,
        api::handlers::analytics::get_sales_trends,
        api::handlers::analytics::get_inventory_health,
        api::handlers::analytics::get_profit_analysis,
    ),
    components(
        schemas(
            RestaurantCreate,
            RestaurantResponse,
            WineCreate,
            WineUpdate,
            WineResponse,
            WineType,
            WineBody,
            WineBulkUploadResponse,
            SaleCreate,
            SaleResponse,
            SaleBulkUploadResponse,
            DashboardSummary,
            WineSalesMetric,
            TopBottomWines,
            SalesTrend,
            SalesTrendResponse,
            InventoryHealth,
            ProfitAnalysis,
        )
    ),
    tags(
        (name = "restaurants", description = "Restaurant accounts that own wine inventories.

Every wine, sale, and report is scoped to one restaurant."),
        (name = "wines", description = "Wine list management.

Create, update, and browse inventory entries. `inventory_count` and `times_sold` are maintained automatically as sales are recorded. Bulk upload accepts a CSV file and reports per-row errors without failing the whole batch."),
        (name = "sales", description = "Recorded bottle sales.

Sales are immutable once recorded; deleting one reverses its inventory and sales-count adjustments. Bulk upload matches CSV rows to wines by name (case-insensitive)."),
        (name = "analytics", description = "Reporting endpoints.

Dashboard summary, top and slow sellers, daily sales trends, stockout projections, and per-wine profitability."),
    ),
    info(
        title = "Sommelier API",
        description = "Wine inventory and sales tracking for restaurants.

## Errors

Errors are returned as a JSON object with a single `error` field:

```json
{
  \"error\": \"Wine with ID 550e8400-e29b-41d4-a716-446655440000 not found\"
}
```

Validation failures (including a duplicate restaurant email) return 400, missing resources 404, and a reused POS transaction ID 409.

## Pagination

List endpoints accept `page` (1-based) and `page_size` (max 100) query parameters and wrap their results in an envelope carrying `total`, `page`, `page_size`, and `total_pages`.",
    ),
)]
pub struct ApiDoc;
