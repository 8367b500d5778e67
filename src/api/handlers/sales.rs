//! HTTP handlers for sale endpoints.
//!
//! Sales are immutable once recorded; correcting a mistake means deleting the
//! sale and entering it again. Creation and deletion both adjust the wine's
//! `times_sold` and `inventory_count` counters inside the same transaction as
//! the sale row itself.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        sales::{BulkUploadQuery, ListSalesQuery, SaleBulkUploadResponse, SaleCreate, SaleResponse},
    },
    db::handlers::{Repository, Restaurants, Sales, Wines, sales::SaleFilter},
    errors::{Error, Result},
    types::{RestaurantId, SaleId, WineId},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::Acquire;

use super::wines::{non_empty, parse_optional, parse_required, read_csv_upload};

#[utoipa::path(
    post,
    path = "/sales",
    tag = "sales",
    summary = "Record a sale",
    request_body = SaleCreate,
    responses(
        (status = 201, description = "Sale recorded", body = SaleResponse),
        (status = 400, description = "Invalid sale data"),
        (status = 404, description = "Restaurant or wine not found"),
        (status = 409, description = "Duplicate POS transaction ID"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(request): Json<SaleCreate>,
) -> Result<(StatusCode, Json<SaleResponse>)> {
    request.validate().map_err(|message| Error::BadRequest { message })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Restaurants::new(&mut conn).get_by_id(request.restaurant_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Restaurant".to_string(),
            id: request.restaurant_id.to_string(),
        });
    }

    // The wine must belong to the restaurant recording the sale
    let wine = Wines::new(&mut conn).get_by_id(request.wine_id).await?;
    if !wine.is_some_and(|wine| wine.restaurant_id == request.restaurant_id) {
        return Err(Error::NotFound {
            resource: "Wine".to_string(),
            id: request.wine_id.to_string(),
        });
    }

    let mut repo = Sales::new(&mut conn);
    let created = repo.create(&request.into()).await?;

    Ok((StatusCode::CREATED, Json(SaleResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/sales/{id}",
    tag = "sales",
    summary = "Get a sale",
    params(
        ("id" = uuid::Uuid, Path, description = "Sale ID"),
    ),
    responses(
        (status = 200, description = "Sale", body = SaleResponse),
        (status = 404, description = "Sale not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_sale(State(state): State<AppState>, Path(id): Path<SaleId>) -> Result<Json<SaleResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sales::new(&mut conn);

    let sale = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Sale".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(SaleResponse::from(sale)))
}

#[utoipa::path(
    get,
    path = "/sales",
    tag = "sales",
    summary = "List sales",
    params(ListSalesQuery),
    responses(
        (status = 200, description = "Paginated list of sales, newest first", body = PaginatedResponse<SaleResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Json<PaginatedResponse<SaleResponse>>> {
    let page = query.pagination.page();
    let page_size = query.pagination.page_size();

    let mut filter = SaleFilter::new(query.restaurant_id, query.pagination.offset(), page_size)
        .with_date_range(query.start_date, query.end_date);

    if let Some(wine_id) = query.wine_id {
        filter = filter.with_wine_id(wine_id);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sales::new(&mut conn);

    let total = repo.count(&filter).await?;
    let sales = repo.list(&filter).await?;

    let items: Vec<SaleResponse> = sales.into_iter().map(SaleResponse::from).collect();

    Ok(Json(PaginatedResponse::new(items, total, page, page_size)))
}

#[utoipa::path(
    delete,
    path = "/sales/{id}",
    tag = "sales",
    summary = "Delete a sale",
    description = "Removes the sale and reverses its counter updates on the wine.",
    params(
        ("id" = uuid::Uuid, Path, description = "Sale ID"),
    ),
    responses(
        (status = 204, description = "Sale deleted"),
        (status = 404, description = "Sale not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_sale(State(state): State<AppState>, Path(id): Path<SaleId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sales::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Sale".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// One data row of the sale upload format.
#[derive(Debug, Deserialize)]
struct SaleCsvRow {
    wine_name: Option<String>,
    sale_date: Option<String>,
    quantity: Option<String>,
    unit_price: Option<String>,
    unit_cost: Option<String>,
    server_name: Option<String>,
    table_number: Option<String>,
}

fn parse_sale_row(
    restaurant_id: RestaurantId,
    wine_id: WineId,
    row: SaleCsvRow,
) -> std::result::Result<SaleCreate, String> {
    let create = SaleCreate {
        restaurant_id,
        wine_id,
        sale_date: parse_required(row.sale_date, "sale_date")?,
        quantity: parse_required(row.quantity, "quantity")?,
        unit_price: parse_required(row.unit_price, "unit_price")?,
        unit_cost: parse_optional(row.unit_cost, "unit_cost")?,
        server_name: non_empty(row.server_name),
        table_number: non_empty(row.table_number),
        notes: None,
        pos_transaction_id: None,
    };

    create.validate()?;

    Ok(create)
}

#[utoipa::path(
    post,
    path = "/sales/bulk-upload",
    tag = "sales",
    summary = "Bulk upload sales from a CSV file",
    request_body(
        content_type = "multipart/form-data",
        description = "CSV file with columns wine_name, sale_date, quantity, unit_price, unit_cost, server_name, table_number"
    ),
    params(BulkUploadQuery),
    responses(
        (status = 201, description = "Upload processed, possibly with per-row errors", body = SaleBulkUploadResponse),
        (status = 400, description = "Invalid file"),
        (status = 404, description = "Restaurant not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_upload_sales(
    State(state): State<AppState>,
    Query(query): Query<BulkUploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SaleBulkUploadResponse>)> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = Restaurants::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        if repo.get_by_id(query.restaurant_id).await?.is_none() {
            return Err(Error::NotFound {
                resource: "Restaurant".to_string(),
                id: query.restaurant_id.to_string(),
            });
        }
    }

    let (filename, data) = read_csv_upload(multipart).await?;
    if !filename.is_some_and(|name| name.ends_with(".csv")) {
        return Err(Error::BadRequest {
            message: "File must be a CSV".to_string(),
        });
    }

    // Resolve wine names once up front; matching is case-insensitive
    let lookup = {
        let mut repo = Wines::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.name_lookup(query.restaurant_id).await?
    };

    let mut sales_created = 0i64;
    let mut errors = Vec::new();

    {
        let mut repo = Sales::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data.as_ref());

        // Row 1 is the header line, so data rows are numbered from 2
        for (index, record) in reader.deserialize::<SaleCsvRow>().enumerate() {
            let row_num = index + 2;

            let mut row = match record {
                Ok(row) => row,
                Err(e) => {
                    errors.push(format!("Row {row_num}: {e}"));
                    continue;
                }
            };

            let wine_name = non_empty(row.wine_name.take()).unwrap_or_default();
            let Some(&wine_id) = lookup.get(&wine_name.to_lowercase()) else {
                errors.push(format!("Row {row_num}: Wine '{wine_name}' not found in inventory"));
                continue;
            };

            let create = match parse_sale_row(query.restaurant_id, wine_id, row) {
                Ok(create) => create,
                Err(message) => {
                    errors.push(format!("Row {row_num}: {message}"));
                    continue;
                }
            };

            // A failed insert rolls back its own savepoint, not the batch
            match repo.create(&create.into()).await {
                Ok(_) => sales_created += 1,
                Err(e) => errors.push(format!("Row {row_num}: {e}")),
            }
        }
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(sales_created, error_count = errors.len(), "Sale CSV upload processed");

    Ok((
        StatusCode::CREATED,
        Json(SaleBulkUploadResponse {
            message: format!("Successfully uploaded {sales_created} sales"),
            sales_created,
            errors: (!errors.is_empty()).then_some(errors),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::models::wines::WineResponse, test_utils::*};
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;
    use uuid::Uuid;

    fn sale_body(restaurant_id: RestaurantId, wine_id: WineId) -> Value {
        json!({
            "restaurant_id": restaurant_id,
            "wine_id": wine_id,
            "sale_date": "2024-06-01",
            "quantity": 3,
            "unit_price": 120.0,
            "unit_cost": 45.0,
            "server_name": "Dana",
            "table_number": "12"
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sale_counter_roundtrip(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let wine = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 10).await;

        let response = app.post("/api/v1/sales").json(&sale_body(restaurant.id, wine.id)).await;
        response.assert_status(StatusCode::CREATED);
        let created: SaleResponse = response.json();
        assert_eq!(created.quantity, 3);
        assert_eq!(created.total_amount, 360.0);
        assert_eq!(created.profit, Some(225.0));

        let wine_after: WineResponse = app.get(&format!("/api/v1/wines/{}", wine.id)).await.json();
        assert_eq!(wine_after.inventory_count, 7);
        assert_eq!(wine_after.times_sold, 3);

        app.delete(&format!("/api/v1/sales/{}", created.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        // Deleting the sale restores both counters exactly
        let wine_after: WineResponse = app.get(&format!("/api/v1/wines/{}", wine.id)).await.json();
        assert_eq!(wine_after.inventory_count, 10);
        assert_eq!(wine_after.times_sold, 0);

        app.get(&format!("/api/v1/sales/{}", created.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_sale_wine_of_other_restaurant_is_404(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let first = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let second = create_test_restaurant(&pool, "Trattoria Sole", "vino@trattoriasole.example").await;
        let wine = create_test_wine(&pool, first.id, "Barolo Riserva", 120.0, Some(45.0), 10).await;

        let response = app.post("/api/v1/sales").json(&sale_body(second.id, wine.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_sale_unknown_restaurant_is_404(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.post("/api/v1/sales").json(&sale_body(Uuid::new_v4(), Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_sale_zero_quantity_is_rejected(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let wine = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 10).await;

        let mut body = sale_body(restaurant.id, wine.id);
        body["quantity"] = json!(0);

        let response = app.post("/api/v1/sales").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["error"], "Quantity must be greater than 0");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_pos_transaction_id_conflicts(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let wine = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 10).await;

        let mut body = sale_body(restaurant.id, wine.id);
        body["pos_transaction_id"] = json!("POS-20240601-001");

        app.post("/api/v1/sales").json(&body).await.assert_status(StatusCode::CREATED);

        let response = app.post("/api/v1/sales").json(&body).await;
        response.assert_status(StatusCode::CONFLICT);
        let error: Value = response.json();
        assert_eq!(error["error"], "A sale with this POS transaction ID already exists");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_sales_date_and_wine_filters(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let barolo = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 50).await;
        let chablis = create_test_wine(&pool, restaurant.id, "Chablis Grand Cru", 90.0, Some(30.0), 50).await;

        for (wine_id, date) in [
            (barolo.id, "2024-06-01"),
            (barolo.id, "2024-06-10"),
            (chablis.id, "2024-06-20"),
        ] {
            let mut body = sale_body(restaurant.id, wine_id);
            body["sale_date"] = json!(date);
            app.post("/api/v1/sales").json(&body).await.assert_status(StatusCode::CREATED);
        }

        let response = app.get(&format!("/api/v1/sales?restaurant_id={}", restaurant.id)).await;
        response.assert_status_ok();
        let page: PaginatedResponse<SaleResponse> = response.json();
        assert_eq!(page.total, 3);
        // Newest first
        assert_eq!(page.items[0].sale_date.to_string(), "2024-06-20");

        let response = app
            .get(&format!(
                "/api/v1/sales?restaurant_id={}&start_date=2024-06-05&end_date=2024-06-15",
                restaurant.id
            ))
            .await;
        let page: PaginatedResponse<SaleResponse> = response.json();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].sale_date.to_string(), "2024-06-10");

        let response = app
            .get(&format!("/api/v1/sales?restaurant_id={}&wine_id={}", restaurant.id, chablis.id))
            .await;
        let page: PaginatedResponse<SaleResponse> = response.json();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].wine_id, chablis.id);
    }

    fn csv_form(contents: &str, filename: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(contents.as_bytes().to_vec()).file_name(filename).mime_type("text/csv"),
        )
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_upload_sales_skips_unknown_wine(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        let wine = create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 20).await;

        let csv = "\
wine_name,sale_date,quantity,unit_price,unit_cost,server_name,table_number
Barolo Riserva,2024-06-01,2,120.00,45.00,Dana,12
Mystery Cuvee,2024-06-01,1,80.00,,Dana,12
BAROLO RISERVA,2024-06-02,3,120.00,45.00,Lee,4
";

        let response = app
            .post(&format!("/api/v1/sales/bulk-upload?restaurant_id={}", restaurant.id))
            .multipart(csv_form(csv, "sales.csv"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let result: SaleBulkUploadResponse = response.json();
        assert_eq!(result.sales_created, 2);
        assert_eq!(result.message, "Successfully uploaded 2 sales");
        assert_eq!(
            result.errors,
            Some(vec!["Row 3: Wine 'Mystery Cuvee' not found in inventory".to_string()])
        );

        // Name matching is case-insensitive, and counters reflect both rows
        let wine_after: WineResponse = app.get(&format!("/api/v1/wines/{}", wine.id)).await.json();
        assert_eq!(wine_after.times_sold, 5);
        assert_eq!(wine_after.inventory_count, 15);

        let page: PaginatedResponse<SaleResponse> =
            app.get(&format!("/api/v1/sales?restaurant_id={}", restaurant.id)).await.json();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|s| s.total_amount == s.unit_price * s.quantity as f64));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_upload_sales_reports_bad_rows(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;
        create_test_wine(&pool, restaurant.id, "Barolo Riserva", 120.0, Some(45.0), 20).await;

        let csv = "\
wine_name,sale_date,quantity,unit_price,unit_cost,server_name,table_number
Barolo Riserva,2024-06-01,2,120.00,45.00,Dana,12
Barolo Riserva,not-a-date,1,120.00,,,
Barolo Riserva,2024-06-03,,120.00,,,
";

        let response = app
            .post(&format!("/api/v1/sales/bulk-upload?restaurant_id={}", restaurant.id))
            .multipart(csv_form(csv, "sales.csv"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let result: SaleBulkUploadResponse = response.json();
        assert_eq!(result.sales_created, 1);
        let errors = result.errors.expect("bad rows should be reported");
        assert_eq!(
            errors,
            vec![
                "Row 3: Invalid sale_date 'not-a-date'".to_string(),
                "Row 4: Missing required field 'quantity'".to_string(),
            ]
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_upload_sales_rejects_non_csv_filename(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let restaurant = create_test_restaurant(&pool, "Maison Lumiere", "cellar@maisonlumiere.example").await;

        let response = app
            .post(&format!("/api/v1/sales/bulk-upload?restaurant_id={}", restaurant.id))
            .multipart(csv_form("wine_name,sale_date\nBarolo,2024-06-01\n", "sales.xlsx"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["error"], "File must be a CSV");
    }
}
