//! HTTP handlers for wine inventory endpoints.
//!
//! Besides the usual CRUD surface this module owns the CSV bulk upload. Rows
//! are imported independently inside one transaction: a bad row is reported
//! and skipped without discarding its neighbours, and everything that parsed
//! commits together at the end.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        wines::{
            BulkUploadQuery, ListWinesQuery, WineBulkUploadResponse, WineCreate, WineResponse, WineUpdate,
        },
    },
    db::{
        errors::DbError,
        handlers::{Repository, Restaurants, Wines, wines::WineFilter},
        models::wines::WineUpdateDBRequest,
    },
    errors::{Error, Result},
    types::{RestaurantId, WineId},
};
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::Acquire;
use std::str::FromStr;

#[utoipa::path(
    post,
    path = "/wines",
    tag = "wines",
    summary = "Add a wine to the list",
    request_body = WineCreate,
    responses(
        (status = 201, description = "Wine created", body = WineResponse),
        (status = 400, description = "Invalid wine data"),
        (status = 404, description = "Restaurant not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_wine(
    State(state): State<AppState>,
    Json(request): Json<WineCreate>,
) -> Result<(StatusCode, Json<WineResponse>)> {
    request.validate().map_err(|message| Error::BadRequest { message })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Restaurants::new(&mut conn).get_by_id(request.restaurant_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Restaurant".to_string(),
            id: request.restaurant_id.to_string(),
        });
    }

    let mut repo = Wines::new(&mut conn);
    let created = repo.create(&request.into()).await?;

    Ok((StatusCode::CREATED, Json(WineResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/wines/{id}",
    tag = "wines",
    summary = "Get a wine",
    params(
        ("id" = uuid::Uuid, Path, description = "Wine ID"),
    ),
    responses(
        (status = 200, description = "Wine", body = WineResponse),
        (status = 404, description = "Wine not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_wine(State(state): State<AppState>, Path(id): Path<WineId>) -> Result<Json<WineResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Wines::new(&mut conn);

    let wine = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Wine".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(WineResponse::from(wine)))
}

#[utoipa::path(
    get,
    path = "/wines",
    tag = "wines",
    summary = "List wines",
    params(ListWinesQuery),
    responses(
        (status = 200, description = "Paginated list of wines", body = PaginatedResponse<WineResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_wines(
    State(state): State<AppState>,
    Query(query): Query<ListWinesQuery>,
) -> Result<Json<PaginatedResponse<WineResponse>>> {
    let page = query.pagination.page();
    let page_size = query.pagination.page_size();

    let mut filter = WineFilter::new(query.restaurant_id, query.pagination.offset(), page_size);

    if let Some(search) = query.search.as_ref()
        && !search.trim().is_empty()
    {
        filter = filter.with_search(search.trim().to_string());
    }

    if let Some(wine_type) = query.wine_type {
        filter = filter.with_wine_type(wine_type);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Wines::new(&mut conn);

    let total = repo.count(&filter).await?;
    let wines = repo.list(&filter).await?;

    let items: Vec<WineResponse> = wines.into_iter().map(WineResponse::from).collect();

    Ok(Json(PaginatedResponse::new(items, total, page, page_size)))
}

#[utoipa::path(
    put,
    path = "/wines/{id}",
    tag = "wines",
    summary = "Update a wine",
    request_body = WineUpdate,
    params(
        ("id" = uuid::Uuid, Path, description = "Wine ID"),
    ),
    responses(
        (status = 200, description = "Updated wine", body = WineResponse),
        (status = 400, description = "Invalid wine data"),
        (status = 404, description = "Wine not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_wine(
    State(state): State<AppState>,
    Path(id): Path<WineId>,
    Json(request): Json<WineUpdate>,
) -> Result<Json<WineResponse>> {
    request.validate().map_err(|message| Error::BadRequest { message })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Wines::new(&mut conn);

    let updated = repo.update(id, &WineUpdateDBRequest::new(request)).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            resource: "Wine".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(WineResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/wines/{id}",
    tag = "wines",
    summary = "Remove a wine",
    params(
        ("id" = uuid::Uuid, Path, description = "Wine ID"),
    ),
    responses(
        (status = 204, description = "Wine deleted"),
        (status = 404, description = "Wine not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_wine(State(state): State<AppState>, Path(id): Path<WineId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Wines::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Wine".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// One data row of the wine upload format. Every column is optional at the
/// parse stage so that missing values fail row by row instead of rejecting
/// the whole file.
#[derive(Debug, Deserialize)]
struct WineCsvRow {
    name: Option<String>,
    producer: Option<String>,
    vintage: Option<String>,
    varietal: Option<String>,
    region: Option<String>,
    country: Option<String>,
    wine_type: Option<String>,
    body: Option<String>,
    price: Option<String>,
    cost: Option<String>,
    inventory_count: Option<String>,
}

/// Collapse missing and all-whitespace CSV cells into `None`.
pub(super) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub(super) fn parse_required<T: FromStr>(value: Option<String>, field: &str) -> std::result::Result<T, String> {
    let raw = non_empty(value).ok_or_else(|| format!("Missing required field '{field}'"))?;
    raw.parse().map_err(|_| format!("Invalid {field} '{raw}'"))
}

pub(super) fn parse_optional<T: FromStr>(value: Option<String>, field: &str) -> std::result::Result<Option<T>, String> {
    match non_empty(value) {
        Some(raw) => raw.parse().map(Some).map_err(|_| format!("Invalid {field} '{raw}'")),
        None => Ok(None),
    }
}

fn parse_wine_row(restaurant_id: RestaurantId, row: WineCsvRow) -> std::result::Result<WineCreate, String> {
    let create = WineCreate {
        restaurant_id,
        name: non_empty(row.name).ok_or("Missing required field 'name'")?,
        producer: non_empty(row.producer),
        vintage: parse_optional(row.vintage, "vintage")?,
        varietal: non_empty(row.varietal),
        region: non_empty(row.region),
        country: non_empty(row.country),
        wine_type: parse_optional(row.wine_type, "wine_type")?,
        body: parse_optional(row.body, "body")?,
        sweetness: None,
        acidity: None,
        tannin: None,
        alcohol_content: None,
        price: parse_required(row.price, "price")?,
        cost: parse_optional(row.cost, "cost")?,
        inventory_count: parse_optional(row.inventory_count, "inventory_count")?.unwrap_or(0),
        tasting_notes: None,
        bottle_size: "750ml".to_string(),
        sku: None,
    };

    create.validate()?;

    Ok(create)
}

/// Pull the uploaded file out of the multipart body. Shared by the wine and
/// sale upload endpoints, which both accept a single field named `file`.
pub(super) async fn read_csv_upload(mut multipart: Multipart) -> Result<(Option<String>, Bytes)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read uploaded file: {}", e),
        })?;

        return Ok((filename, data));
    }

    Err(Error::BadRequest {
        message: "Missing required field: 'file'".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/wines/bulk-upload",
    tag = "wines",
    summary = "Bulk upload wines from a CSV file",
    request_body(
        content_type = "multipart/form-data",
        description = "CSV file with columns name, producer, vintage, varietal, region, country, wine_type, body, price, cost, inventory_count"
    ),
    params(BulkUploadQuery),
    responses(
        (status = 201, description = "Upload processed, possibly with per-row errors", body = WineBulkUploadResponse),
        (status = 400, description = "Invalid file"),
        (status = 404, description = "Restaurant not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_upload_wines(
    State(state): State<AppState>,
    Query(query): Query<BulkUploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<WineBulkUploadResponse>)> {
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

    let mut wines_created = 0i64;
    let mut errors = Vec::new();

    {
        let mut repo = Wines::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data.as_ref());

        // Row 1 is the header line, so data rows are numbered from 2
        for (index, record) in reader.deserialize::<WineCsvRow>().enumerate() {
            let row_num = index + 2;

            let parsed = record
                .map_err(|e| e.to_string())
                .and_then(|row| parse_wine_row(query.restaurant_id, row));

            let create = match parsed {
                Ok(create) => create,
                Err(message) => {
                    errors.push(format!("Row {row_num}: {message}"));
                    continue;
                }
            };

            match repo.create(&create.into()).await {
                Ok(_) => wines_created += 1,
                Err(e) => errors.push(format!("Row {row_num}: {e}")),
            }
        }
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(wines_created, error_count = errors.len(), "Wine CSV upload processed");

    Ok((
        StatusCode::CREATED,
        Json(WineBulkUploadResponse {
            message: format!("Successfully uploaded {wines_created} wines"),
            wines_created,
            errors: (!errors.is_empty()).then_some(errors),
        }),
    ))
}
